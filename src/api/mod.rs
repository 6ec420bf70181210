// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::http::HeaderValue;
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::models::{
    BountyBody, FamiliesBody, FamilyBody, OtpRequestBody, OtpVerifyBody, PackageOptionBody,
    PaymentMethodsBody, PurchaseBody, RefreshBody, TokensBody,
};
use crate::state::AppState;
use crate::xl::purchase::{PurchaseData, PurchaseOutcome, PurchaseStatus, PurchaseStep, QrisPayment};
use crate::xl::TokenSet;

pub mod auth;
pub mod health;
pub mod pay;
pub mod store;

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allow_origins);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/auth/otp", post(auth::request_otp))
        .route("/auth/verify", post(auth::verify_otp))
        .route("/auth/refresh", post(auth::refresh))
        .route("/profile", post(store::profile))
        .route("/balance", post(store::balance))
        .route("/packages/quota-details", post(store::quota_details))
        .route("/packages/families", post(store::families))
        .route("/packages/family", post(store::family))
        .route("/packages/option", post(store::package_option))
        .route("/pay/methods", post(pay::payment_methods))
        .route("/pay/purchase", post(pay::purchase))
        .route("/pay/bounty", post(pay::bounty))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open CORS by default; lock down with `CORS_ALLOW_ORIGINS`.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::request_otp,
        auth::verify_otp,
        auth::refresh,
        store::profile,
        store::balance,
        store::quota_details,
        store::families,
        store::family,
        store::package_option,
        pay::payment_methods,
        pay::purchase,
        pay::bounty,
        health::health,
    ),
    components(
        schemas(
            health::HealthResponse,
            OtpRequestBody,
            OtpVerifyBody,
            RefreshBody,
            TokensBody,
            FamilyBody,
            FamiliesBody,
            PackageOptionBody,
            PaymentMethodsBody,
            PurchaseBody,
            BountyBody,
            TokenSet,
            PurchaseOutcome,
            PurchaseData,
            PurchaseStatus,
            PurchaseStep,
            QrisPayment,
        )
    ),
    tags(
        (name = "Auth", description = "OTP login and session refresh"),
        (name = "Store", description = "Profile, balance, and package lookups"),
        (name = "Pay", description = "Payment methods, purchase, and redemption")
    )
)]
struct ApiDoc;
