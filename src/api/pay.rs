// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment endpoints: method listing and purchase dispatch.
//!
//! `/pay/purchase` always answers 200 with a [`PurchaseOutcome`]: the
//! orchestrator folds every failure into a step-tagged result so callers
//! can see exactly where the chain broke and what it produced first.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{BountyBody, PaymentMethodsBody, PurchaseBody};
use crate::state::AppState;
use crate::xl::{PaymentMethod, PurchaseOutcome};

/// Resolve payment methods for a quoted package.
///
/// The returned body carries `token_payment` and `timestamp`; they are a
/// pair and must be used together in settlement.
#[utoipa::path(
    post,
    path = "/pay/methods",
    tag = "Pay",
    request_body = PaymentMethodsBody,
    responses(
        (status = 200, description = "Payment method options"),
        (status = 502, description = "Resolution failed upstream")
    )
)]
pub async fn payment_methods(
    State(state): State<AppState>,
    Json(body): Json<PaymentMethodsBody>,
) -> Result<Json<Value>, ApiError> {
    let (_, methods) = state
        .client
        .payment_methods(&body.tokens, &body.token_confirmation, &body.payment_target)
        .await?;
    Ok(Json(methods))
}

/// Run the full purchase chain for one package.
#[utoipa::path(
    post,
    path = "/pay/purchase",
    tag = "Pay",
    request_body = PurchaseBody,
    responses(
        (status = 200, description = "Step-tagged purchase outcome", body = PurchaseOutcome),
        (status = 400, description = "Unknown method or missing wallet number")
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    Json(body): Json<PurchaseBody>,
) -> Result<Json<PurchaseOutcome>, ApiError> {
    let method = PaymentMethod::from_request(&body.method, body.wallet_number.as_deref())?;
    let outcome = state
        .purchases
        .purchase(
            &body.tokens,
            &body.package_option_code,
            method,
            body.price_override,
        )
        .await;
    Ok(Json(outcome))
}

/// Redeem a bounty voucher for a package.
#[utoipa::path(
    post,
    path = "/pay/bounty",
    tag = "Pay",
    request_body = BountyBody,
    responses(
        (status = 200, description = "Step-tagged redemption outcome", body = PurchaseOutcome)
    )
)]
pub async fn bounty(
    State(state): State<AppState>,
    Json(body): Json<BountyBody>,
) -> Result<Json<PurchaseOutcome>, ApiError> {
    let outcome = state
        .purchases
        .purchase(
            &body.tokens,
            &body.package_option_code,
            PaymentMethod::Bounty,
            None,
        )
        .await;
    Ok(Json(outcome))
}
