// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile, balance, and package store lookups. Thin wrappers: all
//! semantics live in [`crate::xl::client`].

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{FamiliesBody, FamilyBody, PackageOptionBody, TokensBody};
use crate::state::AppState;

/// Subscriber profile.
#[utoipa::path(
    post,
    path = "/profile",
    tag = "Store",
    request_body = TokensBody,
    responses(
        (status = 200, description = "Profile data"),
        (status = 502, description = "Lookup failed upstream")
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Json(body): Json<TokensBody>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.client.profile(&body.tokens).await?))
}

/// Prepaid balance.
#[utoipa::path(
    post,
    path = "/balance",
    tag = "Store",
    request_body = TokensBody,
    responses(
        (status = 200, description = "Balance block"),
        (status = 502, description = "Lookup failed upstream")
    )
)]
pub async fn balance(
    State(state): State<AppState>,
    Json(body): Json<TokensBody>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.client.balance(&body.tokens).await?))
}

/// Active quota details. The body is passed through decoded, or tagged raw
/// when the backend is not answering in envelopes.
#[utoipa::path(
    post,
    path = "/packages/quota-details",
    tag = "Store",
    request_body = TokensBody,
    responses(
        (status = 200, description = "Quota details"),
        (status = 502, description = "Lookup failed upstream")
    )
)]
pub async fn quota_details(
    State(state): State<AppState>,
    Json(body): Json<TokensBody>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.client.quota_details(&body.tokens).await?))
}

/// Package families in a store category.
#[utoipa::path(
    post,
    path = "/packages/families",
    tag = "Store",
    request_body = FamiliesBody,
    responses(
        (status = 200, description = "Family list"),
        (status = 502, description = "Lookup failed upstream")
    )
)]
pub async fn families(
    State(state): State<AppState>,
    Json(body): Json<FamiliesBody>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        state
            .client
            .families(&body.tokens, &body.package_category_code)
            .await?,
    ))
}

/// Packages within one family.
#[utoipa::path(
    post,
    path = "/packages/family",
    tag = "Store",
    request_body = FamilyBody,
    responses(
        (status = 200, description = "Packages in the family"),
        (status = 502, description = "Lookup failed upstream")
    )
)]
pub async fn family(
    State(state): State<AppState>,
    Json(body): Json<FamilyBody>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        state.client.family(&body.tokens, &body.family_code).await?,
    ))
}

/// Package detail: the full quote body including `token_confirmation`.
#[utoipa::path(
    post,
    path = "/packages/option",
    tag = "Store",
    request_body = PackageOptionBody,
    responses(
        (status = 200, description = "Package detail"),
        (status = 502, description = "Lookup failed upstream")
    )
)]
pub async fn package_option(
    State(state): State<AppState>,
    Json(body): Json<PackageOptionBody>,
) -> Result<Json<Value>, ApiError> {
    let quote = state
        .client
        .package_detail(&body.tokens, &body.package_option_code)
        .await?;
    Ok(Json(quote.details))
}
