// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OTP login and session refresh endpoints.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{OtpRequestBody, OtpVerifyBody, RefreshBody};
use crate::state::AppState;
use crate::xl::TokenSet;

/// Request an OTP over SMS.
///
/// The contact is validated locally (must start with `628`, at most 14
/// digits) before anything leaves the process.
#[utoipa::path(
    post,
    path = "/auth/otp",
    tag = "Auth",
    request_body = OtpRequestBody,
    responses(
        (status = 200, description = "OTP requested, raw CIAM body returned"),
        (status = 400, description = "Invalid contact format"),
        (status = 502, description = "CIAM unreachable")
    )
)]
pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpRequestBody>,
) -> Result<Json<Value>, ApiError> {
    let response = state.sessions.request_otp(&body.contact).await?;
    Ok(Json(response))
}

/// Verify an OTP code and obtain a fresh token set.
#[utoipa::path(
    post,
    path = "/auth/verify",
    tag = "Auth",
    request_body = OtpVerifyBody,
    responses(
        (status = 200, description = "Login successful", body = TokenSet),
        (status = 400, description = "Invalid contact or code format"),
        (status = 502, description = "Verification rejected upstream")
    )
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpVerifyBody>,
) -> Result<Json<TokenSet>, ApiError> {
    let tokens = state.sessions.verify_otp(&body.contact, &body.code).await?;
    Ok(Json(tokens))
}

/// Refresh a session, producing a new token set.
///
/// Returns 401 when the refresh token is no longer active; the caller must
/// log in again.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    request_body = RefreshBody,
    responses(
        (status = 200, description = "New token set", body = TokenSet),
        (status = 401, description = "Session no longer active"),
        (status = 502, description = "Refresh rejected upstream")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<TokenSet>, ApiError> {
    let tokens = state.sessions.refresh(&body.refresh_token).await?;
    Ok(Json(tokens))
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::config::AppConfig;
    use crate::state::AppState;
    use serde_json::json;

    #[tokio::test]
    async fn invalid_contact_is_a_400_without_any_upstream_call() {
        // Every upstream URL is unroutable, so a 400 (not a 502) proves the
        // request was rejected before the network.
        let state = AppState::new(AppConfig::for_tests("http://127.0.0.1:1")).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        let response = reqwest::Client::new()
            .post(format!("http://{addr}/auth/otp"))
            .json(&json!({ "contact": "0812345678" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("628"));
    }
}
