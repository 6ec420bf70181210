// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CIAM session management: OTP login, token refresh, session extension.
//!
//! CIAM is a separate host from the API backend and speaks OAuth-ish forms
//! instead of envelopes. Requests carry the `Ax-*` device header family and
//! the client's basic credentials; the OTP token grant additionally carries
//! a signature from the OTP oracle.
//!
//! Contact and OTP code formats are validated here, before any network
//! call.

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use url::form_urlencoded;
use utoipa::ToSchema;

use crate::config::{self, AppConfig};

use super::oracle::SigningOracle;
use super::stamp;
use super::XlError;

const OTP_PATH: &str = "realms/xl-ciam/auth/otp";
const TOKEN_PATH: &str = "realms/xl-ciam/protocol/openid-connect/token";
const EXTEND_SESSION_PATH: &str = "realms/xl-ciam/auth/extend-session";

const CIAM_TIMEOUT: Duration = Duration::from_secs(30);

/// CIAM flags OTP grants whose header time matches the signature time too
/// closely; the official client backdates the header by five minutes.
const OTP_HEADER_SKEW_MINUTES: i64 = 5;

const CONTACT_PREFIX: &str = "628";
const CONTACT_MAX_LEN: usize = 14;
const OTP_CODE_LEN: usize = 6;

/// Bearer tokens for one logical session.
///
/// Opaque strings owned by the caller; a refresh produces a new `TokenSet`,
/// never a mutation of an existing one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenSet {
    /// Token the backend expects inside signed payloads.
    pub access_token: String,
    /// Token sent as the bearer on every API request.
    pub id_token: String,
    /// Token for obtaining the next `TokenSet`; absent for sessions that
    /// cannot be refreshed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// CIAM client.
#[derive(Debug, Clone)]
pub struct SessionManager {
    config: Arc<AppConfig>,
    oracle: SigningOracle,
    http: Client,
}

impl SessionManager {
    pub fn new(config: Arc<AppConfig>, oracle: SigningOracle) -> Result<Self, XlError> {
        let http = Client::builder()
            .timeout(CIAM_TIMEOUT)
            .build()
            .map_err(|e| XlError::Transport(format!("failed to build CIAM HTTP client: {e}")))?;
        Ok(Self {
            config,
            oracle,
            http,
        })
    }

    /// Request an OTP to be delivered to `contact` over SMS.
    ///
    /// Returns the raw CIAM body (it carries the subscriber id some
    /// frontends display).
    pub async fn request_otp(&self, contact: &str) -> Result<Value, XlError> {
        validate_contact(contact)?;

        info!(%contact, "requesting OTP");
        let url = format!("{}/{OTP_PATH}", self.ciam_base());
        let response = self
            .ax_headers(self.http.get(&url), stamp::java_like_timestamp(stamp::now_gmt7()))
            .header("Content-Type", "application/json")
            .query(&[
                ("contact", contact),
                ("contactType", "SMS"),
                ("alternateContact", "false"),
            ])
            .send()
            .await
            .map_err(|e| XlError::Transport(format!("OTP request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| XlError::InvalidResponse(format!("OTP response was not JSON: {e}")))?;
        Ok(body)
    }

    /// Exchange a delivered OTP code for a fresh [`TokenSet`].
    pub async fn verify_otp(&self, contact: &str, code: &str) -> Result<TokenSet, XlError> {
        validate_contact(contact)?;
        validate_otp_code(code)?;

        let now = stamp::now_gmt7();
        let ts_for_sign = stamp::compact_timestamp(now);
        let ts_header =
            stamp::compact_timestamp(now - ChronoDuration::minutes(OTP_HEADER_SKEW_MINUTES));
        let signature = self
            .oracle
            .otp_signature(&ts_for_sign, contact, code, "SMS")
            .await?;

        // Field order is part of what was signed.
        let body: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("contactType", "SMS")
            .append_pair("code", code)
            .append_pair("grant_type", "password")
            .append_pair("contact", contact)
            .append_pair("scope", "openid")
            .finish();

        let url = format!("{}/{TOKEN_PATH}", self.ciam_base());
        let response = self
            .ax_headers(self.http.post(&url), ts_header)
            .header("Ax-Api-Signature", signature)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| XlError::Transport(format!("OTP verification failed: {e}")))?;

        let body: Value = response.json().await.map_err(|e| {
            XlError::InvalidResponse(format!("token response was not JSON: {e}"))
        })?;

        if let Some(error) = body.get("error").and_then(Value::as_str) {
            return Err(XlError::UpstreamStatus {
                status: error.to_string(),
                body,
            });
        }

        info!(%contact, "login successful");
        token_set_from(body)
    }

    /// Obtain a new [`TokenSet`] from a refresh token.
    ///
    /// A CIAM "Session not active" rejection is terminal: the refresh token
    /// is dead and the account must log in again. Every other failure is
    /// reported as-is so callers can retry or diagnose.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, XlError> {
        let body: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", refresh_token)
            .finish();

        let url = format!("{}/{TOKEN_PATH}", self.ciam_base());
        let response = self
            .ax_headers(
                self.http.post(&url),
                stamp::java_like_timestamp(stamp::now_gmt7()),
            )
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| XlError::Transport(format!("token refresh failed: {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            XlError::InvalidResponse(format!("refresh response was not JSON: {e}"))
        })?;

        if status == reqwest::StatusCode::BAD_REQUEST {
            if body.get("error_description").and_then(Value::as_str) == Some("Session not active") {
                return Err(XlError::SessionExpired);
            }
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("bad_request")
                .to_string();
            return Err(XlError::UpstreamStatus {
                status: error,
                body,
            });
        }
        if !status.is_success() {
            return Err(XlError::UpstreamStatus {
                status: status.as_u16().to_string(),
                body,
            });
        }

        token_set_from(body)
    }

    /// Extend a device-bound session, returning the exchange code.
    pub async fn extend_session(&self, contact: &str) -> Result<String, XlError> {
        validate_contact(contact)?;

        let url = format!("{}/{EXTEND_SESSION_PATH}", self.ciam_base());
        let response = self
            .ax_headers(
                self.http.get(&url),
                stamp::java_like_timestamp(stamp::now_gmt7()),
            )
            .header("Content-Type", "application/json")
            .query(&[("contact", contact), ("contactType", "DEVICEID")])
            .send()
            .await
            .map_err(|e| XlError::Transport(format!("extend-session failed: {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            XlError::InvalidResponse(format!("extend-session response was not JSON: {e}"))
        })?;
        if !status.is_success() {
            return Err(XlError::UpstreamStatus {
                status: status.as_u16().to_string(),
                body,
            });
        }

        body.pointer("/data/exchange_code")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                XlError::InvalidResponse("extend-session body missing exchange_code".to_string())
            })
    }

    fn ciam_base(&self) -> &str {
        self.config.ciam_base_url.trim_end_matches('/')
    }

    fn ax_headers(&self, builder: reqwest::RequestBuilder, request_at: String) -> reqwest::RequestBuilder {
        builder
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Authorization", config::CIAM_BASIC_AUTH)
            .header("Ax-Device-Id", config::DEVICE_ID)
            .header("Ax-Fingerprint", config::DEVICE_FINGERPRINT)
            .header("Ax-Request-At", request_at)
            .header("Ax-Request-Device", config::DEVICE_NAME)
            .header("Ax-Request-Device-Model", config::DEVICE_MODEL)
            .header("Ax-Request-Id", stamp::request_id())
            .header("Ax-Substype", config::SUBSCRIPTION_TYPE)
            .header("User-Agent", config::USER_AGENT)
    }
}

/// MSISDNs must be in international prepaid form: `628` prefix, at most 14
/// digits total.
pub fn validate_contact(contact: &str) -> Result<(), XlError> {
    if !contact.starts_with(CONTACT_PREFIX)
        || contact.len() > CONTACT_MAX_LEN
        || !contact.chars().all(|c| c.is_ascii_digit())
    {
        return Err(XlError::Validation(format!(
            "contact must start with {CONTACT_PREFIX} and be at most {CONTACT_MAX_LEN} digits"
        )));
    }
    Ok(())
}

fn validate_otp_code(code: &str) -> Result<(), XlError> {
    if code.len() != OTP_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(XlError::Validation(format!(
            "OTP code must be exactly {OTP_CODE_LEN} digits"
        )));
    }
    Ok(())
}

fn token_set_from(body: Value) -> Result<TokenSet, XlError> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| XlError::InvalidResponse("token body missing access_token".to_string()))?
        .to_string();
    let id_token = body
        .get("id_token")
        .and_then(Value::as_str)
        .ok_or_else(|| XlError::InvalidResponse("token body missing id_token".to_string()))?
        .to_string();
    let refresh_token = body
        .get("refresh_token")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(TokenSet {
        access_token,
        id_token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn manager_for(base: &str) -> SessionManager {
        let config = Arc::new(AppConfig::for_tests(base));
        let oracle = SigningOracle::new(Arc::clone(&config)).unwrap();
        SessionManager::new(config, oracle).unwrap()
    }

    /// A manager whose every URL is unroutable: any network attempt fails
    /// with a transport error, so a validation error proves no call left
    /// the process.
    fn offline_manager() -> SessionManager {
        manager_for("http://127.0.0.1:1")
    }

    #[tokio::test]
    async fn invalid_contacts_are_rejected_before_any_network_call() {
        let manager = offline_manager();
        for contact in ["0812345678", "62912345678", "62812345678901234", "628abc"] {
            let err = manager.request_otp(contact).await.unwrap_err();
            assert!(matches!(err, XlError::Validation(_)), "{contact}: {err:?}");
        }
    }

    #[tokio::test]
    async fn valid_contact_proceeds_to_the_network() {
        let manager = offline_manager();
        let err = manager.request_otp("6287896089467").await.unwrap_err();
        assert!(matches!(err, XlError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_otp_codes_are_rejected_locally() {
        let manager = offline_manager();
        for code in ["12345", "1234567", "12a456", ""] {
            let err = manager.verify_otp("6287896089467", code).await.unwrap_err();
            assert!(matches!(err, XlError::Validation(_)), "{code:?}: {err:?}");
        }
    }

    #[tokio::test]
    async fn verify_otp_signs_and_posts_the_ordered_form() {
        let router = Router::new()
            .route(
                "/oracle/sign-ax",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "ax_signature": format!(
                            "ax-sig-{}-{}",
                            body["contact"].as_str().unwrap(),
                            body["code"].as_str().unwrap(),
                        )
                    }))
                }),
            )
            .route(
                "/realms/xl-ciam/protocol/openid-connect/token",
                post(|headers: HeaderMap, body: String| async move {
                    assert_eq!(
                        headers["Ax-Api-Signature"].to_str().unwrap(),
                        "ax-sig-6287896089467-123456"
                    );
                    // Ordered exactly as the oracle signed it.
                    assert_eq!(
                        body,
                        "contactType=SMS&code=123456&grant_type=password&contact=6287896089467&scope=openid"
                    );
                    Json(json!({
                        "access_token": "acc-1",
                        "id_token": "idt-1",
                        "refresh_token": "ref-1",
                    }))
                }),
            );
        let base = spawn(router).await;

        let tokens = manager_for(&base)
            .verify_otp("6287896089467", "123456")
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "acc-1");
        assert_eq!(tokens.id_token, "idt-1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("ref-1"));
    }

    #[tokio::test]
    async fn inactive_session_is_a_distinct_terminal_error() {
        let router = Router::new().route(
            "/realms/xl-ciam/protocol/openid-connect/token",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_grant",
                        "error_description": "Session not active",
                    })),
                )
            }),
        );
        let base = spawn(router).await;

        let err = manager_for(&base).refresh("dead-token").await.unwrap_err();
        assert!(matches!(err, XlError::SessionExpired), "got {err:?}");
    }

    #[tokio::test]
    async fn other_400s_are_not_session_expiry() {
        let router = Router::new().route(
            "/realms/xl-ciam/protocol/openid-connect/token",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid refresh token",
                    })),
                )
            }),
        );
        let base = spawn(router).await;

        let err = manager_for(&base).refresh("bad-token").await.unwrap_err();
        match err {
            XlError::UpstreamStatus { status, .. } => assert_eq!(status, "invalid_grant"),
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_produces_a_new_token_set() {
        let router = Router::new().route(
            "/realms/xl-ciam/protocol/openid-connect/token",
            post(|body: String| async move {
                assert!(body.starts_with("grant_type=refresh_token&refresh_token="));
                Json(json!({
                    "access_token": "acc-2",
                    "id_token": "idt-2",
                    "refresh_token": "ref-2",
                }))
            }),
        );
        let base = spawn(router).await;

        let tokens = manager_for(&base).refresh("ref-1").await.unwrap();
        assert_eq!(tokens.access_token, "acc-2");
        assert_eq!(tokens.refresh_token.as_deref(), Some("ref-2"));
    }

    #[tokio::test]
    async fn extend_session_returns_the_exchange_code() {
        let router = Router::new().route(
            "/realms/xl-ciam/auth/extend-session",
            get(|| async {
                Json(json!({ "data": { "exchange_code": "xch-123" } }))
            }),
        );
        let base = spawn(router).await;

        let code = manager_for(&base)
            .extend_session("6287896089467")
            .await
            .unwrap();
        assert_eq!(code, "xch-123");
    }
}
