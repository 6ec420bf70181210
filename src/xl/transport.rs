// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-shot HTTP exchange with the carrier backend.
//!
//! Requests carry a signature bound to the envelope's `xtime`, so a timeout
//! or connection failure is reported, never retried here: a retry with a
//! stale signature would be rejected anyway. Callers re-seal and re-sign if
//! they want another attempt.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::config::{self, AppConfig};

use super::stamp;
use super::XlError;

/// Bound on every backend exchange. No retry behind it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header values that must agree with the sealed request body.
#[derive(Debug, Clone, Copy)]
pub struct OutboundHeaders<'a> {
    pub id_token: &'a str,
    pub signature: &'a str,
    /// Seconds derived from the envelope's `xtime`; sent as
    /// `x-signature-time`.
    pub sig_time_sec: i64,
    /// Wall-clock value for the `x-request-at` header.
    pub request_at: DateTime<FixedOffset>,
}

/// HTTP transport for the carrier API.
#[derive(Debug, Clone)]
pub struct Transport {
    config: Arc<AppConfig>,
    http: Client,
}

impl Transport {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, XlError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| XlError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// POST a sealed body to `path` and return the raw response text.
    ///
    /// The response is returned for decoding even on non-2xx status: the
    /// backend wraps errors in envelopes too, and non-envelope bodies are
    /// the codec's problem, not the transport's.
    pub async fn post(
        &self,
        path: &str,
        headers: OutboundHeaders<'_>,
        body: &Value,
    ) -> Result<String, XlError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json; charset=utf-8")
            .header("user-agent", config::USER_AGENT)
            .header("x-api-key", &self.config.api_key)
            .header("authorization", format!("Bearer {}", headers.id_token))
            .header("x-hv", config::HEADER_VERSION)
            .header("x-signature-time", headers.sig_time_sec.to_string())
            .header("x-signature", headers.signature)
            .header("x-request-id", stamp::request_id())
            .header("x-request-at", stamp::java_like_timestamp(headers.request_at))
            .header("x-version-app", config::APP_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| XlError::Transport(format!("POST {path} failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| XlError::Transport(format!("POST {path} body read failed: {e}")))?;

        if !status.is_success() {
            warn!(%path, %status, "backend returned non-success HTTP status");
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Json;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::Router;
    use serde_json::json;

    #[tokio::test]
    async fn post_sends_signature_headers_that_match_the_envelope() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route(
            "/api/v8/profile",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let echo = json!({
                    "x-signature": headers["x-signature"].to_str().unwrap(),
                    "x-signature-time": headers["x-signature-time"].to_str().unwrap(),
                    "x-api-key": headers["x-api-key"].to_str().unwrap(),
                    "authorization": headers["authorization"].to_str().unwrap(),
                    "x-version-app": headers["x-version-app"].to_str().unwrap(),
                    "has-request-id": headers.contains_key("x-request-id"),
                    "body": body,
                });
                Json(echo)
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = Arc::new(AppConfig::for_tests(&format!("http://{addr}")));
        let transport = Transport::new(config).unwrap();
        let raw = transport
            .post(
                "api/v8/profile",
                OutboundHeaders {
                    id_token: "idt",
                    signature: "sealed-sig",
                    sig_time_sec: 1_697_788_496,
                    request_at: stamp::now_gmt7(),
                },
                &json!({ "xdata": "opaque", "xtime": 1_697_788_496_789_i64 }),
            )
            .await
            .unwrap();

        let echo: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(echo["x-signature"], "sealed-sig");
        assert_eq!(echo["x-signature-time"], "1697788496");
        assert_eq!(echo["x-api-key"], "test-api-key");
        assert_eq!(echo["authorization"], "Bearer idt");
        assert_eq!(echo["x-version-app"], "8.6.0");
        assert_eq!(echo["has-request-id"], true);
        assert_eq!(echo["body"]["xtime"], 1_697_788_496_789_i64);
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // Reserved port with no listener.
        let config = Arc::new(AppConfig::for_tests("http://127.0.0.1:1"));
        let transport = Transport::new(config).unwrap();
        let err = transport
            .post(
                "api/v8/profile",
                OutboundHeaders {
                    id_token: "idt",
                    signature: "sig",
                    sig_time_sec: 0,
                    request_at: stamp::now_gmt7(),
                },
                &json!({}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, XlError::Transport(_)));
    }
}
