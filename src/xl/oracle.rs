// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client for the external signing oracles.
//!
//! The carrier's envelope cipher and signature schemes are not implemented
//! locally; they are delegated to HTTP oracles that receive the semantic
//! fields of a request and return the sealed body or signature. This module
//! only constructs correct oracle inputs and threads results through.
//!
//! Each scheme takes a distinct ordered set of fields. The request structs
//! below are the wire contract: serde serializes fields in declaration
//! order, and reordering or omitting one invalidates the signature.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::AppConfig;

use super::envelope::SignedEnvelope;
use super::XlError;

const ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Encrypt+sign request for the generic envelope scheme.
#[derive(Debug, Serialize)]
struct EnvelopeSignRequest<'a> {
    api_key: &'a str,
    method: &'a str,
    path: &'a str,
    id_token: &'a str,
    payload: &'a Value,
}

/// Decrypt request: the raw response body exactly as the backend sent it.
#[derive(Debug, Serialize)]
struct DecryptRequest<'a> {
    api_key: &'a str,
    body: &'a Value,
}

/// OTP-login signature inputs.
#[derive(Debug, Serialize)]
struct OtpSignRequest<'a> {
    api_key: &'a str,
    ts: &'a str,
    contact: &'a str,
    code: &'a str,
    channel: &'a str,
}

/// Payment-settlement signature inputs.
#[derive(Debug, Serialize)]
struct PaymentSignRequest<'a> {
    api_key: &'a str,
    access_token: &'a str,
    sig_time_sec: i64,
    package_code: &'a str,
    token_payment: &'a str,
    payment_method: &'a str,
}

/// Bounty-redeem signature inputs. Same shape as payment minus the method
/// name; the oracle uses a different key schedule for redemptions.
#[derive(Debug, Serialize)]
struct BountySignRequest<'a> {
    api_key: &'a str,
    access_token: &'a str,
    sig_time_sec: i64,
    package_code: &'a str,
    token_payment: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignatureResponse {
    x_signature: String,
}

#[derive(Debug, Deserialize)]
struct OtpSignatureResponse {
    ax_signature: String,
}

/// HTTP client for the signing oracles.
#[derive(Debug, Clone)]
pub struct SigningOracle {
    config: Arc<AppConfig>,
    http: Client,
}

impl SigningOracle {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, XlError> {
        let http = Client::builder()
            .timeout(ORACLE_TIMEOUT)
            .build()
            .map_err(|e| XlError::Signing(format!("failed to build oracle HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Seal a request payload into the signed/encrypted transport envelope.
    pub async fn seal(
        &self,
        method: &str,
        path: &str,
        id_token: &str,
        payload: &Value,
    ) -> Result<SignedEnvelope, XlError> {
        let request = EnvelopeSignRequest {
            api_key: &self.config.api_key,
            method,
            path,
            id_token,
            payload,
        };
        self.post_json(&self.config.encrypt_sign_url, &request).await
    }

    /// Decrypt a response envelope back into its plaintext JSON body.
    ///
    /// Callers go through [`super::envelope::EnvelopeCodec::decode`], which
    /// downgrades failures here into tagged raw text.
    pub async fn open(&self, body: &Value) -> Result<Value, XlError> {
        let request = DecryptRequest {
            api_key: &self.config.api_key,
            body,
        };
        self.post_json(&self.config.decrypt_url, &request).await
    }

    /// Signature for the OTP token grant.
    pub async fn otp_signature(
        &self,
        ts: &str,
        contact: &str,
        code: &str,
        channel: &str,
    ) -> Result<String, XlError> {
        let request = OtpSignRequest {
            api_key: &self.config.api_key,
            ts,
            contact,
            code,
            channel,
        };
        let response: OtpSignatureResponse =
            self.post_json(&self.config.ax_sign_url, &request).await?;
        Self::non_empty(response.ax_signature)
    }

    /// Signature for a payment settlement call.
    pub async fn payment_signature(
        &self,
        access_token: &str,
        sig_time_sec: i64,
        package_code: &str,
        token_payment: &str,
        payment_method: &str,
    ) -> Result<String, XlError> {
        let request = PaymentSignRequest {
            api_key: &self.config.api_key,
            access_token,
            sig_time_sec,
            package_code,
            token_payment,
            payment_method,
        };
        let response: SignatureResponse =
            self.post_json(&self.config.payment_sign_url, &request).await?;
        Self::non_empty(response.x_signature)
    }

    /// Signature for a bounty redemption call.
    pub async fn bounty_signature(
        &self,
        access_token: &str,
        sig_time_sec: i64,
        package_code: &str,
        token_payment: &str,
    ) -> Result<String, XlError> {
        let request = BountySignRequest {
            api_key: &self.config.api_key,
            access_token,
            sig_time_sec,
            package_code,
            token_payment,
        };
        let response: SignatureResponse =
            self.post_json(&self.config.bounty_sign_url, &request).await?;
        Self::non_empty(response.x_signature)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, XlError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| XlError::Signing(format!("oracle request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(XlError::Signing(format!(
                "oracle at {url} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| XlError::Signing(format!("oracle at {url} returned invalid JSON: {e}")))
    }

    fn non_empty(signature: String) -> Result<String, XlError> {
        if signature.trim().is_empty() {
            return Err(XlError::Signing(
                "oracle returned an empty signature".to_string(),
            ));
        }
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::json;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn oracle_for(base: &str) -> SigningOracle {
        SigningOracle::new(Arc::new(AppConfig::for_tests(base))).unwrap()
    }

    #[tokio::test]
    async fn otp_signature_is_deterministic_over_identical_inputs() {
        // Stub derives the signature from the inputs, so two identical calls
        // must produce identical signatures.
        let router = Router::new().route(
            "/oracle/sign-ax",
            post(|Json(body): Json<Value>| async move {
                let sig = format!(
                    "sig-{}-{}-{}-{}-{}",
                    body["api_key"].as_str().unwrap(),
                    body["ts"].as_str().unwrap(),
                    body["contact"].as_str().unwrap(),
                    body["code"].as_str().unwrap(),
                    body["channel"].as_str().unwrap(),
                );
                Json(json!({ "ax_signature": sig }))
            }),
        );
        let base = spawn(router).await;
        let oracle = oracle_for(&base);

        let first = oracle
            .otp_signature("2023-10-20T12:34:56+0700", "6281234567890", "123456", "SMS")
            .await
            .unwrap();
        let second = oracle
            .otp_signature("2023-10-20T12:34:56+0700", "6281234567890", "123456", "SMS")
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("sig-test-api-key-"));
    }

    #[tokio::test]
    async fn oracle_failure_surfaces_as_signing_error() {
        let router = Router::new().route(
            "/oracle/sign-payment",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "oracle down") }),
        );
        let base = spawn(router).await;
        let oracle = oracle_for(&base);

        let err = oracle
            .payment_signature("at", 1_700_000_000, "PKG", "tp", "BALANCE")
            .await
            .unwrap_err();
        assert!(matches!(err, XlError::Signing(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_signature_is_rejected() {
        let router = Router::new().route(
            "/oracle/sign-bounty",
            post(|| async { Json(json!({ "x_signature": "" })) }),
        );
        let base = spawn(router).await;
        let oracle = oracle_for(&base);

        let err = oracle
            .bounty_signature("at", 1_700_000_000, "PKG", "tp")
            .await
            .unwrap_err();
        assert!(matches!(err, XlError::Signing(_)));
    }
}
