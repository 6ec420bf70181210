// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transport envelope encoding and decoding.
//!
//! Outgoing payloads are sealed by the encrypt+sign oracle into an envelope
//! carrying the ciphertext and an `xtime` epoch-millisecond stamp. The
//! signature time sent in `x-signature-time` is always `xtime / 1000`
//! truncated, derived here exactly once; the two must never diverge.
//!
//! Incoming bodies are decrypted through the oracle. Upstream failures
//! (maintenance pages, HTML error bodies) are expected, so an undecodable
//! response is returned tagged rather than raised.

use serde::Deserialize;
use serde_json::Value;

use super::oracle::SigningOracle;
use super::XlError;

/// The semantic fields of one signed call. Immutable per call.
#[derive(Debug, Clone)]
pub struct RequestSpec<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub id_token: &'a str,
    pub payload: Value,
}

impl<'a> RequestSpec<'a> {
    pub fn post(path: &'a str, id_token: &'a str, payload: Value) -> Self {
        Self {
            method: "POST",
            path,
            id_token,
            payload,
        }
    }
}

/// The oracle's sealed form of a request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedEnvelope {
    /// Opaque ciphertext fields plus the `xtime` stamp the oracle signed.
    pub encrypted_body: Value,
    /// Signature over the envelope.
    pub x_signature: String,
}

impl SignedEnvelope {
    /// Epoch milliseconds the oracle embedded in the envelope.
    pub fn xtime(&self) -> Result<i64, XlError> {
        self.encrypted_body
            .get("xtime")
            .and_then(Value::as_i64)
            .ok_or_else(|| XlError::InvalidResponse("envelope is missing xtime".to_string()))
    }

    /// Signature time in epoch seconds, truncated from `xtime`.
    pub fn sig_time_sec(&self) -> Result<i64, XlError> {
        Ok(self.xtime()? / 1000)
    }
}

/// A request ready for transport: sealed body plus the header values that
/// must agree with what was signed.
#[derive(Debug, Clone)]
pub struct SealedRequest {
    pub body: Value,
    pub signature: String,
    pub sig_time_sec: i64,
}

/// Result of decoding a backend response.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// Decrypted JSON body.
    Decoded(Value),
    /// The response was not a decryptable envelope; the original text is
    /// preserved for diagnosis.
    Undecodable(String),
}

impl DecodedBody {
    /// Extract `data` from a `status == "SUCCESS"` body, mapping everything
    /// else to the matching error.
    pub fn into_success_data(self) -> Result<Value, XlError> {
        match self {
            DecodedBody::Decoded(body) => {
                let status = body
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("UNKNOWN")
                    .to_string();
                if status == "SUCCESS" {
                    body.get("data").cloned().ok_or_else(|| {
                        XlError::InvalidResponse("SUCCESS body is missing data".to_string())
                    })
                } else {
                    Err(XlError::UpstreamStatus { status, body })
                }
            }
            DecodedBody::Undecodable(raw) => Err(XlError::UpstreamStatus {
                status: "UNDECODABLE".to_string(),
                body: Value::String(raw),
            }),
        }
    }

    /// Front-door representation: decoded bodies pass through, undecodable
    /// ones are wrapped so callers still get valid JSON.
    pub fn into_value(self) -> Value {
        match self {
            DecodedBody::Decoded(body) => body,
            DecodedBody::Undecodable(raw) => {
                serde_json::json!({ "status": "UNDECODABLE", "raw": raw })
            }
        }
    }
}

/// Seals outgoing payloads and opens incoming responses through the oracle.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    oracle: SigningOracle,
}

impl EnvelopeCodec {
    pub fn new(oracle: SigningOracle) -> Self {
        Self { oracle }
    }

    /// Seal `spec` and derive the signature time from the envelope.
    pub async fn encode(&self, spec: &RequestSpec<'_>) -> Result<SealedRequest, XlError> {
        let envelope = self
            .oracle
            .seal(spec.method, spec.path, spec.id_token, &spec.payload)
            .await?;
        let sig_time_sec = envelope.sig_time_sec()?;
        Ok(SealedRequest {
            body: envelope.encrypted_body,
            signature: envelope.x_signature,
            sig_time_sec,
        })
    }

    /// Decode a raw response body. Never fails: anything that is not a
    /// decryptable envelope comes back as [`DecodedBody::Undecodable`].
    pub async fn decode(&self, raw: &str) -> DecodedBody {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => return DecodedBody::Undecodable(raw.to_string()),
        };
        match self.oracle.open(&parsed).await {
            Ok(plain) => DecodedBody::Decoded(plain),
            Err(err) => {
                tracing::debug!(error = %err, "response body did not decrypt, passing raw text through");
                DecodedBody::Undecodable(raw.to_string())
            }
        }
    }
}
