// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Carrier Backend Client
//!
//! Everything that talks to the carrier lives here: the signing-oracle
//! client, the envelope codec, the HTTP transport, the CIAM session manager,
//! and the purchase orchestrator built on top of them.
//!
//! The pipeline for one signed call is:
//!
//! 1. [`envelope::EnvelopeCodec::encode`] seals the payload through the
//!    encrypt+sign oracle and derives the signature time from the envelope's
//!    `xtime`.
//! 2. [`transport::Transport::post`] performs the single-shot HTTP exchange
//!    with the required headers.
//! 3. [`envelope::EnvelopeCodec::decode`] decrypts the response, degrading
//!    to tagged raw text when the body is not an envelope (maintenance
//!    pages, HTML errors).
//!
//! Signed requests are time-bound, so nothing in this module retries; a
//! failed call must be re-signed by the caller.

pub mod client;
pub mod envelope;
pub mod oracle;
pub mod payloads;
pub mod purchase;
pub mod session;
pub mod stamp;
pub mod transport;

#[cfg(test)]
pub(crate) mod testsupport;

use serde_json::Value;

pub use client::XlClient;
pub use envelope::DecodedBody;
pub use oracle::SigningOracle;
pub use purchase::{PaymentMethod, PurchaseOrchestrator, PurchaseOutcome};
pub use session::{SessionManager, TokenSet};

/// Errors produced by the carrier client.
///
/// Decode failures are deliberately absent: an undecodable response body is
/// expected behavior upstream and is returned as
/// [`DecodedBody::Undecodable`] rather than an error.
#[derive(Debug, thiserror::Error)]
pub enum XlError {
    /// Input rejected locally, before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The signing oracle was unreachable or returned garbage. A signature
    /// is never silently substituted with an empty string.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Timeout or connection failure talking to the backend.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The backend answered, but with a non-SUCCESS status payload. The
    /// decrypted body is carried for diagnosis.
    #[error("upstream returned status {status}")]
    UpstreamStatus { status: String, body: Value },

    /// The refresh token is no longer active; the account must
    /// re-authenticate from scratch.
    #[error("session is no longer active")]
    SessionExpired,

    /// The response decoded but is missing a field the operation needs.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl XlError {
    /// Stable machine-readable tag for logging and front-door payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            XlError::Validation(_) => "validation",
            XlError::Signing(_) => "signing",
            XlError::Transport(_) => "transport",
            XlError::UpstreamStatus { .. } => "upstream_status",
            XlError::SessionExpired => "session_expired",
            XlError::InvalidResponse(_) => "invalid_response",
        }
    }
}
