// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup into an
//! [`AppConfig`] value that is injected into every component. Nothing reads
//! the environment after startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `API_KEY` | Carrier API key, forwarded to the signing oracles | Required |
//! | `XL_BASE_URL` | Carrier API base URL | `https://api.myxl.xlaxiata.co.id` |
//! | `CIAM_BASE_URL` | CIAM (login/refresh) base URL | `https://gede.ciam.xlaxiata.co.id` |
//! | `XDATA_ENCRYPT_SIGN_URL` | Envelope encrypt+sign oracle | `https://crypto.mashu.lol/api/sign` |
//! | `XDATA_DECRYPT_URL` | Envelope decrypt oracle | `https://crypto.mashu.lol/api/decrypt` |
//! | `PAYMENT_SIGN_URL` | Payment-settlement signature oracle | `https://crypto.mashu.lol/api/sign-payment` |
//! | `BOUNTY_SIGN_URL` | Bounty-redeem signature oracle | `https://crypto.mashu.lol/api/sign-bounty` |
//! | `AX_SIGN_URL` | OTP-login signature oracle | `https://crypto.mashu.lol/api/sign-ax` |
//! | `CORS_ALLOW_ORIGINS` | Comma-separated allowed origins | `*` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use thiserror::Error;

const DEFAULT_XL_BASE_URL: &str = "https://api.myxl.xlaxiata.co.id";
const DEFAULT_CIAM_BASE_URL: &str = "https://gede.ciam.xlaxiata.co.id";
const DEFAULT_ENCRYPT_SIGN_URL: &str = "https://crypto.mashu.lol/api/sign";
const DEFAULT_DECRYPT_URL: &str = "https://crypto.mashu.lol/api/decrypt";
const DEFAULT_PAYMENT_SIGN_URL: &str = "https://crypto.mashu.lol/api/sign-payment";
const DEFAULT_BOUNTY_SIGN_URL: &str = "https://crypto.mashu.lol/api/sign-bounty";
const DEFAULT_AX_SIGN_URL: &str = "https://crypto.mashu.lol/api/sign-ax";

/// Version string the official client reports; the backend rejects requests
/// that do not carry it in `x-version-app`.
pub const APP_VERSION: &str = "8.6.0";

/// User agent of the official Android client build this gateway impersonates.
pub const USER_AGENT: &str =
    "myXL / 8.6.0(1179); com.android.vending; (samsung; SM-N935F; SDK 33; Android 13)";

/// Header-versioning value required by the carrier API (`x-hv`).
pub const HEADER_VERSION: &str = "v3";

/// Registered device identity presented to CIAM on every auth call. The
/// fingerprint is bound to the device id; they must be sent together.
pub const DEVICE_ID: &str = "92fb44c0804233eb4d9e29f838223a14";
pub const DEVICE_FINGERPRINT: &str =
    "YmQLy9ZiLLBFAEVcI4Dnw9+NJWZcdGoQyewxMF/9hbfk/8GbKBgtZxqdiiam8+m2lK31E/zJQ7kjuPXpB3EE8naYL0Q8+0WLhFV1WAPl9Eg=";
pub const DEVICE_NAME: &str = "samsung";
pub const DEVICE_MODEL: &str = "SM-N935F";
pub const SUBSCRIPTION_TYPE: &str = "PREPAID";

/// CIAM client credentials (public in the shipped APK).
pub const CIAM_BASIC_AUTH: &str =
    "Basic OWZjOTdlZDEtNmEzMC00OGQ1LTk1MTYtNjBjNTNjZTNhMTM1OllEV21GNExKajlYSUt3UW56eTJlMmxiMHRKUWIyOW8z";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
}

/// Process-wide configuration, read-only after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Carrier API key, threaded into every signing-oracle call and sent as
    /// `x-api-key` on every backend request.
    pub api_key: String,
    /// Carrier API base URL.
    pub base_url: String,
    /// CIAM base URL (OTP login, token refresh).
    pub ciam_base_url: String,
    /// Envelope encrypt+sign oracle endpoint.
    pub encrypt_sign_url: String,
    /// Envelope decrypt oracle endpoint.
    pub decrypt_url: String,
    /// Payment-settlement signature oracle endpoint.
    pub payment_sign_url: String,
    /// Bounty-redeem signature oracle endpoint.
    pub bounty_sign_url: String,
    /// OTP-login signature oracle endpoint.
    pub ax_sign_url: String,
    /// Allowed CORS origins for the front door.
    pub cors_allow_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// `API_KEY` is the only required variable; everything else has a
    /// production default matching the live endpoints.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("API_KEY")?;

        let cors_allow_origins = env_or_default("CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            api_key,
            base_url: env_or_default("XL_BASE_URL", DEFAULT_XL_BASE_URL),
            ciam_base_url: env_or_default("CIAM_BASE_URL", DEFAULT_CIAM_BASE_URL),
            encrypt_sign_url: env_or_default("XDATA_ENCRYPT_SIGN_URL", DEFAULT_ENCRYPT_SIGN_URL),
            decrypt_url: env_or_default("XDATA_DECRYPT_URL", DEFAULT_DECRYPT_URL),
            payment_sign_url: env_or_default("PAYMENT_SIGN_URL", DEFAULT_PAYMENT_SIGN_URL),
            bounty_sign_url: env_or_default("BOUNTY_SIGN_URL", DEFAULT_BOUNTY_SIGN_URL),
            ax_sign_url: env_or_default("AX_SIGN_URL", DEFAULT_AX_SIGN_URL),
            cors_allow_origins,
        })
    }

    /// Configuration suitable for tests: everything pointed at the given
    /// base URL so stub servers can answer all roles.
    #[cfg(test)]
    pub fn for_tests(base: &str) -> Self {
        Self {
            api_key: "test-api-key".to_string(),
            base_url: base.to_string(),
            ciam_base_url: base.to_string(),
            encrypt_sign_url: format!("{base}/oracle/sign"),
            decrypt_url: format!("{base}/oracle/decrypt"),
            payment_sign_url: format!("{base}/oracle/sign-payment"),
            bounty_sign_url: format!("{base}/oracle/sign-bounty"),
            ax_sign_url: format!("{base}/oracle/sign-ax"),
            cors_allow_origins: vec!["*".to_string()],
        }
    }
}

fn env_required(name: &'static str) -> Result<String, ConfigError> {
    env_optional(name).ok_or(ConfigError::Missing(name))
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
