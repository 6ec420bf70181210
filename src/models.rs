// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request bodies accepted by the front door. All types derive
//! `Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation; responses are either passthrough carrier bodies or the
//! typed purchase outcome from [`crate::xl::purchase`].
//!
//! Every authenticated operation carries the caller's [`TokenSet`] in the
//! body, mirroring how the carrier's own clients hold tokens: the gateway
//! never stores credentials.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::xl::TokenSet;

/// Request an OTP for a subscriber number.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OtpRequestBody {
    /// MSISDN in international prepaid form (starts with `628`).
    pub contact: String,
}

/// Exchange a delivered OTP code for tokens.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OtpVerifyBody {
    /// MSISDN the OTP was sent to.
    pub contact: String,
    /// 6-digit OTP code.
    pub code: String,
}

/// Refresh an existing session.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshBody {
    pub refresh_token: String,
}

/// Operations that need nothing beyond the session tokens.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokensBody {
    pub tokens: TokenSet,
}

/// Package listing for one family.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FamilyBody {
    pub tokens: TokenSet,
    pub family_code: String,
}

/// Family listing for one store category.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FamiliesBody {
    pub tokens: TokenSet,
    pub package_category_code: String,
}

/// Package detail (purchase quote) lookup.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PackageOptionBody {
    pub tokens: TokenSet,
    pub package_option_code: String,
}

/// Payment-method listing for a quoted package.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentMethodsBody {
    pub tokens: TokenSet,
    /// Token binding the quote to the payment step.
    pub token_confirmation: String,
    /// Canonical package option code from the quote.
    pub payment_target: String,
}

/// Full purchase dispatch.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurchaseBody {
    pub tokens: TokenSet,
    pub package_option_code: String,
    /// `BALANCE`, `QRIS`, `DANA`, `OVO`, `GOPAY`, or `SHOPEEPAY`.
    pub method: String,
    /// Required for e-wallet methods.
    #[serde(default)]
    pub wallet_number: Option<String>,
    /// Settle at this amount instead of the quoted price (promotional or
    /// discounted settlements).
    #[serde(default)]
    pub price_override: Option<i64>,
}

/// Bounty voucher redemption.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BountyBody {
    pub tokens: TokenSet,
    pub package_option_code: String,
}
