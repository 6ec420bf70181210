// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! High-level operations against the carrier API.
//!
//! [`XlClient`] composes the oracle, the envelope codec, and the transport
//! into one `send` pipeline and exposes the backend operations on top of
//! it: profile/balance/package lookups sealed with the generic envelope
//! signature, and settlement calls whose `x-signature` header instead
//! carries the payment or bounty scheme.

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;

use super::envelope::{DecodedBody, EnvelopeCodec, RequestSpec};
use super::oracle::SigningOracle;
use super::payloads::{
    BalanceRequest, BalanceSettlementRequest, BountyRedeemRequest, EwalletSettlementRequest,
    FamiliesRequest, FamilyRequest, PackageDetailRequest, PaymentMethodsRequest,
    PendingDetailRequest, ProfileRequest, QrisSettlementRequest, QuotaDetailsRequest,
};
use super::purchase::PaymentToken;
use super::session::TokenSet;
use super::stamp;
use super::transport::{OutboundHeaders, Transport};
use super::XlError;

pub const PROFILE_PATH: &str = "api/v8/profile";
pub const BALANCE_PATH: &str = "api/v8/packages/balance-and-credit";
pub const QUOTA_DETAILS_PATH: &str = "api/v8/packages/quota-details";
pub const FAMILY_PATH: &str = "api/v8/xl-stores/options/list";
pub const FAMILIES_PATH: &str = "api/v8/xl-stores/families";
pub const PACKAGE_DETAIL_PATH: &str = "api/v8/xl-stores/options/detail";
pub const PAYMENT_METHODS_PATH: &str = "payments/api/v8/payment-methods-option";
pub const SETTLEMENT_BALANCE_PATH: &str = "payments/api/v8/settlement-balance";
pub const SETTLEMENT_EWALLET_PATH: &str = "payments/api/v8/settlement-multipayment/ewallet";
pub const SETTLEMENT_QRIS_PATH: &str = "payments/api/v8/settlement-multipayment/qris";
pub const PENDING_DETAIL_PATH: &str = "payments/api/v8/pending-detail";
pub const BOUNTIES_EXCHANGE_PATH: &str = "api/v8/personalization/bounties-exchange";

/// The quote extracted from a package detail lookup: everything the
/// purchase chain needs from step one.
#[derive(Debug, Clone)]
pub struct PackageQuote {
    /// Token binding this quote to the payment-method step.
    pub token_confirmation: String,
    /// Canonical package option code used as the settlement item.
    pub payment_target: String,
    /// Quoted price.
    pub price: i64,
    /// Full decrypted detail body, kept for diagnostics.
    pub details: Value,
}

/// Client for the carrier backend, built once per process and shared.
#[derive(Debug, Clone)]
pub struct XlClient {
    oracle: SigningOracle,
    codec: EnvelopeCodec,
    transport: Transport,
}

impl XlClient {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, XlError> {
        let oracle = SigningOracle::new(Arc::clone(&config))?;
        let codec = EnvelopeCodec::new(oracle.clone());
        let transport = Transport::new(config)?;
        Ok(Self {
            oracle,
            codec,
            transport,
        })
    }

    pub fn oracle(&self) -> &SigningOracle {
        &self.oracle
    }

    /// Seal, send, and decode one request with the generic envelope
    /// signature.
    pub async fn send(&self, spec: RequestSpec<'_>) -> Result<DecodedBody, XlError> {
        let sealed = self.codec.encode(&spec).await?;
        let raw = self
            .transport
            .post(
                spec.path,
                OutboundHeaders {
                    id_token: spec.id_token,
                    signature: &sealed.signature,
                    sig_time_sec: sealed.sig_time_sec,
                    request_at: stamp::now_gmt7(),
                },
                &sealed.body,
            )
            .await?;
        Ok(self.codec.decode(&raw).await)
    }

    /// Seal and send a settlement request whose `x-signature` carries a
    /// payment/bounty scheme signature instead of the envelope's own. The
    /// `x-signature-time` still comes from the envelope, and `x-request-at`
    /// is stamped from it so the two always agree.
    async fn send_with_signature(
        &self,
        spec: RequestSpec<'_>,
        signature: &str,
    ) -> Result<DecodedBody, XlError> {
        let sealed = self.codec.encode(&spec).await?;
        let raw = self
            .transport
            .post(
                spec.path,
                OutboundHeaders {
                    id_token: spec.id_token,
                    signature,
                    sig_time_sec: sealed.sig_time_sec,
                    request_at: stamp::gmt7_from_epoch(sealed.sig_time_sec),
                },
                &sealed.body,
            )
            .await?;
        Ok(self.codec.decode(&raw).await)
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    pub async fn profile(&self, tokens: &TokenSet) -> Result<Value, XlError> {
        let payload = to_payload(&ProfileRequest::new(&tokens.access_token))?;
        self.send(RequestSpec::post(PROFILE_PATH, &tokens.id_token, payload))
            .await?
            .into_success_data()
    }

    /// Prepaid balance block from `balance-and-credit`.
    pub async fn balance(&self, tokens: &TokenSet) -> Result<Value, XlError> {
        let payload = to_payload(&BalanceRequest::default())?;
        let data = self
            .send(RequestSpec::post(BALANCE_PATH, &tokens.id_token, payload))
            .await?
            .into_success_data()?;
        data.get("balance")
            .cloned()
            .ok_or_else(|| XlError::InvalidResponse("balance block missing".to_string()))
    }

    /// Raw quota-details body, decoded or tagged raw.
    pub async fn quota_details(&self, tokens: &TokenSet) -> Result<Value, XlError> {
        let payload = to_payload(&QuotaDetailsRequest::default())?;
        Ok(self
            .send(RequestSpec::post(QUOTA_DETAILS_PATH, &tokens.id_token, payload))
            .await?
            .into_value())
    }

    /// Packages within one family.
    pub async fn family(&self, tokens: &TokenSet, family_code: &str) -> Result<Value, XlError> {
        let payload = to_payload(&FamilyRequest::new(family_code))?;
        self.send(RequestSpec::post(FAMILY_PATH, &tokens.id_token, payload))
            .await?
            .into_success_data()
    }

    /// Families within one store category.
    pub async fn families(
        &self,
        tokens: &TokenSet,
        package_category_code: &str,
    ) -> Result<Value, XlError> {
        let payload = to_payload(&FamiliesRequest::new(package_category_code))?;
        self.send(RequestSpec::post(FAMILIES_PATH, &tokens.id_token, payload))
            .await?
            .into_success_data()
    }

    /// Package detail lookup, reduced to the purchase quote.
    pub async fn package_detail(
        &self,
        tokens: &TokenSet,
        package_option_code: &str,
    ) -> Result<PackageQuote, XlError> {
        let payload = to_payload(&PackageDetailRequest::new(package_option_code))?;
        let data = self
            .send(RequestSpec::post(
                PACKAGE_DETAIL_PATH,
                &tokens.id_token,
                payload,
            ))
            .await?
            .into_success_data()?;

        let token_confirmation = data
            .get("token_confirmation")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                XlError::InvalidResponse("package detail missing token_confirmation".to_string())
            })?
            .to_string();
        let option = data.get("package_option").unwrap_or(&Value::Null);
        let payment_target = option
            .get("package_option_code")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                XlError::InvalidResponse("package detail missing package_option_code".to_string())
            })?
            .to_string();
        let price = option.get("price").and_then(Value::as_i64).unwrap_or(0);

        Ok(PackageQuote {
            token_confirmation,
            payment_target,
            price,
            details: data,
        })
    }

    // -------------------------------------------------------------------
    // Payments
    // -------------------------------------------------------------------

    /// Resolve payment methods for a quoted package. The returned
    /// [`PaymentToken`] is the only way to obtain a token/timestamp pair,
    /// which keeps mismatched pairs out of settlement calls.
    pub async fn payment_methods(
        &self,
        tokens: &TokenSet,
        token_confirmation: &str,
        payment_target: &str,
    ) -> Result<(PaymentToken, Value), XlError> {
        let payload = to_payload(&PaymentMethodsRequest::new(
            payment_target,
            token_confirmation,
        ))?;
        let data = self
            .send(RequestSpec::post(
                PAYMENT_METHODS_PATH,
                &tokens.id_token,
                payload,
            ))
            .await?
            .into_success_data()?;

        let token_payment = data
            .get("token_payment")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                XlError::InvalidResponse("payment methods missing token_payment".to_string())
            })?;
        let timestamp = data
            .get("timestamp")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                XlError::InvalidResponse("payment methods missing timestamp".to_string())
            })?;

        Ok((PaymentToken::new(token_payment, timestamp), data))
    }

    /// Settle against the prepaid balance.
    pub async fn settle_balance(
        &self,
        tokens: &TokenSet,
        token: &PaymentToken,
        token_confirmation: &str,
        item_code: &str,
        amount: i64,
    ) -> Result<DecodedBody, XlError> {
        info!(%item_code, amount, "settling with BALANCE");
        let payload = to_payload(&BalanceSettlementRequest::new(
            &tokens.access_token,
            token_confirmation,
            token.token(),
            token.timestamp(),
            item_code,
            amount,
        ))?;
        let signature = self
            .oracle
            .payment_signature(
                &tokens.access_token,
                token.timestamp(),
                item_code,
                token.token(),
                "BALANCE",
            )
            .await?;
        self.send_with_signature(
            RequestSpec::post(SETTLEMENT_BALANCE_PATH, &tokens.id_token, payload),
            &signature,
        )
        .await
    }

    /// Settle through an e-wallet provider. `payment_method` is the
    /// provider label the backend expects (DANA, OVO, GOPAY, SHOPEEPAY).
    #[allow(clippy::too_many_arguments)]
    pub async fn settle_ewallet(
        &self,
        tokens: &TokenSet,
        token: &PaymentToken,
        item_code: &str,
        price: i64,
        wallet_number: &str,
        payment_method: &str,
    ) -> Result<DecodedBody, XlError> {
        info!(%item_code, price, %payment_method, "settling with e-wallet");
        let payload = to_payload(&EwalletSettlementRequest::new(
            &tokens.access_token,
            token.token(),
            token.timestamp(),
            item_code,
            price,
            wallet_number,
            payment_method,
            "",
        ))?;
        let signature = self
            .oracle
            .payment_signature(
                &tokens.access_token,
                token.timestamp(),
                item_code,
                token.token(),
                payment_method,
            )
            .await?;
        self.send_with_signature(
            RequestSpec::post(SETTLEMENT_EWALLET_PATH, &tokens.id_token, payload),
            &signature,
        )
        .await
    }

    /// Settle via QRIS. The caller follows up with [`Self::pending_detail`]
    /// to obtain the renderable QR payload.
    pub async fn settle_qris(
        &self,
        tokens: &TokenSet,
        token: &PaymentToken,
        item_code: &str,
        price: i64,
    ) -> Result<DecodedBody, XlError> {
        info!(%item_code, price, "settling with QRIS");
        let payload = to_payload(&QrisSettlementRequest::new(
            &tokens.access_token,
            token.token(),
            token.timestamp(),
            item_code,
            price,
            "",
        ))?;
        let signature = self
            .oracle
            .payment_signature(
                &tokens.access_token,
                token.timestamp(),
                item_code,
                token.token(),
                "QRIS",
            )
            .await?;
        self.send_with_signature(
            RequestSpec::post(SETTLEMENT_QRIS_PATH, &tokens.id_token, payload),
            &signature,
        )
        .await
    }

    /// Pending-transaction detail, used to fetch the QR payload for a QRIS
    /// settlement. Sealed with the generic envelope signature.
    pub async fn pending_detail(
        &self,
        tokens: &TokenSet,
        transaction_id: &str,
    ) -> Result<DecodedBody, XlError> {
        let payload = to_payload(&PendingDetailRequest::new(transaction_id))?;
        self.send(RequestSpec::post(
            PENDING_DETAIL_PATH,
            &tokens.id_token,
            payload,
        ))
        .await
    }

    /// Redeem a bounty voucher for a package. Uses the bounty signature
    /// scheme; a zero amount is valid.
    pub async fn redeem_bounty(
        &self,
        tokens: &TokenSet,
        token: &PaymentToken,
        item_code: &str,
        amount: i64,
    ) -> Result<DecodedBody, XlError> {
        info!(%item_code, amount, "redeeming bounty");
        let payload = to_payload(&BountyRedeemRequest::new(
            &tokens.access_token,
            token.token(),
            token.timestamp(),
            item_code,
            amount,
            "",
        ))?;
        let signature = self
            .oracle
            .bounty_signature(
                &tokens.access_token,
                token.timestamp(),
                item_code,
                token.token(),
            )
            .await?;
        self.send_with_signature(
            RequestSpec::post(BOUNTIES_EXCHANGE_PATH, &tokens.id_token, payload),
            &signature,
        )
        .await
    }
}

fn to_payload<T: serde::Serialize>(payload: &T) -> Result<Value, XlError> {
    serde_json::to_value(payload)
        .map_err(|e| XlError::InvalidResponse(format!("failed to serialize request payload: {e}")))
}
