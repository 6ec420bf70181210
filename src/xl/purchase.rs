// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Purchase orchestration.
//!
//! A purchase is not one call but a chain of three:
//!
//! ```text
//! START ─► QUOTE_FETCHED ─► PAYMENT_METHOD_RESOLVED ─► SETTLED
//!    │            │                   │
//!    └────────────┴───────────────────┴──► FAILED(step)
//! ```
//!
//! Each step's output feeds the next (quote → token_confirmation →
//! token_payment → settlement), so the chain is strictly sequential. Every
//! terminal state, success or failure, carries the partial results gathered
//! so far; nothing escapes the orchestrator as an error.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::client::XlClient;
use super::session::TokenSet;
use super::XlError;

/// A settlement token and the timestamp it was issued with.
///
/// The pair is produced together by payment-method resolution and must
/// reach settlement unmodified; signing with a timestamp from a different
/// call is a protocol violation. The fields are private and only
/// [`XlClient::payment_methods`] constructs the pair, so a mismatch cannot
/// be assembled outside this module.
#[derive(Debug, Clone)]
pub struct PaymentToken {
    token: String,
    timestamp: i64,
}

impl PaymentToken {
    pub(crate) fn new(token: &str, timestamp: i64) -> Self {
        Self {
            token: token.to_string(),
            timestamp,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// E-wallet providers the backend settles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EwalletProvider {
    Dana,
    Ovo,
    Gopay,
    Shopeepay,
}

impl EwalletProvider {
    pub fn label(&self) -> &'static str {
        match self {
            EwalletProvider::Dana => "DANA",
            EwalletProvider::Ovo => "OVO",
            EwalletProvider::Gopay => "GOPAY",
            EwalletProvider::Shopeepay => "SHOPEEPAY",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "DANA" => Some(EwalletProvider::Dana),
            "OVO" => Some(EwalletProvider::Ovo),
            "GOPAY" => Some(EwalletProvider::Gopay),
            "SHOPEEPAY" => Some(EwalletProvider::Shopeepay),
            _ => None,
        }
    }
}

/// How a purchase settles. Selects the settlement payload shape and the
/// signature scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Prepaid balance.
    Balance,
    /// QRIS: settle, then fetch the renderable QR payload.
    Qris,
    /// External e-wallet; the settlement payload carries the wallet number.
    Ewallet {
        provider: EwalletProvider,
        wallet_number: String,
    },
    /// Bounty voucher redemption; not a monetary purchase.
    Bounty,
}

impl PaymentMethod {
    /// Parse the front-door `method` field. E-wallet methods require a
    /// wallet number.
    pub fn from_request(method: &str, wallet_number: Option<&str>) -> Result<Self, XlError> {
        match method {
            "BALANCE" => Ok(PaymentMethod::Balance),
            "QRIS" => Ok(PaymentMethod::Qris),
            "BOUNTY" => Ok(PaymentMethod::Bounty),
            other => {
                let provider = EwalletProvider::from_label(other).ok_or_else(|| {
                    XlError::Validation(format!("unknown payment method: {other}"))
                })?;
                let wallet_number = wallet_number
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        XlError::Validation(format!(
                            "payment method {other} requires wallet_number"
                        ))
                    })?;
                Ok(PaymentMethod::Ewallet {
                    provider,
                    wallet_number: wallet_number.to_string(),
                })
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Balance => "BALANCE",
            PaymentMethod::Qris => "QRIS",
            PaymentMethod::Ewallet { provider, .. } => provider.label(),
            PaymentMethod::Bounty => "BOUNTY",
        }
    }
}

/// Orchestrator steps, recorded on every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStep {
    Start,
    GetPackage,
    PaymentInit,
    Settlement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Success,
    Error,
}

/// A QRIS settlement's renderable result.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QrisPayment {
    /// Transaction id from settlement, threaded verbatim into the
    /// pending-detail fetch.
    pub transaction_id: String,
    /// QR string to render for the subscriber.
    pub qr_code: String,
}

/// Partial results accumulated while the chain runs. Present on failures
/// too, so a caller can see exactly how far the purchase got.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct PurchaseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub package_details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub payment_methods: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub settlement: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qris: Option<QrisPayment>,
}

/// Terminal state of one orchestrated purchase.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseOutcome {
    pub status: PurchaseStatus,
    /// The last step that ran (the failing one on error).
    pub step: PurchaseStep,
    pub data: PurchaseData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PurchaseOutcome {
    fn settled(data: PurchaseData) -> Self {
        Self {
            status: PurchaseStatus::Success,
            step: PurchaseStep::Settlement,
            data,
            error: None,
        }
    }

    fn failed(step: PurchaseStep, data: PurchaseData, error: &XlError) -> Self {
        warn!(step = ?step, kind = error.kind(), %error, "purchase chain failed");
        Self {
            status: PurchaseStatus::Error,
            step,
            data,
            error: Some(error.to_string()),
        }
    }
}

/// Sequences quote retrieval, payment-method resolution, and settlement
/// into one logical transaction.
#[derive(Debug, Clone)]
pub struct PurchaseOrchestrator {
    client: XlClient,
}

impl PurchaseOrchestrator {
    pub fn new(client: XlClient) -> Self {
        Self { client }
    }

    /// Run the full chain. Never returns an error: every failure is folded
    /// into the outcome with the failing step tagged.
    pub async fn purchase(
        &self,
        tokens: &TokenSet,
        package_option_code: &str,
        method: PaymentMethod,
        price_override: Option<i64>,
    ) -> PurchaseOutcome {
        let mut data = PurchaseData::default();
        info!(%package_option_code, method = method.label(), "starting purchase");

        // START -> QUOTE_FETCHED
        let quote = match self
            .client
            .package_detail(tokens, package_option_code)
            .await
        {
            Ok(quote) => quote,
            Err(err) => {
                if let XlError::UpstreamStatus { body, .. } = &err {
                    data.package_details = Some(body.clone());
                }
                return PurchaseOutcome::failed(PurchaseStep::GetPackage, data, &err);
            }
        };
        data.package_details = Some(quote.details.clone());
        // Caller-supplied override wins over the quoted price; this is how
        // promotional settlement amounts are applied.
        let amount = price_override.unwrap_or(quote.price);

        // QUOTE_FETCHED -> PAYMENT_METHOD_RESOLVED
        let (payment_token, methods_body) = match self
            .client
            .payment_methods(tokens, &quote.token_confirmation, &quote.payment_target)
            .await
        {
            Ok(resolved) => resolved,
            Err(err) => {
                if let XlError::UpstreamStatus { body, .. } = &err {
                    data.payment_methods = Some(body.clone());
                }
                return PurchaseOutcome::failed(PurchaseStep::PaymentInit, data, &err);
            }
        };
        data.payment_methods = Some(methods_body);

        // PAYMENT_METHOD_RESOLVED -> SETTLED
        let settlement = match &method {
            PaymentMethod::Balance => {
                self.client
                    .settle_balance(
                        tokens,
                        &payment_token,
                        &quote.token_confirmation,
                        &quote.payment_target,
                        amount,
                    )
                    .await
            }
            PaymentMethod::Qris => {
                self.client
                    .settle_qris(tokens, &payment_token, &quote.payment_target, amount)
                    .await
            }
            PaymentMethod::Ewallet {
                provider,
                wallet_number,
            } => {
                self.client
                    .settle_ewallet(
                        tokens,
                        &payment_token,
                        &quote.payment_target,
                        amount,
                        wallet_number,
                        provider.label(),
                    )
                    .await
            }
            PaymentMethod::Bounty => {
                self.client
                    .redeem_bounty(tokens, &payment_token, &quote.payment_target, amount)
                    .await
            }
        };

        let settlement_body = match settlement {
            Ok(decoded) => decoded,
            Err(err) => return PurchaseOutcome::failed(PurchaseStep::Settlement, data, &err),
        };
        data.settlement = Some(settlement_body.clone().into_value());

        let settlement_data = match settlement_body.into_success_data() {
            Ok(body) => body,
            Err(err) => return PurchaseOutcome::failed(PurchaseStep::Settlement, data, &err),
        };

        // QRIS settles in two phases: the transaction id from settlement is
        // reused verbatim to fetch the renderable QR payload.
        if method == PaymentMethod::Qris {
            let transaction_id = match settlement_data
                .get("transaction_code")
                .and_then(Value::as_str)
            {
                Some(id) => id.to_string(),
                None => {
                    let err = XlError::InvalidResponse(
                        "QRIS settlement missing transaction_code".to_string(),
                    );
                    return PurchaseOutcome::failed(PurchaseStep::Settlement, data, &err);
                }
            };

            let pending = match self.client.pending_detail(tokens, &transaction_id).await {
                Ok(decoded) => decoded,
                Err(err) => return PurchaseOutcome::failed(PurchaseStep::Settlement, data, &err),
            };
            let qr_code = match pending
                .into_success_data()
                .map(|body| body.get("qr_code").and_then(Value::as_str).map(str::to_string))
            {
                Ok(Some(code)) => code,
                Ok(None) => {
                    let err = XlError::InvalidResponse(
                        "pending detail missing qr_code".to_string(),
                    );
                    return PurchaseOutcome::failed(PurchaseStep::Settlement, data, &err);
                }
                Err(err) => return PurchaseOutcome::failed(PurchaseStep::Settlement, data, &err),
            };

            data.qris = Some(QrisPayment {
                transaction_id,
                qr_code,
            });
        }

        info!(%package_option_code, "purchase settled");
        PurchaseOutcome::settled(data)
    }
}
