// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request payload shapes, one struct per backend path.
//!
//! The backend accepts loosely similar JSON bodies across paths that differ
//! in a handful of load-bearing fields. Each shape is pinned down as its own
//! struct so the near-duplicates cannot drift silently. Field declaration
//! order is the wire order the envelope oracle signs over.

use serde::Serialize;
use serde_json::Value;

const LANG: &str = "en";

/// `api/v8/profile`
#[derive(Debug, Clone, Serialize)]
pub struct ProfileRequest {
    pub access_token: String,
    pub app_version: String,
    pub is_enterprise: bool,
    pub lang: &'static str,
}

impl ProfileRequest {
    pub fn new(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            app_version: crate::config::APP_VERSION.to_string(),
            is_enterprise: false,
            lang: LANG,
        }
    }
}

/// `api/v8/packages/balance-and-credit`
#[derive(Debug, Clone, Serialize)]
pub struct BalanceRequest {
    pub is_enterprise: bool,
    pub lang: &'static str,
}

impl Default for BalanceRequest {
    fn default() -> Self {
        Self {
            is_enterprise: false,
            lang: LANG,
        }
    }
}

/// `api/v8/packages/quota-details`
#[derive(Debug, Clone, Serialize)]
pub struct QuotaDetailsRequest {
    pub is_enterprise: bool,
    pub lang: &'static str,
}

impl Default for QuotaDetailsRequest {
    fn default() -> Self {
        Self {
            is_enterprise: false,
            lang: LANG,
        }
    }
}

/// `api/v8/xl-stores/options/list`: packages within one family.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyRequest {
    pub is_show_tagging_tab: bool,
    pub is_dedicated_event: bool,
    pub is_transaction_routine: bool,
    pub migration_type: &'static str,
    pub package_family_code: String,
    pub is_autobuy: bool,
    pub is_enterprise: bool,
    pub is_pdlp: bool,
    pub referral_code: &'static str,
    pub is_migration: bool,
    pub lang: &'static str,
}

impl FamilyRequest {
    pub fn new(family_code: &str) -> Self {
        Self {
            is_show_tagging_tab: true,
            is_dedicated_event: true,
            is_transaction_routine: false,
            migration_type: "NONE",
            package_family_code: family_code.to_string(),
            is_autobuy: false,
            is_enterprise: false,
            is_pdlp: true,
            referral_code: "",
            is_migration: false,
            lang: LANG,
        }
    }
}

/// `api/v8/xl-stores/families`: family list for a store category.
#[derive(Debug, Clone, Serialize)]
pub struct FamiliesRequest {
    pub migration_type: &'static str,
    pub is_enterprise: bool,
    pub is_shareable: bool,
    pub package_category_code: String,
    pub with_icon_url: bool,
    pub is_migration: bool,
    pub lang: &'static str,
}

impl FamiliesRequest {
    pub fn new(category_code: &str) -> Self {
        Self {
            migration_type: "",
            is_enterprise: false,
            is_shareable: false,
            package_category_code: category_code.to_string(),
            with_icon_url: true,
            is_migration: false,
            lang: LANG,
        }
    }
}

/// `api/v8/xl-stores/options/detail`: the purchase quote.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDetailRequest {
    pub is_transaction_routine: bool,
    pub migration_type: &'static str,
    pub package_family_code: &'static str,
    pub family_role_hub: &'static str,
    pub is_autobuy: bool,
    pub is_enterprise: bool,
    pub is_shareable: bool,
    pub is_migration: bool,
    pub lang: &'static str,
    pub package_option_code: String,
    pub is_upsell_pdp: bool,
    pub package_variant_code: &'static str,
}

impl PackageDetailRequest {
    pub fn new(package_option_code: &str) -> Self {
        Self {
            is_transaction_routine: false,
            migration_type: "",
            package_family_code: "",
            family_role_hub: "",
            is_autobuy: false,
            is_enterprise: false,
            is_shareable: false,
            is_migration: false,
            lang: LANG,
            package_option_code: package_option_code.to_string(),
            is_upsell_pdp: false,
            package_variant_code: "",
        }
    }
}

/// `payments/api/v8/payment-methods-option`
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodsRequest {
    pub payment_type: &'static str,
    pub is_enterprise: bool,
    pub payment_target: String,
    pub lang: &'static str,
    pub is_referral: bool,
    pub token_confirmation: String,
}

impl PaymentMethodsRequest {
    pub fn new(payment_target: &str, token_confirmation: &str) -> Self {
        Self {
            payment_type: "PURCHASE",
            is_enterprise: false,
            payment_target: payment_target.to_string(),
            lang: LANG,
            is_referral: false,
            token_confirmation: token_confirmation.to_string(),
        }
    }
}

/// Line item for a balance settlement.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceItem {
    pub item_code: String,
    pub item_price: i64,
    pub tax: i64,
}

/// `payments/api/v8/settlement-balance`
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSettlementRequest {
    pub total_discount: i64,
    pub is_enterprise: bool,
    pub payment_token: &'static str,
    pub token_payment: String,
    pub payment_method: &'static str,
    pub lang: &'static str,
    pub timestamp: i64,
    pub token_confirmation: String,
    pub access_token: String,
    pub total_amount: i64,
    pub items: Vec<BalanceItem>,
}

impl BalanceSettlementRequest {
    /// Total amount and the single item's price are always the same value;
    /// the backend rejects a mismatch.
    pub fn new(
        access_token: &str,
        token_confirmation: &str,
        token_payment: &str,
        timestamp: i64,
        item_code: &str,
        amount: i64,
    ) -> Self {
        Self {
            total_discount: 0,
            is_enterprise: false,
            payment_token: "",
            token_payment: token_payment.to_string(),
            payment_method: "BALANCE",
            lang: LANG,
            timestamp,
            token_confirmation: token_confirmation.to_string(),
            access_token: access_token.to_string(),
            total_amount: amount,
            items: vec![BalanceItem {
                item_code: item_code.to_string(),
                item_price: amount,
                tax: 0,
            }],
        }
    }
}

/// Family-plan block carried (empty) on multipayment settlements.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Akrab {
    pub akrab_members: Vec<Value>,
    pub akrab_parent_alias: String,
    pub members: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AutobuyThreshold {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Autobuy {
    pub is_using_autobuy: bool,
    pub activated_autobuy_code: String,
    pub autobuy_threshold_setting: AutobuyThreshold,
}

/// Pricing metadata block on e-wallet settlements.
#[derive(Debug, Clone, Serialize)]
pub struct AdditionalData {
    pub original_price: i64,
    pub is_spend_limit_temporary: bool,
    pub migration_type: &'static str,
    pub spend_limit_amount: i64,
    pub is_spend_limit: bool,
    pub tax: i64,
    pub benefit_type: &'static str,
    pub quota_bonus: i64,
    pub cashtag: &'static str,
    pub is_family_plan: bool,
    pub combo_details: Vec<Value>,
    pub is_switch_plan: bool,
    pub discount_recurring: i64,
    pub has_bonus: bool,
    pub discount_promo: i64,
}

impl AdditionalData {
    pub fn for_price(original_price: i64) -> Self {
        Self {
            original_price,
            is_spend_limit_temporary: false,
            migration_type: "",
            spend_limit_amount: 0,
            is_spend_limit: false,
            tax: 0,
            benefit_type: "",
            quota_bonus: 0,
            cashtag: "",
            is_family_plan: false,
            combo_details: Vec::new(),
            is_switch_plan: false,
            discount_recurring: 0,
            has_bonus: false,
            discount_promo: 0,
        }
    }
}

/// Line item for multipayment/QRIS/bounty settlements.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementItem {
    pub item_code: String,
    pub product_type: &'static str,
    pub item_price: i64,
    pub item_name: String,
    pub tax: i64,
}

impl SettlementItem {
    pub fn new(item_code: &str, item_price: i64, item_name: &str) -> Self {
        Self {
            item_code: item_code.to_string(),
            product_type: "",
            item_price,
            item_name: item_name.to_string(),
            tax: 0,
        }
    }
}

/// `payments/api/v8/settlement-multipayment/ewallet`
#[derive(Debug, Clone, Serialize)]
pub struct EwalletSettlementRequest {
    pub akrab: Akrab,
    pub can_trigger_rating: bool,
    pub total_discount: i64,
    pub coupon: &'static str,
    pub payment_for: &'static str,
    pub topup_number: &'static str,
    pub is_enterprise: bool,
    pub autobuy: Autobuy,
    pub cc_payment_type: &'static str,
    pub access_token: String,
    pub is_myxl_wallet: bool,
    pub wallet_number: String,
    pub additional_data: AdditionalData,
    pub total_amount: i64,
    pub total_fee: i64,
    pub is_use_point: bool,
    pub lang: &'static str,
    pub items: Vec<SettlementItem>,
    pub verification_token: String,
    pub payment_method: String,
    pub timestamp: i64,
}

impl EwalletSettlementRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        access_token: &str,
        token_payment: &str,
        timestamp: i64,
        item_code: &str,
        price: i64,
        wallet_number: &str,
        payment_method: &str,
        item_name: &str,
    ) -> Self {
        Self {
            akrab: Akrab::default(),
            can_trigger_rating: false,
            total_discount: 0,
            coupon: "",
            payment_for: "BUY_PACKAGE",
            topup_number: "",
            is_enterprise: false,
            autobuy: Autobuy::default(),
            cc_payment_type: "",
            access_token: access_token.to_string(),
            is_myxl_wallet: false,
            wallet_number: wallet_number.to_string(),
            additional_data: AdditionalData::for_price(price),
            total_amount: price,
            total_fee: 0,
            is_use_point: false,
            lang: LANG,
            items: vec![SettlementItem::new(item_code, price, item_name)],
            verification_token: token_payment.to_string(),
            payment_method: payment_method.to_string(),
            timestamp,
        }
    }
}

/// Reduced metadata block on QRIS settlements.
#[derive(Debug, Clone, Serialize)]
pub struct QrisAdditionalData {
    pub original_price: i64,
}

/// `payments/api/v8/settlement-multipayment/qris`
#[derive(Debug, Clone, Serialize)]
pub struct QrisSettlementRequest {
    pub akrab: Akrab,
    pub can_trigger_rating: bool,
    pub total_discount: i64,
    pub coupon: &'static str,
    pub payment_for: &'static str,
    pub topup_number: &'static str,
    pub is_enterprise: bool,
    pub autobuy: Autobuy,
    pub access_token: String,
    pub is_myxl_wallet: bool,
    pub additional_data: QrisAdditionalData,
    pub total_amount: i64,
    pub total_fee: i64,
    pub is_use_point: bool,
    pub lang: &'static str,
    pub items: Vec<SettlementItem>,
    pub verification_token: String,
    pub payment_method: &'static str,
    pub timestamp: i64,
}

impl QrisSettlementRequest {
    pub fn new(
        access_token: &str,
        token_payment: &str,
        timestamp: i64,
        item_code: &str,
        price: i64,
        item_name: &str,
    ) -> Self {
        Self {
            akrab: Akrab::default(),
            can_trigger_rating: false,
            total_discount: 0,
            coupon: "",
            payment_for: "BUY_PACKAGE",
            topup_number: "",
            is_enterprise: false,
            autobuy: Autobuy::default(),
            access_token: access_token.to_string(),
            is_myxl_wallet: false,
            additional_data: QrisAdditionalData {
                original_price: price,
            },
            total_amount: price,
            total_fee: 0,
            is_use_point: false,
            lang: LANG,
            items: vec![SettlementItem::new(item_code, price, item_name)],
            verification_token: token_payment.to_string(),
            payment_method: "QRIS",
            timestamp,
        }
    }
}

/// `api/v8/personalization/bounties-exchange`
///
/// Redemption, not purchase: `payment_for` is `REDEEM_VOUCHER` and a zero
/// amount is valid.
#[derive(Debug, Clone, Serialize)]
pub struct BountyRedeemRequest {
    pub akrab: Akrab,
    pub can_trigger_rating: bool,
    pub total_discount: i64,
    pub coupon: &'static str,
    pub payment_for: &'static str,
    pub topup_number: &'static str,
    pub is_enterprise: bool,
    pub autobuy: Autobuy,
    pub access_token: String,
    pub is_myxl_wallet: bool,
    pub additional_data: QrisAdditionalData,
    pub total_amount: i64,
    pub total_fee: i64,
    pub is_use_point: bool,
    pub lang: &'static str,
    pub items: Vec<SettlementItem>,
    pub verification_token: String,
    pub payment_method: &'static str,
    pub timestamp: i64,
}

impl BountyRedeemRequest {
    pub fn new(
        access_token: &str,
        token_payment: &str,
        timestamp: i64,
        item_code: &str,
        amount: i64,
        item_name: &str,
    ) -> Self {
        Self {
            akrab: Akrab::default(),
            can_trigger_rating: false,
            total_discount: 0,
            coupon: "",
            payment_for: "REDEEM_VOUCHER",
            topup_number: "",
            is_enterprise: false,
            autobuy: Autobuy::default(),
            access_token: access_token.to_string(),
            is_myxl_wallet: false,
            additional_data: QrisAdditionalData {
                original_price: amount,
            },
            total_amount: amount,
            total_fee: 0,
            is_use_point: false,
            lang: LANG,
            items: vec![SettlementItem::new(item_code, amount, item_name)],
            verification_token: token_payment.to_string(),
            payment_method: "BALANCE",
            timestamp,
        }
    }
}

/// `payments/api/v8/pending-detail`: fetch the renderable QR payload for a
/// pending QRIS transaction.
#[derive(Debug, Clone, Serialize)]
pub struct PendingDetailRequest {
    pub transaction_id: String,
    pub is_enterprise: bool,
    pub lang: &'static str,
    pub status: &'static str,
}

impl PendingDetailRequest {
    pub fn new(transaction_id: &str) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            is_enterprise: false,
            lang: LANG,
            status: "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_settlement_total_always_equals_item_price() {
        let payload =
            BalanceSettlementRequest::new("at", "tc", "tp", 1_700_000_000, "PKG1", 12_500);
        assert_eq!(payload.total_amount, 12_500);
        assert_eq!(payload.items[0].item_price, 12_500);
        assert_eq!(payload.items[0].item_code, "PKG1");
    }

    #[test]
    fn field_order_matches_the_wire_contract() {
        // The oracle signs the serialized bytes; declaration order is load
        // bearing.
        let json =
            serde_json::to_string(&PaymentMethodsRequest::new("PKG1", "tok-conf")).unwrap();
        let payment_type = json.find("payment_type").unwrap();
        let token_confirmation = json.find("token_confirmation").unwrap();
        assert!(payment_type < token_confirmation);
        assert!(json.starts_with("{\"payment_type\""));
    }

    #[test]
    fn autobuy_threshold_serializes_type_keyword() {
        let json = serde_json::to_string(&Autobuy::default()).unwrap();
        assert!(json.contains("\"type\":\"\""));
    }

    #[test]
    fn bounty_redeem_accepts_zero_amount() {
        let payload = BountyRedeemRequest::new("at", "tp", 1_700_000_000, "VOUCHER1", 0, "");
        assert_eq!(payload.payment_for, "REDEEM_VOUCHER");
        assert_eq!(payload.total_amount, 0);
        assert_eq!(payload.items[0].item_price, 0);
    }

    #[test]
    fn qris_additional_data_carries_only_the_original_price() {
        let payload = QrisSettlementRequest::new("at", "tp", 1, "PKG1", 5_000, "");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json["additional_data"],
            serde_json::json!({ "original_price": 5_000 })
        );
    }
}
