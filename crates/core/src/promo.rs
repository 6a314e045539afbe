//! Promo code evaluation.
//!
//! A promo code that fails evaluation at purchase time does not fail the
//! purchase: the ticket is sold at full price and the rejection is only
//! logged. The `validate` endpoint reports the rejection to the caller.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Money, Timestamp};

/// Maximum length of a promo code string.
pub const MAX_CODE_LEN: usize = 32;

/// The redemption terms of a promo code at the moment of purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoTerms {
    pub discount_percent: Decimal,
    pub max_discount_amount: Option<Money>,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub min_purchase_amount: Option<Money>,
    pub valid_from: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub is_active: bool,
}

/// Why a promo code cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PromoRejection {
    #[error("Invalid promo code")]
    PromoInvalid,

    #[error("This promo code is not valid at this time")]
    PromoExpired,

    #[error("This promo code has reached its usage limit")]
    PromoExhausted,

    #[error("Minimum purchase amount is {minimum}")]
    PromoMinimumNotMet { minimum: Money },
}

impl PromoTerms {
    /// Check every redemption condition, returning the discount to apply to
    /// `purchase_amount`.
    pub fn evaluate(
        &self,
        purchase_amount: Money,
        now: Timestamp,
    ) -> Result<Money, PromoRejection> {
        self.check_redeemable(now)?;
        if let Some(minimum) = self.min_purchase_amount {
            if purchase_amount < minimum {
                return Err(PromoRejection::PromoMinimumNotMet { minimum });
            }
        }
        Ok(self.discount_for(purchase_amount))
    }

    /// Every condition except the minimum purchase amount.
    pub fn check_redeemable(&self, now: Timestamp) -> Result<(), PromoRejection> {
        if !self.is_active {
            return Err(PromoRejection::PromoInvalid);
        }
        if self.valid_from.is_some_and(|from| from > now) {
            return Err(PromoRejection::PromoExpired);
        }
        if self.expires_at.is_some_and(|until| until < now) {
            return Err(PromoRejection::PromoExpired);
        }
        if self.max_uses.is_some_and(|max| self.current_uses >= max) {
            return Err(PromoRejection::PromoExhausted);
        }
        Ok(())
    }

    /// `min(amount * pct / 100, cap)`, rounded to cents.
    pub fn discount_for(&self, purchase_amount: Money) -> Money {
        let raw = purchase_amount * self.discount_percent / Decimal::ONE_HUNDRED;
        let capped = match self.max_discount_amount {
            Some(cap) => raw.min(cap),
            None => raw,
        };
        capped.min(purchase_amount).round_dp(2)
    }
}

/// Codes are stored and matched upper-case.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate admin input for a promo code definition.
pub fn validate_definition(
    code: &str,
    discount_percent: Decimal,
    max_discount_amount: Option<Money>,
    max_uses: Option<i32>,
) -> Result<(), CoreError> {
    let code = code.trim();
    if code.is_empty() || code.len() > MAX_CODE_LEN {
        return Err(CoreError::Validation(format!(
            "Promo code must be 1-{MAX_CODE_LEN} characters"
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(CoreError::Validation(
            "Promo code may only contain letters, digits, '-' and '_'".into(),
        ));
    }
    if discount_percent <= Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
        return Err(CoreError::Validation(
            "Discount percent must be between 0 and 100".into(),
        ));
    }
    if max_discount_amount.is_some_and(|cap| cap < Decimal::ZERO) {
        return Err(CoreError::Validation(
            "Max discount amount must not be negative".into(),
        ));
    }
    if max_uses.is_some_and(|max| max < 1) {
        return Err(CoreError::Validation("Max uses must be at least 1".into()));
    }
    Ok(())
}
