//! Promo code models.

use cinema_core::promo::{PromoRejection, PromoTerms};
use cinema_core::types::{DbId, Money, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `promo_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromoCode {
    pub id: DbId,
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: Decimal,
    pub max_discount_amount: Option<Money>,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub min_purchase_amount: Option<Money>,
    pub valid_from: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PromoCode {
    pub fn terms(&self) -> PromoTerms {
        PromoTerms {
            discount_percent: self.discount_percent,
            max_discount_amount: self.max_discount_amount,
            max_uses: self.max_uses,
            current_uses: self.current_uses,
            min_purchase_amount: self.min_purchase_amount,
            valid_from: self.valid_from,
            expires_at: self.expires_at,
            is_active: self.is_active,
        }
    }
}

/// DTO for creating a promo code.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePromoCode {
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: Decimal,
    pub max_discount_amount: Option<Money>,
    pub max_uses: Option<i32>,
    pub min_purchase_amount: Option<Money>,
    pub valid_from: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// DTO for updating a promo code. Only non-`None` fields are applied; the
/// code itself and its usage counter cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePromoCode {
    pub description: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub max_discount_amount: Option<Money>,
    pub max_uses: Option<i32>,
    pub min_purchase_amount: Option<Money>,
    pub valid_from: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub is_active: Option<bool>,
}

/// Result of checking a code without redeeming it.
#[derive(Debug, Clone, Serialize)]
pub struct PromoValidation {
    pub code: String,
    pub valid: bool,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Money>,
    pub final_amount: Option<Money>,
    pub rejection: Option<PromoRejection>,
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoDeletion {
    Deleted,
    /// The code has been redeemed at least once and is kept for history.
    InUse,
    NotFound,
}
