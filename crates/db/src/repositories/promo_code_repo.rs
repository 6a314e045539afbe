//! Repository for the `promo_codes` table.

use cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::promo_code::{CreatePromoCode, PromoCode, PromoDeletion, UpdatePromoCode};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, description, discount_percent, max_discount_amount, max_uses, \
    current_uses, min_purchase_amount, valid_from, expires_at, is_active, created_at, updated_at";

/// Provides CRUD operations for promo codes.
pub struct PromoCodeRepo;

impl PromoCodeRepo {
    /// Insert a new promo code. `input.code` must already be normalized.
    pub async fn create(pool: &PgPool, input: &CreatePromoCode) -> Result<PromoCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO promo_codes \
                (code, description, discount_percent, max_discount_amount, max_uses, \
                 min_purchase_amount, valid_from, expires_at, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(&input.code)
            .bind(&input.description)
            .bind(input.discount_percent)
            .bind(input.max_discount_amount)
            .bind(input.max_uses)
            .bind(input.min_purchase_amount)
            .bind(input.valid_from)
            .bind(input.expires_at)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a promo code by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PromoCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes WHERE id = $1");
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a promo code by its normalized code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<PromoCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes WHERE code = $1");
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List all promo codes, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<PromoCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, PromoCode>(&query).fetch_all(pool).await
    }

    /// Update a promo code. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePromoCode,
    ) -> Result<Option<PromoCode>, sqlx::Error> {
        let query = format!(
            "UPDATE promo_codes SET \
                description = COALESCE($2, description), \
                discount_percent = COALESCE($3, discount_percent), \
                max_discount_amount = COALESCE($4, max_discount_amount), \
                max_uses = COALESCE($5, max_uses), \
                min_purchase_amount = COALESCE($6, min_purchase_amount), \
                valid_from = COALESCE($7, valid_from), \
                expires_at = COALESCE($8, expires_at), \
                is_active = COALESCE($9, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(input.discount_percent)
            .bind(input.max_discount_amount)
            .bind(input.max_uses)
            .bind(input.min_purchase_amount)
            .bind(input.valid_from)
            .bind(input.expires_at)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Flip `is_active`. Returns `None` if no row with the given `id` exists.
    pub async fn toggle(pool: &PgPool, id: DbId) -> Result<Option<PromoCode>, sqlx::Error> {
        let query = format!(
            "UPDATE promo_codes SET is_active = NOT is_active WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a promo code that has never been redeemed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<PromoDeletion, sqlx::Error> {
        let result = sqlx::query("DELETE FROM promo_codes WHERE id = $1 AND current_uses = 0")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() > 0 {
            return Ok(PromoDeletion::Deleted);
        }
        match Self::find_by_id(pool, id).await? {
            Some(_) => Ok(PromoDeletion::InUse),
            None => Ok(PromoDeletion::NotFound),
        }
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Lock a promo code row so its usage counter can be checked and
    /// incremented atomically with a ticket insert.
    pub(crate) async fn lock_by_code(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        code: &str,
    ) -> Result<Option<PromoCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes WHERE code = $1 FOR UPDATE");
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn record_use(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE promo_codes SET current_uses = current_uses + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
