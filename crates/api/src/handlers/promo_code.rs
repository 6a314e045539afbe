//! Handlers for the `/promo-codes` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cinema_core::error::CoreError;
use cinema_core::promo;
use cinema_core::types::{DbId, Money, Timestamp};
use cinema_db::models::promo_code::{
    CreatePromoCode, PromoCode, PromoDeletion, PromoValidation, UpdatePromoCode,
};
use cinema_db::repositories::PromoCodeRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /promo-codes/validate/{code}`.
#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    pub purchase_amount: Option<Money>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "PromoCode",
        id,
    })
}

fn check_validity_window(
    valid_from: Option<Timestamp>,
    expires_at: Option<Timestamp>,
) -> AppResult<()> {
    if let (Some(from), Some(until)) = (valid_from, expires_at) {
        if from >= until {
            return Err(AppError::Core(CoreError::Validation(
                "valid_from must be before expires_at".into(),
            )));
        }
    }
    Ok(())
}

/// GET /api/v1/promo-codes
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PromoCode>>>> {
    let codes = PromoCodeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: codes }))
}

/// GET /api/v1/promo-codes/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PromoCode>>> {
    let code = PromoCodeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: code }))
}

/// POST /api/v1/promo-codes
///
/// Codes are stored upper-case. A duplicate code is a 409 via the
/// `uq_promo_codes_code` constraint.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreatePromoCode>,
) -> AppResult<(StatusCode, Json<DataResponse<PromoCode>>)> {
    promo::validate_definition(
        &input.code,
        input.discount_percent,
        input.max_discount_amount,
        input.max_uses,
    )?;
    check_validity_window(input.valid_from, input.expires_at)?;
    input.code = promo::normalize_code(&input.code);

    let code = PromoCodeRepo::create(&state.pool, &input).await?;
    tracing::info!(
        promo_code_id = code.id,
        code = %code.code,
        user_id = admin.user_id,
        "Promo code created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: code })))
}

/// PUT /api/v1/promo-codes/{id}
///
/// The code string itself is immutable.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePromoCode>,
) -> AppResult<Json<DataResponse<PromoCode>>> {
    let existing = PromoCodeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    promo::validate_definition(
        &existing.code,
        input.discount_percent.unwrap_or(existing.discount_percent),
        input.max_discount_amount.or(existing.max_discount_amount),
        input.max_uses.or(existing.max_uses),
    )?;
    check_validity_window(
        input.valid_from.or(existing.valid_from),
        input.expires_at.or(existing.expires_at),
    )?;

    let code = PromoCodeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: code }))
}

/// POST /api/v1/promo-codes/{id}/toggle
pub async fn toggle(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PromoCode>>> {
    let code = PromoCodeRepo::toggle(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(promo_code_id = id, is_active = code.is_active, "Promo code toggled");
    Ok(Json(DataResponse { data: code }))
}

/// DELETE /api/v1/promo-codes/{id}
///
/// Only codes that were never redeemed can be deleted; deactivate the rest.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    match PromoCodeRepo::delete(&state.pool, id).await? {
        PromoDeletion::Deleted => Ok(StatusCode::NO_CONTENT),
        PromoDeletion::InUse => Err(AppError::Core(CoreError::Conflict(
            "Promo code has been used; deactivate it instead".into(),
        ))),
        PromoDeletion::NotFound => Err(not_found(id)),
    }
}

/// GET /api/v1/promo-codes/validate/{code}
///
/// Reports whether `code` could be redeemed right now. With a
/// `purchase_amount` the minimum purchase is checked and the discount is
/// computed; without one only the code's own state is checked.
pub async fn validate(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<ValidateParams>,
) -> AppResult<Json<DataResponse<PromoValidation>>> {
    if params.purchase_amount.is_some_and(|amount| amount < Money::ZERO) {
        return Err(AppError::Core(CoreError::Validation(
            "purchase_amount must not be negative".to_string(),
        )));
    }

    let code = promo::normalize_code(&code);
    let Some(found) = PromoCodeRepo::find_by_code(&state.pool, &code).await? else {
        return Ok(Json(DataResponse {
            data: PromoValidation {
                code,
                valid: false,
                discount_percent: None,
                discount_amount: None,
                final_amount: None,
                rejection: Some(promo::PromoRejection::PromoInvalid),
            },
        }));
    };

    let terms = found.terms();
    let now = Utc::now();
    let outcome = match params.purchase_amount {
        Some(amount) => terms
            .evaluate(amount, now)
            .map(|discount| (Some(discount), Some(amount - discount))),
        None => terms.check_redeemable(now).map(|()| (None, None)),
    };

    let validation = match outcome {
        Ok((discount_amount, final_amount)) => PromoValidation {
            code: found.code,
            valid: true,
            discount_percent: Some(found.discount_percent),
            discount_amount,
            final_amount,
            rejection: None,
        },
        Err(rejection) => PromoValidation {
            code: found.code,
            valid: false,
            discount_percent: Some(found.discount_percent),
            discount_amount: None,
            final_amount: None,
            rejection: Some(rejection),
        },
    };
    Ok(Json(DataResponse { data: validation }))
}
