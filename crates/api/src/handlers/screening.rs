//! Handlers for the `/screenings` resource.
//!
//! Creation, updates and deactivation go through [`ScreeningRepo`], which
//! serialises them per room so overlapping screenings can never both
//! commit.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cinema_core::error::CoreError;
use cinema_core::inventory;
use cinema_core::types::DbId;
use cinema_db::models::screening::{
    CreateScreening, Screening, ScreeningDetail, ScreeningFilter, ScreeningListItem,
    UpdateScreening,
};
use cinema_db::repositories::ScreeningRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/screenings
///
/// Upcoming active screenings with their remaining seat counts.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ScreeningFilter>,
) -> AppResult<Json<DataResponse<Vec<ScreeningListItem>>>> {
    let screenings = ScreeningRepo::list_upcoming(&state.pool, &filter, Utc::now()).await?;
    Ok(Json(DataResponse { data: screenings }))
}

/// GET /api/v1/screenings/{id}
///
/// Includes the labels of every seat held by an active ticket.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ScreeningDetail>>> {
    let detail = ScreeningRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Screening",
            id,
        }))?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/screenings
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateScreening>,
) -> AppResult<(StatusCode, Json<DataResponse<Screening>>)> {
    inventory::validate_price(input.price)?;
    inventory::check_show_time(input.show_time, Utc::now())?;

    let screening = ScreeningRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: screening })))
}

/// PUT /api/v1/screenings/{id}
///
/// Rejected once the screening holds active tickets.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateScreening>,
) -> AppResult<Json<DataResponse<Screening>>> {
    if let Some(price) = input.price {
        inventory::validate_price(price)?;
    }
    if let Some(show_time) = input.show_time {
        inventory::check_show_time(show_time, Utc::now())?;
    }

    let screening = ScreeningRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: screening }))
}

/// DELETE /api/v1/screenings/{id}
///
/// Soft-deletes the screening. Rejected while active tickets exist.
pub async fn deactivate(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Screening>>> {
    let screening = ScreeningRepo::deactivate(&state.pool, id).await?;
    Ok(Json(DataResponse { data: screening }))
}
