//! Handlers for recurring screening schedules.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cinema_core::error::CoreError;
use cinema_core::types::DbId;
use cinema_db::models::schedule::{
    CreateSchedule, ExpansionResult, ScheduleDeletion, ScheduleSummary,
};
use cinema_db::repositories::ScheduleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/screenings/schedule
///
/// Expands the definition into individual screenings. Slots that collide
/// with existing screenings are reported in `conflicts` and skipped; the
/// rest are created.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateSchedule>,
) -> AppResult<(StatusCode, Json<DataResponse<ExpansionResult>>)> {
    let definition = input.to_definition()?;
    let result =
        ScheduleRepo::expand(&state.pool, &definition, Some(admin.user_id), Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /api/v1/screenings/schedules
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ScheduleSummary>>>> {
    let schedules = ScheduleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: schedules }))
}

/// DELETE /api/v1/screenings/schedule/{id}
///
/// Deactivates the schedule's future screenings that hold no active
/// tickets. Ticketed screenings stay active and are counted as skipped.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ScheduleDeletion>>> {
    let deletion = ScheduleRepo::delete(&state.pool, id, Utc::now())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ScreeningSchedule",
            id,
        }))?;
    Ok(Json(DataResponse { data: deletion }))
}
