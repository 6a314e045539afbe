//! Handlers for the `/theaters` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cinema_core::error::CoreError;
use cinema_core::seat_grid;
use cinema_core::types::DbId;
use cinema_db::models::theater::{CreateTheater, Theater, TheaterWithRooms};
use cinema_db::repositories::TheaterRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on rooms created with a single theater.
const MAX_ROOMS_PER_THEATER: i32 = 50;

/// GET /api/v1/theaters
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Theater>>>> {
    let theaters = TheaterRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: theaters }))
}

/// GET /api/v1/theaters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TheaterWithRooms>>> {
    let theater = TheaterRepo::find_with_rooms(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Theater",
            id,
        }))?;
    Ok(Json(DataResponse { data: theater }))
}

/// POST /api/v1/theaters
///
/// Creates the theater and `room_count` rooms sharing its seat grid.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTheater>,
) -> AppResult<(StatusCode, Json<DataResponse<TheaterWithRooms>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".into()));
    }
    seat_grid::validate_dimensions(input.row_count, input.seats_per_row)?;
    if !(1..=MAX_ROOMS_PER_THEATER).contains(&input.room_count) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Room count must be between 1 and {MAX_ROOMS_PER_THEATER}"
        ))));
    }

    let theater = TheaterRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: theater })))
}
