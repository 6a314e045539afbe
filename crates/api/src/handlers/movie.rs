//! Handlers for the `/movies` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cinema_core::error::CoreError;
use cinema_core::types::DbId;
use cinema_db::models::movie::{CreateMovie, Movie};
use cinema_db::repositories::MovieRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/movies
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Movie>>>> {
    let movies = MovieRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: movies }))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Movie>>> {
    let movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Movie",
            id,
        }))?;
    Ok(Json(DataResponse { data: movie }))
}

/// POST /api/v1/movies
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateMovie>,
) -> AppResult<(StatusCode, Json<DataResponse<Movie>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".into()));
    }
    if input.duration_minutes < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "Duration must be at least 1 minute".into(),
        )));
    }

    let movie = MovieRepo::create(&state.pool, &input).await?;
    tracing::info!(movie_id = movie.id, user_id = admin.user_id, "Movie created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: movie })))
}
