//! Route definitions for screenings and recurring schedules.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{schedule, screening};
use crate::state::AppState;

/// Routes mounted at `/screenings`.
///
/// ```text
/// GET    /                  -> list (upcoming, ?movie_id&from&to)
/// POST   /                  -> create (admin)
/// GET    /{id}              -> get_by_id (with occupied seats)
/// PUT    /{id}              -> update (admin)
/// DELETE /{id}              -> deactivate (admin)
/// POST   /schedule          -> schedule::create (admin, expands into screenings)
/// GET    /schedules         -> schedule::list (admin)
/// DELETE /schedule/{id}     -> schedule::delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(screening::list).post(screening::create))
        .route(
            "/{id}",
            get(screening::get_by_id)
                .put(screening::update)
                .delete(screening::deactivate),
        )
        .route("/schedule", post(schedule::create))
        .route("/schedules", get(schedule::list))
        .route("/schedule/{id}", delete(schedule::delete))
}
