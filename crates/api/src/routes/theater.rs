use axum::routing::get;
use axum::Router;

use crate::handlers::theater;
use crate::state::AppState;

/// Routes mounted at `/theaters`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create (admin, creates rooms too)
/// GET    /{id}    -> get_by_id (with rooms)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(theater::list).post(theater::create))
        .route("/{id}", get(theater::get_by_id))
}
