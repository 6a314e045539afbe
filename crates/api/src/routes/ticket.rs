use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ticket;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// POST   /purchase           -> purchase
/// GET    /mine               -> mine (?status)
/// GET    /all                -> list_all (admin, ?status&screening_id&limit&offset)
/// POST   /bulk-cancel        -> bulk_cancel (admin)
/// POST   /bulk-mark-used     -> bulk_mark_used (admin)
/// GET    /{id}               -> get_by_id (owner or admin)
/// POST   /{id}/cancel        -> cancel
/// POST   /{id}/check-in      -> check_in (admin)
/// GET    /{id}/notes         -> list_notes (admin)
/// POST   /{id}/notes         -> add_note (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/purchase", post(ticket::purchase))
        .route("/mine", get(ticket::mine))
        .route("/all", get(ticket::list_all))
        .route("/bulk-cancel", post(ticket::bulk_cancel))
        .route("/bulk-mark-used", post(ticket::bulk_mark_used))
        .route("/{id}", get(ticket::get_by_id))
        .route("/{id}/cancel", post(ticket::cancel))
        .route("/{id}/check-in", post(ticket::check_in))
        .route("/{id}/notes", get(ticket::list_notes).post(ticket::add_note))
}
