use axum::routing::{get, post};
use axum::Router;

use crate::handlers::promo_code;
use crate::state::AppState;

/// Routes mounted at `/promo-codes`.
///
/// ```text
/// GET    /                  -> list (admin)
/// POST   /                  -> create (admin)
/// GET    /{id}              -> get_by_id (admin)
/// PUT    /{id}              -> update (admin)
/// DELETE /{id}              -> delete (admin, unused codes only)
/// POST   /{id}/toggle       -> toggle (admin)
/// GET    /validate/{code}   -> validate (?purchase_amount)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(promo_code::list).post(promo_code::create))
        .route(
            "/{id}",
            get(promo_code::get_by_id)
                .put(promo_code::update)
                .delete(promo_code::delete),
        )
        .route("/{id}/toggle", post(promo_code::toggle))
        .route("/validate/{code}", get(promo_code::validate))
}
