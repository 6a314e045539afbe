pub mod health;
pub mod movie;
pub mod promo_code;
pub mod screening;
pub mod theater;
pub mod ticket;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /movies                          catalog (list, create, get)
/// /theaters                        theaters with their rooms
/// /screenings                      inventory, detail, schedules
/// /tickets                         purchase, cancel, check-in, admin views
/// /promo-codes                     promo administration and validation
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/movies", movie::router())
        .nest("/theaters", theater::router())
        .nest("/screenings", screening::router())
        .nest("/tickets", ticket::router())
        .nest("/promo-codes", promo_code::router())
}
