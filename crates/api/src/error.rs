use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cinema_core::error::{CoreError, ReservationError};
use cinema_db::LedgerError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`ReservationError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `cinema_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A booking, inventory or scheduling rule rejected the request.
    #[error(transparent)]
    Reservation(#[from] ReservationError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(rejection) => AppError::Reservation(rejection),
            LedgerError::Database(db) => AppError::Database(db),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Reservation(rejection) => classify_reservation(rejection),
            },

            AppError::Reservation(rejection) => classify_reservation(rejection),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a reservation rejection to an HTTP status and error code.
///
/// - Malformed seat labels are 400.
/// - Races and occupied resources are 409; `CONFLICT_RETRYABLE` tells the
///   client the same request may succeed if resent.
/// - Missing entities are 404, foreign tickets are 403.
/// - Requests that are well-formed but arrive in the wrong state are 422.
fn classify_reservation(rejection: &ReservationError) -> (StatusCode, &'static str, String) {
    let (status, code) = match rejection {
        ReservationError::InvalidSeat(_) => (StatusCode::BAD_REQUEST, "INVALID_SEAT"),
        ReservationError::SeatTaken(_) => (StatusCode::CONFLICT, "SEAT_TAKEN"),
        ReservationError::DuplicatePurchase => (StatusCode::CONFLICT, "DUPLICATE_PURCHASE"),
        ReservationError::OverlapConflict { .. } => (StatusCode::CONFLICT, "OVERLAP_CONFLICT"),
        ReservationError::HasActiveTickets(_) => (StatusCode::CONFLICT, "HAS_ACTIVE_TICKETS"),
        ReservationError::ConflictRetryable => (StatusCode::CONFLICT, "CONFLICT_RETRYABLE"),
        ReservationError::ScreeningNotFound(_) => {
            (StatusCode::NOT_FOUND, "SCREENING_NOT_FOUND")
        }
        ReservationError::TicketNotFound(_) => (StatusCode::NOT_FOUND, "TICKET_NOT_FOUND"),
        ReservationError::MovieOrRoomNotFound => {
            (StatusCode::NOT_FOUND, "MOVIE_OR_ROOM_NOT_FOUND")
        }
        ReservationError::NotOwner(_) => (StatusCode::FORBIDDEN, "NOT_OWNER"),
        ReservationError::ScreeningInactive(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "SCREENING_INACTIVE")
        }
        ReservationError::ScreeningInPast(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "SCREENING_IN_PAST")
        }
        ReservationError::AlreadyFinalized(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "ALREADY_FINALIZED")
        }
        ReservationError::CancellationWindowClosed => {
            (StatusCode::UNPROCESSABLE_ENTITY, "CANCELLATION_WINDOW_CLOSED")
        }
        ReservationError::RoomInactive(_) => (StatusCode::UNPROCESSABLE_ENTITY, "ROOM_INACTIVE"),
    };
    (status, code, rejection.to_string())
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn rejections_map_to_distinct_statuses() {
        assert_eq!(
            status_of(ReservationError::InvalidSeat("Z9".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ReservationError::SeatTaken("A1".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ReservationError::ScreeningNotFound(1).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ReservationError::NotOwner(1).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ReservationError::CancellationWindowClosed.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn wrapped_rejection_keeps_its_status() {
        let err = AppError::Core(CoreError::Reservation(ReservationError::ConflictRetryable));
        assert_eq!(status_of(err), StatusCode::CONFLICT);

        let err: AppError = LedgerError::Rejected(ReservationError::RoomInactive(3)).into();
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn retryable_conflict_has_its_own_code() {
        let (_, code, _) = classify_reservation(&ReservationError::ConflictRetryable);
        assert_eq!(code, "CONFLICT_RETRYABLE");
    }
}
