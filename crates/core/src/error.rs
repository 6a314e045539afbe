use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Reservation(#[from] ReservationError),
}

/// Rejections produced by the booking, inventory and scheduling rules.
///
/// Every variant is recoverable and user-facing. The request layer maps
/// each one to a status code; none of them indicate a server fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationError {
    #[error("Invalid seat label '{0}' for this room")]
    InvalidSeat(String),

    #[error("Seat {0} is already taken")]
    SeatTaken(String),

    #[error("You already have a ticket for this screening")]
    DuplicatePurchase,

    #[error("Screening {0} not found")]
    ScreeningNotFound(DbId),

    #[error("Screening {0} is not active")]
    ScreeningInactive(DbId),

    #[error("Screening {0} has already started")]
    ScreeningInPast(DbId),

    #[error("Overlaps screening {existing_id} in the same room")]
    OverlapConflict { existing_id: DbId },

    #[error("Ticket {0} not found")]
    TicketNotFound(DbId),

    #[error("Ticket {0} belongs to another user")]
    NotOwner(DbId),

    #[error("Ticket {0} is no longer active")]
    AlreadyFinalized(DbId),

    #[error("Tickets can only be cancelled until the day before the screening")]
    CancellationWindowClosed,

    #[error("Room {0} is not active")]
    RoomInactive(DbId),

    #[error("Movie or room not found")]
    MovieOrRoomNotFound,

    #[error("Screening {0} has active tickets")]
    HasActiveTickets(DbId),

    #[error("Concurrent update detected, please retry")]
    ConflictRetryable,
}
