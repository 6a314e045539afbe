//! Ticket lifecycle rules: booking, cancellation and check-in.
//!
//! A [`TicketLedger`] is the set of active tickets of one screening, loaded
//! while the persistence layer holds that screening's row lock. The checks
//! below decide whether a mutation is allowed; the caller commits it in the
//! same transaction.

use serde::Serialize;

use crate::error::ReservationError;
use crate::seat_grid::{self, SeatGrid};
use crate::types::{DbId, Money, Timestamp};

/// Maximum number of ticket ids accepted by a single bulk request.
pub const MAX_BULK_SIZE: usize = 500;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Ticket status IDs matching `ticket_statuses` seed data (1-based SMALLSERIAL).
///
/// Duplicated from the `db` crate's `TicketStatus` enum because `core` must
/// have zero internal deps.
pub mod state_machine {
    pub const ACTIVE: i16 = 1;
    pub const USED: i16 = 2;
    pub const CANCELLED: i16 = 3;

    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Used and Cancelled are terminal.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            ACTIVE => &[USED, CANCELLED],
            USED | CANCELLED => &[],
            _ => &[],
        }
    }

    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Parse a status name (case-insensitive) into its ID.
    pub fn status_id(name: &str) -> Option<i16> {
        match name.to_ascii_lowercase().as_str() {
            "active" => Some(ACTIVE),
            "used" => Some(USED),
            "cancelled" => Some(CANCELLED),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// The screening a booking targets, with its room's seat grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningSnapshot {
    pub id: DbId,
    pub is_active: bool,
    pub show_time: Timestamp,
    pub price: Money,
    pub grid: SeatGrid,
}

/// An active ticket holding a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldSeat {
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub seat_label: String,
}

/// The fields of a ticket that cancellation and check-in depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
    pub id: DbId,
    pub user_id: DbId,
    pub status_id: i16,
    pub checked_in_at: Option<Timestamp>,
}

/// Who is asking to cancel a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    /// A customer; may only cancel their own tickets.
    Customer(DbId),
    /// Staff acting on any ticket. Status and window rules still apply.
    Staff(DbId),
}

impl Requester {
    pub fn user_id(self) -> DbId {
        match self {
            Requester::Customer(id) | Requester::Staff(id) => id,
        }
    }
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// Active tickets of one screening.
#[derive(Debug, Clone)]
pub struct TicketLedger {
    screening: ScreeningSnapshot,
    held: Vec<HeldSeat>,
}

impl TicketLedger {
    pub fn new(screening: ScreeningSnapshot, held: Vec<HeldSeat>) -> Self {
        Self { screening, held }
    }

    /// Validate a purchase and return the canonical seat label to store.
    ///
    /// Checks, in order: screening active, screening not started, seat
    /// inside the grid, seat free, user has no active ticket for the
    /// screening.
    pub fn check_booking(
        &self,
        seat_label: &str,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<String, ReservationError> {
        let screening = &self.screening;
        if !screening.is_active {
            return Err(ReservationError::ScreeningInactive(screening.id));
        }
        if screening.show_time <= now {
            return Err(ReservationError::ScreeningInPast(screening.id));
        }

        let seat = seat_grid::normalize(&screening.grid, seat_label)
            .ok_or_else(|| ReservationError::InvalidSeat(seat_label.to_string()))?;

        if self.held.iter().any(|h| h.seat_label == seat) {
            return Err(ReservationError::SeatTaken(seat));
        }
        if self.held.iter().any(|h| h.user_id == user_id) {
            return Err(ReservationError::DuplicatePurchase);
        }
        Ok(seat)
    }
}

/// Amount charged once `discount` has been applied to `base_price`.
pub fn payable(base_price: Money, discount: Option<Money>) -> Money {
    match discount {
        Some(d) => base_price - d,
        None => base_price,
    }
}

// ---------------------------------------------------------------------------
// Cancellation and check-in
// ---------------------------------------------------------------------------

/// Validate a cancellation request.
///
/// Tickets can be cancelled until the end of the UTC calendar day before
/// the screening.
pub fn check_cancellation(
    ticket: &TicketSnapshot,
    requester: Requester,
    show_time: Timestamp,
    now: Timestamp,
) -> Result<(), ReservationError> {
    if let Requester::Customer(user_id) = requester {
        if ticket.user_id != user_id {
            return Err(ReservationError::NotOwner(ticket.id));
        }
    }
    if !state_machine::can_transition(ticket.status_id, state_machine::CANCELLED) {
        return Err(ReservationError::AlreadyFinalized(ticket.id));
    }
    if show_time.date_naive() <= now.date_naive() {
        return Err(ReservationError::CancellationWindowClosed);
    }
    Ok(())
}

/// Validate a check-in.
pub fn check_check_in(ticket: &TicketSnapshot) -> Result<(), ReservationError> {
    if ticket.checked_in_at.is_some()
        || !state_machine::can_transition(ticket.status_id, state_machine::USED)
    {
        return Err(ReservationError::AlreadyFinalized(ticket.id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Bulk operations
// ---------------------------------------------------------------------------

/// A ticket skipped by a bulk operation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkSkip {
    pub ticket_id: DbId,
    pub reason: String,
}

/// Outcome of applying a single-ticket operation to many ids.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub succeeded: i32,
    pub skipped: i32,
    pub skips: Vec<BulkSkip>,
}

impl BulkReport {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self, ticket_id: DbId, reason: impl Into<String>) {
        self.skipped += 1;
        self.skips.push(BulkSkip {
            ticket_id,
            reason: reason.into(),
        });
    }
}

/// Bulk requests must name between 1 and [`MAX_BULK_SIZE`] tickets.
pub fn validate_bulk_size(count: usize) -> Result<(), crate::error::CoreError> {
    if count == 0 || count > MAX_BULK_SIZE {
        return Err(crate::error::CoreError::Validation(format!(
            "Bulk requests must contain 1-{MAX_BULK_SIZE} ticket ids, got {count}"
        )));
    }
    Ok(())
}
