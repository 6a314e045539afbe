//! Ticket ledger models.

use cinema_core::promo::PromoRejection;
use cinema_core::ticket_ledger::TicketSnapshot;
use cinema_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub screening_id: DbId,
    pub user_id: DbId,
    pub seat_label: String,
    pub status_id: StatusId,
    pub base_price: Money,
    /// Set only when a promo code was redeemed.
    pub discount_amount: Option<Money>,
    pub price_paid: Money,
    pub promo_code_id: Option<DbId>,
    pub purchased_at: Timestamp,
    pub checked_in_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub refund_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ticket {
    pub fn snapshot(&self) -> TicketSnapshot {
        TicketSnapshot {
            id: self.id,
            user_id: self.user_id,
            status_id: self.status_id,
            checked_in_at: self.checked_in_at,
        }
    }
}

/// Ticket joined with what it was bought for.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub movie_title: String,
    pub show_time: Timestamp,
    pub room_name: String,
    pub theater_name: String,
    pub promo_code: Option<String>,
}

/// DTO for buying a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseTicket {
    pub screening_id: DbId,
    pub seat_label: String,
    pub promo_code: Option<String>,
}

/// DTO for cancelling a ticket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelTicket {
    pub reason: Option<String>,
}

/// DTO for bulk ticket operations.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkTicketIds {
    pub ticket_ids: Vec<DbId>,
    pub reason: Option<String>,
}

/// Filters for ticket listings. `status` is a status name (`active`, `used`,
/// `cancelled`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<String>,
    pub screening_id: Option<DbId>,
}

/// Result of a successful booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub ticket: Ticket,
    /// Why the supplied promo code was not applied, if it was not.
    pub promo_rejection: Option<PromoRejection>,
}
