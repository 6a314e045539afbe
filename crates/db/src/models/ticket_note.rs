//! Staff notes attached to tickets.

use cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `ticket_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketNote {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub note: String,
    pub created_at: Timestamp,
}

/// DTO for adding a note.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketNote {
    pub note: String,
}
