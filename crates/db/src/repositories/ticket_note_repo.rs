//! Repository for the `ticket_notes` table.

use cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket_note::TicketNote;

const COLUMNS: &str = "id, ticket_id, author_id, note, created_at";

/// Staff notes on tickets. Notes are append-only.
pub struct TicketNoteRepo;

impl TicketNoteRepo {
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        note: &str,
    ) -> Result<TicketNote, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_notes (ticket_id, author_id, note) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TicketNote>(&query)
            .bind(ticket_id)
            .bind(author_id)
            .bind(note)
            .fetch_one(pool)
            .await
    }

    /// Notes of a ticket, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<TicketNote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_notes WHERE ticket_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, TicketNote>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
