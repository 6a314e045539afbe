//! Screening models.

use cinema_core::inventory::ScheduledSlot;
use cinema_core::overlap::Interval;
use cinema_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `screenings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Screening {
    pub id: DbId,
    pub movie_id: DbId,
    pub room_id: DbId,
    pub schedule_id: Option<DbId>,
    pub show_time: Timestamp,
    pub price: Money,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a single screening.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScreening {
    pub movie_id: DbId,
    pub room_id: DbId,
    pub show_time: Timestamp,
    pub price: Money,
}

/// DTO for updating a screening. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateScreening {
    pub movie_id: Option<DbId>,
    pub room_id: Option<DbId>,
    pub show_time: Option<Timestamp>,
    pub price: Option<Money>,
}

/// Filters for the upcoming-screenings listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreeningFilter {
    pub movie_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// A screening joined with its movie, room and seat availability.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScreeningListItem {
    pub id: DbId,
    pub movie_id: DbId,
    pub movie_title: String,
    pub duration_minutes: i32,
    pub room_id: DbId,
    pub room_name: String,
    pub theater_id: DbId,
    pub theater_name: String,
    pub schedule_id: Option<DbId>,
    pub show_time: Timestamp,
    pub price: Money,
    pub is_active: bool,
    pub row_count: i32,
    pub seats_per_row: i32,
    pub total_seats: i32,
    pub available_seats: i64,
}

/// Screening detail with the seat map's occupied labels.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningDetail {
    #[serde(flatten)]
    pub screening: ScreeningListItem,
    pub occupied_seats: Vec<String>,
}

/// An active screening as seen by the room's no-overlap check.
#[derive(Debug, Clone, FromRow)]
pub struct TimelineEntry {
    pub id: DbId,
    pub show_time: Timestamp,
    pub duration_minutes: i32,
}

impl From<TimelineEntry> for ScheduledSlot {
    fn from(entry: TimelineEntry) -> Self {
        ScheduledSlot {
            screening_id: entry.id,
            interval: Interval::from_duration(entry.show_time, entry.duration_minutes),
        }
    }
}
