//! Theater and room models.
//!
//! Seat dimensions live on the theater; every room of a theater shares its
//! `row_count x seats_per_row` grid.

use cinema_core::seat_grid::SeatGrid;
use cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `theaters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Theater {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub row_count: i32,
    pub seats_per_row: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Theater {
    pub fn grid(&self) -> SeatGrid {
        SeatGrid::new(self.row_count, self.seats_per_row)
    }

    pub fn capacity(&self) -> i32 {
        self.grid().capacity()
    }
}

/// DTO for creating a theater together with its rooms.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTheater {
    pub name: String,
    pub address: Option<String>,
    pub row_count: i32,
    pub seats_per_row: i32,
    /// Number of rooms to create, named `Room 1..N`.
    #[serde(default = "default_room_count")]
    pub room_count: i32,
}

fn default_room_count() -> i32 {
    1
}

/// A row from the `rooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Room {
    pub id: DbId,
    pub theater_id: DbId,
    pub name: String,
    pub room_number: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Theater with its rooms and derived capacity.
#[derive(Debug, Clone, Serialize)]
pub struct TheaterWithRooms {
    #[serde(flatten)]
    pub theater: Theater,
    pub capacity: i32,
    pub rooms: Vec<Room>,
}

/// Catalog view of a room: its grid and whether it can host screenings.
#[derive(Debug, Clone, FromRow)]
pub struct RoomDimensions {
    pub room_id: DbId,
    pub theater_id: DbId,
    /// Both the room and its theater are active.
    pub is_active: bool,
    pub row_count: i32,
    pub seats_per_row: i32,
}

impl RoomDimensions {
    pub fn grid(&self) -> SeatGrid {
        SeatGrid::new(self.row_count, self.seats_per_row)
    }
}
