//! Repositories for the `theaters` and `rooms` tables.

use cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::theater::{CreateTheater, Room, RoomDimensions, Theater, TheaterWithRooms};

// ===========================================================================
// TheaterRepo
// ===========================================================================

const THEATER_COLUMNS: &str =
    "id, name, address, row_count, seats_per_row, is_active, created_at, updated_at";

/// Provides CRUD operations for theaters.
pub struct TheaterRepo;

impl TheaterRepo {
    /// Insert a theater and its rooms (`Room 1..N`) in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTheater,
    ) -> Result<TheaterWithRooms, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO theaters (name, address, row_count, seats_per_row)
             VALUES ($1, $2, $3, $4)
             RETURNING {THEATER_COLUMNS}"
        );
        let theater = sqlx::query_as::<_, Theater>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.row_count)
            .bind(input.seats_per_row)
            .fetch_one(&mut *tx)
            .await?;

        let room_query = format!(
            "INSERT INTO rooms (theater_id, name, room_number)
             SELECT $1, 'Room ' || n, n FROM generate_series(1, $2) AS n
             RETURNING {ROOM_COLUMNS}"
        );
        let mut rooms = sqlx::query_as::<_, Room>(&room_query)
            .bind(theater.id)
            .bind(input.room_count)
            .fetch_all(&mut *tx)
            .await?;
        rooms.sort_by_key(|r| r.room_number);

        tx.commit().await?;
        Ok(TheaterWithRooms {
            capacity: theater.capacity(),
            theater,
            rooms,
        })
    }

    /// Find a theater by ID together with its rooms.
    pub async fn find_with_rooms(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TheaterWithRooms>, sqlx::Error> {
        let query = format!("SELECT {THEATER_COLUMNS} FROM theaters WHERE id = $1");
        let theater = sqlx::query_as::<_, Theater>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match theater {
            Some(theater) => {
                let rooms = RoomRepo::list_for_theater(pool, theater.id).await?;
                Ok(Some(TheaterWithRooms {
                    capacity: theater.capacity(),
                    theater,
                    rooms,
                }))
            }
            None => Ok(None),
        }
    }

    /// List active theaters by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Theater>, sqlx::Error> {
        let query = format!(
            "SELECT {THEATER_COLUMNS} FROM theaters WHERE is_active = true ORDER BY name, id"
        );
        sqlx::query_as::<_, Theater>(&query).fetch_all(pool).await
    }
}

// ===========================================================================
// RoomRepo
// ===========================================================================

const ROOM_COLUMNS: &str = "id, theater_id, name, room_number, is_active, created_at, updated_at";

const DIMENSION_COLUMNS: &str = "r.id AS room_id, r.theater_id, \
    (r.is_active AND t.is_active) AS is_active, t.row_count, t.seats_per_row";

/// Room lookups. Rooms are created with their theater.
pub struct RoomRepo;

impl RoomRepo {
    /// Rooms of a theater ordered by room number.
    pub async fn list_for_theater(
        pool: &PgPool,
        theater_id: DbId,
    ) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE theater_id = $1 ORDER BY room_number"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(theater_id)
            .fetch_all(pool)
            .await
    }

    /// Dimensions of a room read inside an open transaction.
    pub(crate) async fn dimensions_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        room_id: DbId,
    ) -> Result<Option<RoomDimensions>, sqlx::Error> {
        let query = format!(
            "SELECT {DIMENSION_COLUMNS} FROM rooms r \
             JOIN theaters t ON t.id = r.theater_id \
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, RoomDimensions>(&query)
            .bind(room_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock a room row for the rest of the transaction and return its
    /// dimensions. Every screening insert or move into the room holds this
    /// lock while it checks for overlaps.
    pub(crate) async fn lock_dimensions(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        room_id: DbId,
    ) -> Result<Option<RoomDimensions>, sqlx::Error> {
        let query = format!(
            "SELECT {DIMENSION_COLUMNS} FROM rooms r \
             JOIN theaters t ON t.id = r.theater_id \
             WHERE r.id = $1 \
             FOR UPDATE OF r"
        );
        sqlx::query_as::<_, RoomDimensions>(&query)
            .bind(room_id)
            .fetch_optional(&mut **tx)
            .await
    }
}
