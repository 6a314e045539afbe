//! Repository for the `screenings` table.
//!
//! Inserts and moves lock the target room row first, then check the
//! candidate interval against the room's active screenings, so two
//! overlapping screenings can never both commit.

use cinema_core::error::ReservationError;
use cinema_core::inventory::{self, RoomTimeline};
use cinema_core::overlap::Interval;
use cinema_core::types::{DbId, Money, Timestamp};
use sqlx::PgPool;

use crate::error::LedgerError;
use crate::models::screening::{
    CreateScreening, Screening, ScreeningDetail, ScreeningFilter, ScreeningListItem,
    TimelineEntry, UpdateScreening,
};
use crate::models::status::TicketStatus;
use crate::repositories::{MovieRepo, RoomRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, movie_id, room_id, schedule_id, show_time, price, is_active, created_at, updated_at";

/// Joined columns for [`ScreeningListItem`]. `$1` must bind the active
/// ticket status.
const LIST_COLUMNS: &str = "\
    s.id, s.movie_id, m.title AS movie_title, m.duration_minutes, \
    s.room_id, r.name AS room_name, t.id AS theater_id, t.name AS theater_name, \
    s.schedule_id, s.show_time, s.price, s.is_active, \
    t.row_count, t.seats_per_row, \
    (t.row_count * t.seats_per_row) AS total_seats, \
    (t.row_count * t.seats_per_row)::BIGINT - ( \
        SELECT COUNT(*) FROM tickets tk \
        WHERE tk.screening_id = s.id AND tk.status_id = $1 \
    ) AS available_seats";

const LIST_FROM: &str = "\
    FROM screenings s \
    JOIN movies m ON m.id = s.movie_id \
    JOIN rooms r ON r.id = s.room_id \
    JOIN theaters t ON t.id = r.theater_id";

/// Provides screening inventory operations.
pub struct ScreeningRepo;

impl ScreeningRepo {
    /// Create a single screening after checking the room's timeline.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScreening,
    ) -> Result<Screening, LedgerError> {
        let mut tx = pool.begin().await?;

        let duration = MovieRepo::active_duration(&mut tx, input.movie_id)
            .await?
            .ok_or(ReservationError::MovieOrRoomNotFound)?;
        let room = RoomRepo::lock_dimensions(&mut tx, input.room_id)
            .await?
            .ok_or(ReservationError::MovieOrRoomNotFound)?;
        if !room.is_active {
            return Err(ReservationError::RoomInactive(room.room_id).into());
        }

        let interval = Interval::from_duration(input.show_time, duration);
        let timeline = Self::load_timeline(&mut tx, input.room_id, &interval).await?;
        timeline.check_free(&interval, None)?;

        let screening =
            Self::insert(&mut tx, input.movie_id, input.room_id, None, input.show_time, input.price)
                .await?;
        tx.commit().await?;

        tracing::info!(
            screening_id = screening.id,
            room_id = screening.room_id,
            show_time = %screening.show_time,
            "Screening created"
        );
        Ok(screening)
    }

    /// Update a screening that holds no active tickets.
    ///
    /// The new slot is re-checked against every other active screening in
    /// the (possibly new) room.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateScreening,
    ) -> Result<Screening, LedgerError> {
        let mut tx = pool.begin().await?;

        let current = Self::lock(&mut tx, id)
            .await?
            .ok_or(ReservationError::ScreeningNotFound(id))?;
        let active = Self::count_active_tickets(&mut tx, id).await?;
        inventory::check_deactivation(id, active)?;

        let movie_id = input.movie_id.unwrap_or(current.movie_id);
        let room_id = input.room_id.unwrap_or(current.room_id);
        let show_time = input.show_time.unwrap_or(current.show_time);
        let price = input.price.unwrap_or(current.price);

        let duration = MovieRepo::active_duration(&mut tx, movie_id)
            .await?
            .ok_or(ReservationError::MovieOrRoomNotFound)?;
        let room = RoomRepo::lock_dimensions(&mut tx, room_id)
            .await?
            .ok_or(ReservationError::MovieOrRoomNotFound)?;
        if !room.is_active {
            return Err(ReservationError::RoomInactive(room_id).into());
        }

        if current.is_active {
            let interval = Interval::from_duration(show_time, duration);
            let timeline = Self::load_timeline(&mut tx, room_id, &interval).await?;
            timeline.check_free(&interval, Some(id))?;
        }

        let query = format!(
            "UPDATE screenings SET movie_id = $2, room_id = $3, show_time = $4, price = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let screening = sqlx::query_as::<_, Screening>(&query)
            .bind(id)
            .bind(movie_id)
            .bind(room_id)
            .bind(show_time)
            .bind(price)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(screening_id = id, room_id, "Screening updated");
        Ok(screening)
    }

    /// Soft-delete a screening that holds no active tickets.
    ///
    /// Deactivating an already inactive screening is a no-op.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Screening, LedgerError> {
        let mut tx = pool.begin().await?;

        let current = Self::lock(&mut tx, id)
            .await?
            .ok_or(ReservationError::ScreeningNotFound(id))?;
        if !current.is_active {
            return Ok(current);
        }
        let active = Self::count_active_tickets(&mut tx, id).await?;
        inventory::check_deactivation(id, active)?;

        let query = format!(
            "UPDATE screenings SET is_active = false WHERE id = $1 RETURNING {COLUMNS}"
        );
        let screening = sqlx::query_as::<_, Screening>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(screening_id = id, "Screening deactivated");
        Ok(screening)
    }

    /// Find a screening by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Screening>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM screenings WHERE id = $1");
        sqlx::query_as::<_, Screening>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Upcoming active screenings, soonest first.
    pub async fn list_upcoming(
        pool: &PgPool,
        filter: &ScreeningFilter,
        now: Timestamp,
    ) -> Result<Vec<ScreeningListItem>, sqlx::Error> {
        let query = format!(
            "SELECT {LIST_COLUMNS} {LIST_FROM} \
             WHERE s.is_active = true \
               AND s.show_time > $2 \
               AND ($3::BIGINT IS NULL OR s.movie_id = $3) \
               AND ($4::TIMESTAMPTZ IS NULL OR s.show_time >= $4) \
               AND ($5::TIMESTAMPTZ IS NULL OR s.show_time < $5) \
             ORDER BY s.show_time, s.id"
        );
        sqlx::query_as::<_, ScreeningListItem>(&query)
            .bind(TicketStatus::Active.id())
            .bind(now)
            .bind(filter.movie_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(pool)
            .await
    }

    /// Screening detail with the labels of seats held by active tickets.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScreeningDetail>, sqlx::Error> {
        let query = format!("SELECT {LIST_COLUMNS} {LIST_FROM} WHERE s.id = $2");
        let screening = sqlx::query_as::<_, ScreeningListItem>(&query)
            .bind(TicketStatus::Active.id())
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match screening {
            Some(screening) => {
                let occupied_seats = Self::occupied_seats(pool, id).await?;
                Ok(Some(ScreeningDetail {
                    screening,
                    occupied_seats,
                }))
            }
            None => Ok(None),
        }
    }

    /// Seat labels held by active tickets.
    pub async fn occupied_seats(pool: &PgPool, id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT seat_label FROM tickets \
             WHERE screening_id = $1 AND status_id = $2 \
             ORDER BY seat_label",
        )
        .bind(id)
        .bind(TicketStatus::Active.id())
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Lock a screening row for the rest of the transaction.
    pub(crate) async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Screening>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM screenings WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Screening>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn count_active_tickets(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE screening_id = $1 AND status_id = $2",
        )
        .bind(id)
        .bind(TicketStatus::Active.id())
        .fetch_one(&mut **tx)
        .await
    }

    /// Active screenings of a room whose running time intersects `window`.
    ///
    /// Callers must hold the room lock.
    pub(crate) async fn load_timeline(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        room_id: DbId,
        window: &Interval,
    ) -> Result<RoomTimeline, sqlx::Error> {
        let entries = sqlx::query_as::<_, TimelineEntry>(
            "SELECT s.id, s.show_time, m.duration_minutes \
             FROM screenings s \
             JOIN movies m ON m.id = s.movie_id \
             WHERE s.room_id = $1 \
               AND s.is_active = true \
               AND s.show_time < $3 \
               AND s.show_time + make_interval(mins => m.duration_minutes) > $2 \
             ORDER BY s.show_time",
        )
        .bind(room_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&mut **tx)
        .await?;
        Ok(RoomTimeline::new(entries.into_iter().map(Into::into).collect()))
    }

    pub(crate) async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        movie_id: DbId,
        room_id: DbId,
        schedule_id: Option<DbId>,
        show_time: Timestamp,
        price: Money,
    ) -> Result<Screening, sqlx::Error> {
        let query = format!(
            "INSERT INTO screenings (movie_id, room_id, schedule_id, show_time, price)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Screening>(&query)
            .bind(movie_id)
            .bind(room_id)
            .bind(schedule_id)
            .bind(show_time)
            .bind(price)
            .fetch_one(&mut **tx)
            .await
    }
}
