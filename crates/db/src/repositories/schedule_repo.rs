//! Repository for the `screening_schedules` table and schedule expansion.

use cinema_core::error::ReservationError;
use cinema_core::inventory::{self, RoomTimeline};
use cinema_core::schedule::{self, ScheduleDefinition};
use cinema_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::error::LedgerError;
use crate::models::schedule::{
    ExpansionResult, ScheduleDeletion, ScheduleSummary, ScreeningSchedule,
};
use crate::models::status::TicketStatus;
use crate::repositories::{MovieRepo, RoomRepo, ScreeningRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, movie_id, room_id, start_date, end_date, show_times, days_of_week, \
    price, is_active, created_by, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "\
    sc.id, sc.movie_id, sc.room_id, sc.start_date, sc.end_date, sc.show_times, \
    sc.days_of_week, sc.price, sc.is_active, sc.created_by, sc.created_at, sc.updated_at, \
    m.title AS movie_title, r.name AS room_name, \
    (SELECT COUNT(*) FROM screenings s WHERE s.schedule_id = sc.id) AS screening_count, \
    (SELECT COUNT(*) FROM screenings s \
        WHERE s.schedule_id = sc.id AND s.is_active = true) AS active_screening_count";

/// Provides schedule expansion and management.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Persist `definition` and create its screenings.
    ///
    /// Runs in one transaction holding the room lock. Slots that start at or
    /// before `now` are skipped; slots colliding with an active screening
    /// (or with a slot created earlier in this expansion) are reported as
    /// conflicts and skipped.
    pub async fn expand(
        pool: &PgPool,
        definition: &ScheduleDefinition,
        created_by: Option<DbId>,
        now: Timestamp,
    ) -> Result<ExpansionResult, LedgerError> {
        let mut tx = pool.begin().await?;

        let duration = MovieRepo::active_duration(&mut tx, definition.movie_id)
            .await?
            .ok_or(ReservationError::MovieOrRoomNotFound)?;
        let room = RoomRepo::lock_dimensions(&mut tx, definition.room_id)
            .await?
            .ok_or(ReservationError::MovieOrRoomNotFound)?;
        if !room.is_active {
            return Err(ReservationError::RoomInactive(room.room_id).into());
        }

        let insert_query = format!(
            "INSERT INTO screening_schedules \
                (movie_id, room_id, start_date, end_date, show_times, days_of_week, price, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let saved = sqlx::query_as::<_, ScreeningSchedule>(&insert_query)
            .bind(definition.movie_id)
            .bind(definition.room_id)
            .bind(definition.start_date)
            .bind(definition.end_date)
            .bind(definition.normalized_times())
            .bind(definition.normalized_days())
            .bind(definition.price)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        let timeline = match definition.window(duration) {
            Some(window) => {
                ScreeningRepo::load_timeline(&mut tx, definition.room_id, &window).await?
            }
            None => RoomTimeline::default(),
        };
        let plan = schedule::plan_expansion(definition, duration, now, &timeline);

        for slot in &plan.to_create {
            ScreeningRepo::insert(
                &mut tx,
                definition.movie_id,
                definition.room_id,
                Some(saved.id),
                slot.show_time(),
                definition.price,
            )
            .await?;
        }
        tx.commit().await?;

        let created = plan.to_create.len() as i32;
        tracing::info!(
            schedule_id = saved.id,
            room_id = definition.room_id,
            created,
            conflicts = plan.conflicts.len(),
            past_slots = plan.past_slots,
            "Schedule expanded"
        );

        Ok(ExpansionResult {
            schedule_id: saved.id,
            screenings_created: created,
            message: format!(
                "Created {created} screenings with {} conflicts",
                plan.conflicts.len()
            ),
            conflicts: plan.conflicts,
        })
    }

    /// Find a schedule by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScreeningSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM screening_schedules WHERE id = $1");
        sqlx::query_as::<_, ScreeningSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active schedules, newest first, with their screening counts.
    pub async fn list(pool: &PgPool) -> Result<Vec<ScheduleSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} \
             FROM screening_schedules sc \
             JOIN movies m ON m.id = sc.movie_id \
             JOIN rooms r ON r.id = sc.room_id \
             WHERE sc.is_active = true \
             ORDER BY sc.created_at DESC, sc.id DESC"
        );
        sqlx::query_as::<_, ScheduleSummary>(&query)
            .fetch_all(pool)
            .await
    }

    /// Retire a schedule.
    ///
    /// Future screenings without active tickets are deactivated; ticketed
    /// ones stay active and are counted as skipped. Returns `None` if the
    /// schedule does not exist.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<ScheduleDeletion>, LedgerError> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM screening_schedules WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let future = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM screenings \
             WHERE schedule_id = $1 AND is_active = true AND show_time > $2 \
             ORDER BY show_time \
             FOR UPDATE",
        )
        .bind(id)
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        let mut to_deactivate = Vec::with_capacity(future.len());
        let mut skipped = 0;
        for screening_id in future {
            let active = ScreeningRepo::count_active_tickets(&mut tx, screening_id).await?;
            match inventory::check_deactivation(screening_id, active) {
                Ok(()) => to_deactivate.push(screening_id),
                Err(_) => skipped += 1,
            }
        }

        sqlx::query("UPDATE screenings SET is_active = false WHERE id = ANY($1)")
            .bind(&to_deactivate)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE screening_schedules SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let deactivated = to_deactivate.len() as i32;
        tracing::info!(schedule_id = id, deactivated, skipped, "Schedule deleted");
        Ok(Some(ScheduleDeletion {
            schedule_id: id,
            deactivated,
            skipped,
        }))
    }

    /// Active ticket count across a schedule's screenings.
    pub async fn count_active_tickets(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets t \
             JOIN screenings s ON s.id = t.screening_id \
             WHERE s.schedule_id = $1 AND t.status_id = $2",
        )
        .bind(id)
        .bind(TicketStatus::Active.id())
        .fetch_one(pool)
        .await
    }
}
