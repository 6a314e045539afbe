//! Recurring screening schedule models.

use chrono::{NaiveDate, NaiveTime};
use cinema_core::error::CoreError;
use cinema_core::schedule::{self, ScheduleDefinition, SlotRef};
use cinema_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `screening_schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScreeningSchedule {
    pub id: DbId,
    pub movie_id: DbId,
    pub room_id: DbId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub show_times: Vec<NaiveTime>,
    pub days_of_week: Vec<i16>,
    pub price: Money,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Schedule listing row with its movie, room and screening counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduleSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub schedule: ScreeningSchedule,
    pub movie_title: String,
    pub room_name: String,
    pub screening_count: i64,
    pub active_screening_count: i64,
}

/// DTO for creating a schedule. Show times are `"HH:MM"` strings and
/// weekdays count from Sunday = 0.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchedule {
    pub movie_id: DbId,
    pub room_id: DbId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub show_times: Vec<String>,
    pub days_of_week: Vec<i16>,
    pub price: Money,
}

impl CreateSchedule {
    /// Parse and validate into a definition the planner can expand.
    pub fn to_definition(&self) -> Result<ScheduleDefinition, CoreError> {
        let definition = ScheduleDefinition {
            movie_id: self.movie_id,
            room_id: self.room_id,
            start_date: self.start_date,
            end_date: self.end_date,
            show_times: schedule::parse_show_times(&self.show_times)?,
            days_of_week: self.days_of_week.clone(),
            price: self.price,
        };
        definition.validate()?;
        Ok(definition)
    }
}

/// Outcome of expanding a schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ExpansionResult {
    pub schedule_id: DbId,
    pub screenings_created: i32,
    pub conflicts: Vec<SlotRef>,
    pub message: String,
}

/// Outcome of deleting a schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDeletion {
    pub schedule_id: DbId,
    /// Future screenings without active tickets that were deactivated.
    pub deactivated: i32,
    /// Future screenings left active because they hold tickets.
    pub skipped: i32,
}
