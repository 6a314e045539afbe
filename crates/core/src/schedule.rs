//! Recurring schedule expansion.
//!
//! A [`ScheduleDefinition`] (date range x weekdays x times of day) is turned
//! into an [`ExpansionPlan`]: the concrete screenings to insert and the
//! slots that collide with the room's existing timeline. Slots planned
//! earlier in the same expansion count as occupied for later ones.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::CoreError;
use crate::inventory::{self, RoomTimeline, ScheduledSlot};
use crate::overlap::Interval;
use crate::types::{DbId, Money, Timestamp};

/// Longest date range a single definition may cover.
pub const MAX_SCHEDULE_DAYS: i64 = 366;

/// Time-of-day formats accepted for show times.
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// A recurrence rule for one movie in one room.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDefinition {
    pub movie_id: DbId,
    pub room_id: DbId,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub show_times: Vec<NaiveTime>,
    /// 0 = Sunday .. 6 = Saturday.
    pub days_of_week: Vec<i16>,
    pub price: Money,
}

/// A (date, time) pair that could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRef {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// `YYYY-MM-DD HH:MM`
    pub label: String,
}

impl SlotRef {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time,
            label: format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M")),
        }
    }
}

/// A screening the expansion will insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedScreening {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub interval: Interval,
}

impl PlannedScreening {
    pub fn show_time(&self) -> Timestamp {
        self.interval.start
    }
}

/// Result of planning an expansion against a room timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionPlan {
    pub to_create: Vec<PlannedScreening>,
    pub conflicts: Vec<SlotRef>,
    /// Slots dropped because they start at or before `now`.
    pub past_slots: usize,
}

/// Parse `"HH:MM"` (or `"HH:MM:SS"`) show times.
pub fn parse_show_times<S: AsRef<str>>(raw: &[S]) -> Result<Vec<NaiveTime>, CoreError> {
    raw.iter()
        .map(|s| {
            let s = s.as_ref().trim();
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
                .ok_or_else(|| CoreError::Validation(format!("Invalid show time: '{s}'")))
        })
        .collect()
}

/// Weekday index with Sunday as 0.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

impl ScheduleDefinition {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.end_date < self.start_date {
            return Err(CoreError::Validation(
                "End date must not be before start date".into(),
            ));
        }
        let span = (self.end_date - self.start_date).num_days() + 1;
        if span > MAX_SCHEDULE_DAYS {
            return Err(CoreError::Validation(format!(
                "Schedule may span at most {MAX_SCHEDULE_DAYS} days"
            )));
        }
        if self.show_times.is_empty() {
            return Err(CoreError::Validation(
                "At least one show time is required".into(),
            ));
        }
        if self.days_of_week.is_empty() {
            return Err(CoreError::Validation(
                "At least one day of week is required".into(),
            ));
        }
        if let Some(day) = self.days_of_week.iter().find(|d| !(0..=6).contains(*d)) {
            return Err(CoreError::Validation(format!(
                "Day of week must be 0-6 (Sunday = 0), got {day}"
            )));
        }
        inventory::validate_price(self.price)
    }

    /// Show times de-duplicated and in ascending order.
    pub fn normalized_times(&self) -> Vec<NaiveTime> {
        let mut times = self.show_times.clone();
        times.sort_unstable();
        times.dedup();
        times
    }

    /// Weekdays de-duplicated and in ascending order.
    pub fn normalized_days(&self) -> Vec<i16> {
        let mut days = self.days_of_week.clone();
        days.sort_unstable();
        days.dedup();
        days
    }

    /// Every (date, time) pair the definition describes, in visiting order.
    pub fn candidate_slots(&self) -> Vec<(NaiveDate, NaiveTime)> {
        let times = self.normalized_times();
        self.start_date
            .iter_days()
            .take_while(|d| *d <= self.end_date)
            .filter(|d| self.days_of_week.contains(&weekday_index(*d)))
            .flat_map(|d| times.iter().map(move |t| (d, *t)))
            .collect()
    }

    /// The span any candidate screening can occupy, used to bound the
    /// timeline snapshot. `None` when the definition yields no slots.
    pub fn window(&self, duration_minutes: i32) -> Option<Interval> {
        let slots = self.candidate_slots();
        let (first_date, first_time) = slots.first()?;
        let (last_date, last_time) = slots.last()?;
        let start = first_date.and_time(*first_time).and_utc();
        let last = Interval::from_duration(last_date.and_time(*last_time).and_utc(), duration_minutes);
        Some(Interval::new(start, last.end))
    }
}

/// Decide which slots of `definition` become screenings.
///
/// Past slots are skipped silently. Each remaining slot is checked against
/// `timeline` plus the slots accepted before it; a collision is recorded as
/// a conflict and the walk continues.
pub fn plan_expansion(
    definition: &ScheduleDefinition,
    duration_minutes: i32,
    now: Timestamp,
    timeline: &RoomTimeline,
) -> ExpansionPlan {
    let mut working = timeline.clone();
    let mut plan = ExpansionPlan::default();

    for (date, time) in definition.candidate_slots() {
        let start = date.and_time(time).and_utc();
        if start <= now {
            plan.past_slots += 1;
            continue;
        }
        let interval = Interval::from_duration(start, duration_minutes);
        // Planned slots have no id yet; negative ids keep them distinct.
        let placeholder = -(plan.to_create.len() as DbId) - 1;
        match working.try_insert(ScheduledSlot {
            screening_id: placeholder,
            interval,
        }) {
            Ok(()) => plan.to_create.push(PlannedScreening {
                date,
                time,
                interval,
            }),
            Err(_) => plan.conflicts.push(SlotRef::new(date, time)),
        }
    }
    plan
}
