//! Per-room screening inventory and the no-overlap rule.
//!
//! A [`RoomTimeline`] is a snapshot of the active screenings of one room,
//! loaded by the persistence layer while it holds the room's row lock. Every
//! insert into a room must go through [`RoomTimeline::try_insert`] (or the
//! schedule planner, which applies the same check), so no two active
//! screenings in a room ever overlap.

use crate::error::{CoreError, ReservationError};
use crate::overlap::Interval;
use crate::types::{DbId, Money, Timestamp};

/// An active screening occupying part of a room's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledSlot {
    pub screening_id: DbId,
    pub interval: Interval,
}

/// The active screenings of a single room.
#[derive(Debug, Clone, Default)]
pub struct RoomTimeline {
    slots: Vec<ScheduledSlot>,
}

impl RoomTimeline {
    pub fn new(slots: Vec<ScheduledSlot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[ScheduledSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// First active screening whose interval overlaps `candidate`.
    ///
    /// `exclude` skips one screening id, which lets an update re-check a
    /// screening against everything except its own current slot.
    pub fn find_conflict(
        &self,
        candidate: &Interval,
        exclude: Option<DbId>,
    ) -> Option<&ScheduledSlot> {
        self.slots
            .iter()
            .filter(|slot| Some(slot.screening_id) != exclude)
            .find(|slot| slot.interval.overlaps(candidate))
    }

    /// Check `candidate` against the timeline, returning the conflicting
    /// screening as an [`ReservationError::OverlapConflict`].
    pub fn check_free(
        &self,
        candidate: &Interval,
        exclude: Option<DbId>,
    ) -> Result<(), ReservationError> {
        match self.find_conflict(candidate, exclude) {
            Some(existing) => Err(ReservationError::OverlapConflict {
                existing_id: existing.screening_id,
            }),
            None => Ok(()),
        }
    }

    /// Add a screening if it does not overlap any other. On conflict the
    /// timeline is left unchanged.
    pub fn try_insert(&mut self, slot: ScheduledSlot) -> Result<(), ReservationError> {
        self.check_free(&slot.interval, Some(slot.screening_id))?;
        self.slots.retain(|s| s.screening_id != slot.screening_id);
        self.slots.push(slot);
        Ok(())
    }

    /// Whether no pair of slots overlaps.
    pub fn is_consistent(&self) -> bool {
        self.slots.iter().enumerate().all(|(i, a)| {
            self.slots[i + 1..]
                .iter()
                .all(|b| !a.interval.overlaps(&b.interval))
        })
    }
}

/// A screening may only be deactivated once it holds no active tickets.
pub fn check_deactivation(
    screening_id: DbId,
    active_ticket_count: i64,
) -> Result<(), ReservationError> {
    if active_ticket_count > 0 {
        return Err(ReservationError::HasActiveTickets(screening_id));
    }
    Ok(())
}

/// Ticket prices may be zero (free screenings) but never negative.
pub fn validate_price(price: Money) -> Result<(), CoreError> {
    if price < Money::ZERO {
        return Err(CoreError::Validation("Price must not be negative".into()));
    }
    Ok(())
}

/// New screenings must start in the future.
pub fn check_show_time(show_time: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if show_time <= now {
        return Err(CoreError::Validation(
            "Show time must be in the future".into(),
        ));
    }
    Ok(())
}
