//! Seat addressing for a room's fixed grid.
//!
//! Rows are letters `A..Z` (A = row 0), seats are numbered from 1. A label is
//! the row letter followed by the seat number, e.g. `"A1"` or `"B12"`. The
//! same label is persisted on tickets and shown to users.

use serde::Serialize;

use crate::error::CoreError;

/// Highest row count addressable with a single letter.
pub const MAX_ROWS: i32 = 26;

/// A room's seat dimensions. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatGrid {
    pub rows: i32,
    pub seats_per_row: i32,
}

/// A decoded seat position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatPosition {
    /// Zero-based row index (`A` = 0).
    pub row_index: i32,
    /// One-based seat number within the row.
    pub seat_number: i32,
}

impl SeatGrid {
    pub fn new(rows: i32, seats_per_row: i32) -> Self {
        Self {
            rows,
            seats_per_row,
        }
    }

    /// Total number of seats in the room.
    pub fn capacity(&self) -> i32 {
        self.rows * self.seats_per_row
    }

    /// Decode `label` against this grid, returning `None` when it is
    /// malformed or out of bounds.
    pub fn decode(&self, label: &str) -> Option<SeatPosition> {
        if label.len() < 2 {
            return None;
        }
        let mut chars = label.chars();
        let row_char = chars.next()?;
        if !row_char.is_ascii_alphabetic() {
            return None;
        }
        let row_index = (row_char.to_ascii_uppercase() as u8 - b'A') as i32;
        if row_index >= self.rows {
            return None;
        }

        let digits = chars.as_str();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let seat_number: i32 = digits.parse().ok()?;
        if seat_number < 1 || seat_number > self.seats_per_row {
            return None;
        }

        Some(SeatPosition {
            row_index,
            seat_number,
        })
    }

    /// Whether `label` addresses a seat in this grid.
    pub fn validate(&self, label: &str) -> bool {
        self.decode(label).is_some()
    }
}

/// Free-function form of [`SeatGrid::validate`].
pub fn validate(label: &str, rows: i32, seats_per_row: i32) -> bool {
    SeatGrid::new(rows, seats_per_row).validate(label)
}

/// Maximum seats in one row.
pub const MAX_SEATS_PER_ROW: i32 = 100;

/// Validate theater dimensions: 1-26 rows (one letter each) and
/// 1-[`MAX_SEATS_PER_ROW`] seats per row.
pub fn validate_dimensions(rows: i32, seats_per_row: i32) -> Result<(), CoreError> {
    if !(1..=MAX_ROWS).contains(&rows) {
        return Err(CoreError::Validation(format!(
            "Rows must be between 1 and {MAX_ROWS}"
        )));
    }
    if !(1..=MAX_SEATS_PER_ROW).contains(&seats_per_row) {
        return Err(CoreError::Validation(format!(
            "Seats per row must be between 1 and {MAX_SEATS_PER_ROW}"
        )));
    }
    Ok(())
}

/// Canonical label for a position: upper-case row letter, seat number
/// without leading zeros.
pub fn format_label(row_index: i32, seat_number: i32) -> String {
    let row = (b'A' + row_index as u8) as char;
    format!("{row}{seat_number}")
}

/// Canonical form of a label the caller has already validated (`"a7"` -> `"A7"`).
///
/// Tickets store the canonical form so that `"a7"` and `"A7"` cannot be
/// booked as two different seats.
pub fn normalize(grid: &SeatGrid, label: &str) -> Option<String> {
    grid.decode(label)
        .map(|pos| format_label(pos.row_index, pos.seat_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SeatGrid {
        SeatGrid::new(10, 15)
    }

    #[test]
    fn first_seat_is_valid() {
        assert!(grid().validate("A1"));
    }

    #[test]
    fn last_seat_is_valid() {
        assert!(grid().validate("J15"));
    }

    #[test]
    fn row_past_grid_is_invalid() {
        assert!(!grid().validate("K1"));
    }

    #[test]
    fn seat_past_row_end_is_invalid() {
        assert!(!grid().validate("A16"));
    }

    #[test]
    fn seat_zero_is_invalid() {
        assert!(!grid().validate("A0"));
    }

    #[test]
    fn digit_first_is_invalid() {
        assert!(!grid().validate("1A"));
    }

    #[test]
    fn empty_is_invalid() {
        assert!(!grid().validate(""));
    }

    #[test]
    fn lowercase_row_is_accepted() {
        assert!(grid().validate("c4"));
        assert_eq!(normalize(&grid(), "c4").as_deref(), Some("C4"));
    }

    #[test]
    fn signs_and_spaces_are_rejected() {
        assert!(!grid().validate("A+1"));
        assert!(!grid().validate("A-1"));
        assert!(!grid().validate("A 1"));
    }

    #[test]
    fn leading_zero_normalizes() {
        assert_eq!(normalize(&grid(), "B07").as_deref(), Some("B7"));
    }

    #[test]
    fn non_ascii_row_is_rejected() {
        assert!(!grid().validate("Ä1"));
    }

    #[test]
    fn capacity_is_rows_times_seats() {
        assert_eq!(grid().capacity(), 150);
    }

    #[test]
    fn dimensions_bounded_by_alphabet() {
        assert!(validate_dimensions(26, 20).is_ok());
        assert!(validate_dimensions(27, 20).is_err());
        assert!(validate_dimensions(0, 20).is_err());
        assert!(validate_dimensions(5, 0).is_err());
    }

    #[test]
    fn free_function_matches_method() {
        assert!(validate("J15", 10, 15));
        assert!(!validate("K1", 10, 15));
    }
}
