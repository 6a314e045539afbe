//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod movie;
pub mod promo_code;
pub mod schedule;
pub mod screening;
pub mod status;
pub mod theater;
pub mod ticket;
pub mod ticket_note;

