//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod movie_repo;
pub mod promo_code_repo;
pub mod schedule_repo;
pub mod screening_repo;
pub mod theater_repo;
pub mod ticket_note_repo;
pub mod ticket_repo;

pub use movie_repo::MovieRepo;
pub use promo_code_repo::PromoCodeRepo;
pub use schedule_repo::ScheduleRepo;
pub use screening_repo::ScreeningRepo;
pub use theater_repo::{RoomRepo, TheaterRepo};
pub use ticket_note_repo::TicketNoteRepo;
pub use ticket_repo::TicketRepo;
