pub mod movie;
pub mod promo_code;
pub mod schedule;
pub mod screening;
pub mod theater;
pub mod ticket;
