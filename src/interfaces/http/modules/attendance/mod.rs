//! Attendance: session rosters, seeding and marking

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
