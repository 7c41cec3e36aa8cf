//! Students: CRUD, attendance history, spreadsheet export and import

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
