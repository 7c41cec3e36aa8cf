//! Session aggregate

pub mod model;
pub mod repository;

pub use model::{Session, SessionFilter, SessionInput, SessionSort, SessionWithCounts};
pub use repository::SessionRepository;
