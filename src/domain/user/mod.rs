//! User aggregate
//!
//! Staff accounts that can sign in. Only admins may change data.

pub mod model;
pub mod repository;

pub use model::{NewUser, User, UserRole};
pub use repository::UserRepository;
