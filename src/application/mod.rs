//! Application layer: use cases spanning several repositories

pub mod identity;
pub mod roster;

pub use identity::{AuthResult, IdentityService};
pub use roster::{import_students, ImportReport};
