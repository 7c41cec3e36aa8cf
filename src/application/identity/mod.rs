//! Sign-in and admin account management

pub mod service;

pub use service::{AuthResult, IdentityService};
