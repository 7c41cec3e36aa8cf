//! # Attendance Service
//!
//! REST backend for tracking student attendance across class sessions.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Entities, value types and repository traits
//! - **application**: Use cases spanning several repositories (identity, roster import)
//! - **infrastructure**: SeaORM persistence, crypto and `.xlsx` I/O
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Errors, pagination, input coercion and shutdown plumbing

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::{create_router, ApiDoc, AppState};
