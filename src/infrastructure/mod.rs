//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod spreadsheet;

pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
