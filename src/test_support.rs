//! Shared fixtures for unit tests

use sea_orm::DatabaseConnection;

use crate::infrastructure::database::{init_database, run_migrations, DatabaseConfig};

/// Fresh in-memory SQLite with every migration applied
pub async fn test_db() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database");
    run_migrations(&db).await.expect("migrations");
    db
}
