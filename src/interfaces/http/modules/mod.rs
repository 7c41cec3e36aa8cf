pub mod admins;
pub mod attendance;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod reports;
pub mod request_id;
pub mod sessions;
pub mod students;
