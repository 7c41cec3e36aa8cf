//! HTTP interface: router, middleware and per-resource modules

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

#[cfg(test)]
mod tests;

pub use router::{create_router, ApiDoc, AppState};
