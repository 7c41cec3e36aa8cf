//! Student aggregate
//!
//! Contains the Student record, list filters, and repository interface.

pub mod model;
pub mod repository;

pub use model::{
    Student, StudentFilter, StudentInput, StudentSessionEntry, StudentSort, StudentWithCounts,
    UpsertOutcome,
};
pub use repository::StudentRepository;
