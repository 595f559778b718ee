//! Exam Activity Cache - clustered live exam monitoring store
//!
//! Keeps every student action of a running exam in a cluster-shared in-memory
//! cache and discards each exam's cache once all students must have finished.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{ActivityError, Result};
pub use tasks::{ScheduleService, ScheduleSettings};
