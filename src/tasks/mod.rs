//! Background Tasks Module
//!
//! Scheduling of per-exam activity cache cleanup.
//!
//! # Components
//! - Cluster task scheduler: named one-shot timers shared by all nodes
//! - Task registry: the timers this node owns
//! - Schedule service: action ingestion plus the cleanup lifecycle

mod registry;
mod schedule_service;
mod scheduler;

pub use registry::ScheduledTaskRegistry;
pub use schedule_service::{cleanup_task_name, compute_fire_time, ScheduleService, ScheduleSettings};
pub use scheduler::{ClusterTaskScheduler, ScheduledTask};
