//! Scheduled Task Registry
//!
//! Per-node bookkeeping of the cleanup task each exam has on this node.
//! Created with the schedule service and disposed when it stops.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::models::ExamId;
use crate::tasks::ScheduledTask;

/// Local map of exam id to scheduled cleanup task.
#[derive(Debug, Default)]
pub struct ScheduledTaskRegistry {
    tasks: Mutex<HashMap<ExamId, ScheduledTask>>,
}

impl ScheduledTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `task` for `exam_id`, returning the handle it replaced.
    pub fn insert(&self, exam_id: ExamId, task: ScheduledTask) -> Option<ScheduledTask> {
        self.tasks.lock().insert(exam_id, task)
    }

    /// Removes and returns the handle for `exam_id`.
    pub fn remove(&self, exam_id: ExamId) -> Option<ScheduledTask> {
        self.tasks.lock().remove(&exam_id)
    }

    /// Removes the handle for `exam_id` and cancels it. Returns whether a
    /// pending task was cancelled.
    pub fn cancel(&self, exam_id: ExamId) -> bool {
        self.remove(exam_id).is_some_and(|task| task.cancel())
    }

    /// Fire time of the still pending task for `exam_id`.
    pub fn fire_time(&self, exam_id: ExamId) -> Option<DateTime<Utc>> {
        self.tasks
            .lock()
            .get(&exam_id)
            .filter(|task| task.is_pending())
            .map(ScheduledTask::fire_at)
    }

    /// Number of handles whose task is still pending.
    pub fn pending_count(&self) -> usize {
        self.tasks
            .lock()
            .values()
            .filter(|task| task.is_pending())
            .count()
    }

    /// Cancels every task and empties the registry. Returns how many were still pending.
    pub fn dispose(&self) -> usize {
        let tasks: Vec<ScheduledTask> = self.tasks.lock().drain().map(|(_, task)| task).collect();
        let cancelled = tasks.iter().filter(|task| task.cancel()).count();
        debug!(
            "Disposed task registry: {} handles, {} cancelled",
            tasks.len(),
            cancelled
        );
        cancelled
    }
}
