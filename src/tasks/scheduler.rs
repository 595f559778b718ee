//! Cluster Task Scheduler
//!
//! Named one-shot tasks shared by every node of the cluster. A name can only be
//! scheduled once while its task is pending; a second registration fails with
//! [`ActivityError::DuplicateTask`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::{ActivityError, Result};

#[derive(Debug)]
struct PendingTask {
    id: u64,
    fire_at: DateTime<Utc>,
    abort: AbortHandle,
}

#[derive(Debug, Default)]
struct SchedulerState {
    pending: Mutex<HashMap<String, PendingTask>>,
    next_id: AtomicU64,
}

impl SchedulerState {
    /// Claims the pending task for execution; fails if it was cancelled or replaced.
    fn claim(&self, name: &str, id: u64) -> bool {
        let mut pending = self.pending.lock();
        match pending.get(name) {
            Some(task) if task.id == id => {
                pending.remove(name);
                true
            }
            _ => false,
        }
    }

    fn cancel(&self, name: &str, id: u64) -> bool {
        let mut pending = self.pending.lock();
        match pending.get(name) {
            Some(task) if task.id == id => {
                if let Some(task) = pending.remove(name) {
                    task.abort.abort();
                }
                true
            }
            _ => false,
        }
    }

    fn is_pending(&self, name: &str, id: u64) -> bool {
        self.pending
            .lock()
            .get(name)
            .is_some_and(|task| task.id == id)
    }
}

// == Cluster Task Scheduler ==
/// Cluster-shared scheduler of named one-shot tasks. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ClusterTaskScheduler {
    state: Arc<SchedulerState>,
}

impl ClusterTaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` once at `fire_at` (immediately if that is in the past).
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_at<Fut>(
        &self,
        name: impl Into<String>,
        fire_at: DateTime<Utc>,
        task: Fut,
    ) -> Result<ScheduledTask>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let mut pending = self.state.pending.lock();
        if pending.contains_key(&name) {
            return Err(ActivityError::DuplicateTask(name));
        }

        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        let delay = (fire_at - Utc::now()).to_std().unwrap_or_default();
        let state = Arc::clone(&self.state);
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if state.claim(&task_name, id) {
                debug!("Running scheduled task {}", task_name);
                task.await;
            }
        });

        pending.insert(
            name.clone(),
            PendingTask {
                id,
                fire_at,
                abort: handle.abort_handle(),
            },
        );
        debug!("Scheduled task {} at {}", name, fire_at);

        Ok(ScheduledTask {
            name,
            id,
            fire_at,
            state: Arc::clone(&self.state),
        })
    }

    /// Whether a task named `name` is still pending anywhere in the cluster.
    pub fn is_scheduled(&self, name: &str) -> bool {
        self.state.pending.lock().contains_key(name)
    }

    /// Fire time of the pending task named `name`.
    pub fn fire_time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.state.pending.lock().get(name).map(|task| task.fire_at)
    }

    /// Number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.state.pending.lock().len()
    }
}

// == Scheduled Task Handle ==
/// Handle to one scheduled task.
#[derive(Debug)]
pub struct ScheduledTask {
    name: String,
    id: u64,
    fire_at: DateTime<Utc>,
    state: Arc<SchedulerState>,
}

impl ScheduledTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fire_at(&self) -> DateTime<Utc> {
        self.fire_at
    }

    /// Whether the task has neither fired nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.state.is_pending(&self.name, self.id)
    }

    /// Cancels the task if still pending. Returns whether this call cancelled it.
    pub fn cancel(&self) -> bool {
        self.state.cancel(&self.name, self.id)
    }
}
