//! Exam Activity Schedule Service
//!
//! Ingests exam actions into the activity cache and keeps exactly one cleanup
//! timer per exam that discards the cache once every student must have finished.
//!
//! Per exam: unscheduled, then scheduled at a fire time, then cleared when the
//! timer fires or the task is cancelled, and scheduled again on the next
//! `schedule_task` call.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::cache::ExamActivityCacheHandler;
use crate::config::Config;
use crate::error::{ActivityError, Result};
use crate::models::{ExamAction, ExamId};
use crate::ports::{action_topic, status_topic, ExamDetails, ExamRepository, MessagingTemplate};
use crate::tasks::{ClusterTaskScheduler, ScheduledTaskRegistry};

// == Settings ==
/// Deployment settings the schedule service depends on.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSettings {
    /// Extra time after the latest possible finish before a cache is discarded
    pub grace_delay: Duration,
    pub is_production: bool,
    pub is_scheduling_node: bool,
}

impl ScheduleSettings {
    /// Whether this node may recover timers on startup.
    pub fn runs_startup_recovery(&self) -> bool {
        self.is_production && self.is_scheduling_node
    }
}

impl From<&Config> for ScheduleSettings {
    fn from(config: &Config) -> Self {
        Self {
            grace_delay: config.grace_delay(),
            is_production: config.is_production,
            is_scheduling_node: config.is_scheduling_node,
        }
    }
}

// == Fire Time ==
/// Latest possible finish of any student plus the grace delay.
pub fn compute_fire_time(
    exam: &ExamDetails,
    max_working_time: Duration,
    grace_delay: Duration,
) -> DateTime<Utc> {
    let latest_individual_end = exam
        .start_date
        .checked_add_signed(max_working_time)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    exam.end_date
        .max(latest_individual_end)
        .checked_add_signed(grace_delay)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Cluster-wide name of the cleanup task of `exam_id`.
pub fn cleanup_task_name(exam_id: ExamId) -> String {
    format!("exam-activity-cleanup-{}", exam_id)
}

// == Schedule Service ==
/// Coordinates action ingestion, broadcasting and per-exam cache cleanup.
pub struct ScheduleService {
    settings: ScheduleSettings,
    cache: Arc<ExamActivityCacheHandler>,
    repository: Arc<dyn ExamRepository>,
    messaging: Arc<dyn MessagingTemplate>,
    scheduler: ClusterTaskScheduler,
    registry: ScheduledTaskRegistry,
}

impl ScheduleService {
    // == Constructor ==
    /// Creates a service for one node.
    ///
    /// # Arguments
    /// * `cache` - Handler over the cluster-shared activity map
    /// * `scheduler` - Cluster-shared task scheduler
    pub fn new(
        settings: ScheduleSettings,
        cache: Arc<ExamActivityCacheHandler>,
        repository: Arc<dyn ExamRepository>,
        messaging: Arc<dyn MessagingTemplate>,
        scheduler: ClusterTaskScheduler,
    ) -> Self {
        Self {
            settings,
            cache,
            repository,
            messaging,
            scheduler,
            registry: ScheduledTaskRegistry::new(),
        }
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    pub fn cache(&self) -> &ExamActivityCacheHandler {
        &self.cache
    }

    pub fn scheduler(&self) -> &ClusterTaskScheduler {
        &self.scheduler
    }

    // == Ingestion ==
    /// Appends `action` to its student's activity and broadcasts it.
    ///
    /// Only the student's own activity entry is locked. A failed broadcast is
    /// logged and does not undo the append.
    pub fn add_action(&self, exam_id: ExamId, mut action: ExamAction) -> Result<ExamAction> {
        let student_exam_id = action.student_exam_id.ok_or_else(|| {
            ActivityError::InvalidAction("action has no student exam id".to_string())
        })?;
        action.exam_activity_id = Some(student_exam_id);

        self.cache
            .get_transient_write_cache_for(&exam_id)
            .update_activity(student_exam_id, |activity| activity.add_action(action.clone()))?;
        debug!(
            "Exam {}: stored {:?} for student exam {}",
            exam_id, action.action_type, student_exam_id
        );

        match serde_json::to_value(&action) {
            Ok(payload) => self.broadcast(&action_topic(exam_id), payload),
            Err(e) => warn!("Exam {}: cannot serialize action: {}", exam_id, e),
        }
        Ok(action)
    }

    /// Broadcasts that live statistics were switched on or off.
    pub fn notify_live_statistics_toggle(&self, exam_id: ExamId, enabled: bool) {
        info!("Exam {}: live statistics enabled = {}", exam_id, enabled);
        self.broadcast(&status_topic(exam_id), json!(enabled));
    }

    fn broadcast(&self, topic: &str, payload: Value) {
        if let Err(e) = self.messaging.publish(topic, payload) {
            warn!("Broadcast to {} failed: {}", topic, e);
        }
    }

    /// Every cached action of the exam, grouped by student exam.
    pub fn get_all_actions(&self, exam_id: ExamId) -> Vec<ExamAction> {
        self.cache.get_read_cache_for(&exam_id).all_actions()
    }

    // == Scheduling ==
    /// (Re)schedules the cleanup of `exam_id`.
    ///
    /// Returns the fire time, or `None` when live statistics are off or another
    /// node already holds the task. Failures leave the exam unscheduled.
    pub async fn schedule_task(&self, exam_id: ExamId) -> Result<Option<DateTime<Utc>>> {
        if self.registry.cancel(exam_id) {
            debug!("Exam {}: cancelled previous cleanup task", exam_id);
        }

        let exam = match self.repository.fetch_exam(exam_id).await {
            Ok(Some(exam)) => exam,
            Ok(None) => {
                error!("Exam {}: cannot schedule cleanup, exam not found", exam_id);
                return Err(ActivityError::ExamNotFound(exam_id));
            }
            Err(e) => {
                error!("Exam {}: cannot schedule cleanup: {}", exam_id, e);
                return Err(e);
            }
        };

        if !exam.live_statistics_enabled {
            debug!("Exam {}: live statistics disabled, nothing to schedule", exam_id);
            return Ok(None);
        }

        let max_working_time = match self.repository.fetch_max_working_time(exam_id).await {
            Ok(time) => time.unwrap_or_else(Duration::zero),
            Err(e) => {
                error!("Exam {}: cannot load working times: {}", exam_id, e);
                return Err(e);
            }
        };
        let fire_time = compute_fire_time(&exam, max_working_time, self.settings.grace_delay);

        let cache = Arc::clone(&self.cache);
        let cleanup = async move {
            match cache.clear(exam_id) {
                Ok(true) => info!("Exam {}: activity cache cleared", exam_id),
                Ok(false) => debug!("Exam {}: no activity cache to clear", exam_id),
                Err(e) => error!("Exam {}: clearing activity cache failed: {}", exam_id, e),
            }
        };

        match self
            .scheduler
            .schedule_at(cleanup_task_name(exam_id), fire_time, cleanup)
        {
            Ok(task) => {
                self.registry.insert(exam_id, task);
                info!("Exam {}: activity cleanup scheduled at {}", exam_id, fire_time);
                Ok(Some(fire_time))
            }
            Err(ActivityError::DuplicateTask(name)) => {
                warn!(
                    "Exam {}: cleanup task {} already scheduled by another node",
                    exam_id, name
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Cancels the local timer of `exam_id` and clears its cache right away.
    pub fn cancel_task(&self, exam_id: ExamId) -> Result<()> {
        if self.registry.cancel(exam_id) {
            info!("Exam {}: cleanup task cancelled", exam_id);
        }
        self.cleanup(exam_id)?;
        Ok(())
    }

    /// Clears the activity cache of `exam_id` if one exists. Never creates one.
    pub fn cleanup(&self, exam_id: ExamId) -> Result<bool> {
        self.cache.clear(exam_id)
    }

    /// Fire time of this node's pending cleanup task for `exam_id`.
    pub fn scheduled_fire_time(&self, exam_id: ExamId) -> Option<DateTime<Utc>> {
        self.registry.fire_time(exam_id)
    }

    /// Number of cleanup tasks this node holds that are still pending.
    pub fn pending_task_count(&self) -> usize {
        self.registry.pending_count()
    }

    // == Lifecycle ==
    /// Re-creates cleanup timers lost by a restart.
    ///
    /// Only production scheduling nodes do this. Returns how many timers this
    /// node scheduled.
    pub async fn startup_recovery(&self) -> Result<usize> {
        if !self.settings.runs_startup_recovery() {
            debug!("Skipping exam activity startup recovery on this node");
            return Ok(0);
        }

        let exam_ids = self
            .repository
            .fetch_upcoming_or_active_exams_with_live_statistics(Utc::now())
            .await?;

        let mut scheduled = 0;
        for exam_id in exam_ids {
            match self.schedule_task(exam_id).await {
                Ok(Some(_)) => scheduled += 1,
                Ok(None) => {}
                Err(e) => warn!("Exam {}: startup recovery failed: {}", exam_id, e),
            }
        }
        info!("Startup recovery scheduled {} exam cleanup tasks", scheduled);
        Ok(scheduled)
    }

    /// Clears every cache present in the cluster. Returns how many were cleared.
    pub fn stop_all(&self) -> Result<usize> {
        let mut cleared = 0;
        for exam_id in self
            .cache
            .get_all_caches()
            .iter()
            .filter_map(|cache| cache.exam_id())
        {
            if self.cleanup(exam_id)? {
                cleared += 1;
            }
        }
        info!("Cleared {} exam activity caches", cleared);
        Ok(cleared)
    }

    /// Cancels this node's timers and disposes its registry.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.registry.dispose();
        info!("Schedule service stopped, {} cleanup tasks cancelled", cancelled);
        cancelled
    }
}
