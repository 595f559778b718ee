//! Exam repository port
//!
//! Read-only view of exam metadata the schedule service needs. Services depend
//! on [`ExamRepository`], not on a concrete store.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{ActivityError, Result};
use crate::models::ExamId;

// == Exam Details ==
/// Exam metadata relevant for scheduling cache cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDetails {
    pub id: ExamId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub live_statistics_enabled: bool,
}

impl ExamDetails {
    /// Whether the exam has not ended yet or has not started yet at `now`.
    pub fn is_upcoming_or_active(&self, now: DateTime<Utc>) -> bool {
        self.end_date > now || self.start_date > now
    }
}

// == Repository Port ==
/// Persistence collaborator for exam metadata.
#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// Retrieves exam metadata
    ///
    /// # Returns
    /// - `Some(ExamDetails)` if found
    /// - `None` if not found
    async fn fetch_exam(&self, exam_id: ExamId) -> Result<Option<ExamDetails>>;

    /// Longest individual working time over all student attempts of the exam,
    /// or `None` when the exam has no attempts yet.
    async fn fetch_max_working_time(&self, exam_id: ExamId) -> Result<Option<Duration>>;

    /// Ids of exams with live statistics that are running or start later than `now`.
    async fn fetch_upcoming_or_active_exams_with_live_statistics(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExamId>>;
}

// == In-Memory Repository ==
/// Seed record: an exam plus the working times of its student attempts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSeed {
    #[serde(flatten)]
    pub exam: ExamDetails,
    #[serde(default)]
    pub working_times_secs: Vec<i64>,
}

/// [`ExamRepository`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryExamRepository {
    exams: RwLock<HashMap<ExamId, ExamDetails>>,
    working_times: RwLock<HashMap<ExamId, Vec<Duration>>>,
}

impl InMemoryExamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads exams from a JSON array of [`ExamSeed`] records.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            ActivityError::Persistence(format!("cannot read {}: {}", path.display(), e))
        })?;
        let seeds: Vec<ExamSeed> = serde_json::from_str(&raw).map_err(|e| {
            ActivityError::Persistence(format!("invalid seed file {}: {}", path.display(), e))
        })?;

        let repository = Self::new();
        for seed in seeds {
            let exam_id = seed.exam.id;
            repository.upsert_exam(seed.exam).await;
            for secs in seed.working_times_secs {
                repository
                    .add_student_exam(exam_id, Duration::seconds(secs))
                    .await;
            }
        }
        info!(
            "Loaded {} exams from {}",
            repository.exams.read().await.len(),
            path.display()
        );
        Ok(repository)
    }

    /// Inserts or replaces exam metadata.
    pub async fn upsert_exam(&self, exam: ExamDetails) {
        self.exams.write().await.insert(exam.id, exam);
    }

    /// Records a student attempt with the given individual working time.
    pub async fn add_student_exam(&self, exam_id: ExamId, working_time: Duration) {
        self.working_times
            .write()
            .await
            .entry(exam_id)
            .or_default()
            .push(working_time);
    }
}

#[async_trait]
impl ExamRepository for InMemoryExamRepository {
    async fn fetch_exam(&self, exam_id: ExamId) -> Result<Option<ExamDetails>> {
        Ok(self.exams.read().await.get(&exam_id).cloned())
    }

    async fn fetch_max_working_time(&self, exam_id: ExamId) -> Result<Option<Duration>> {
        Ok(self
            .working_times
            .read()
            .await
            .get(&exam_id)
            .and_then(|times| times.iter().max().copied()))
    }

    async fn fetch_upcoming_or_active_exams_with_live_statistics(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExamId>> {
        let mut ids: Vec<ExamId> = self
            .exams
            .read()
            .await
            .values()
            .filter(|exam| exam.live_statistics_enabled && exam.is_upcoming_or_active(now))
            .map(|exam| exam.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
