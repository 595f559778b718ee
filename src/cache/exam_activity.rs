//! Exam Activity Cache Module
//!
//! Per-exam map of student exam attempt to [`ExamActivity`], plus the empty
//! sentinel handed out for exams that have no cache.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::error::{ActivityError, Result};
use crate::models::{ExamAction, ExamActivity, ExamId, StudentExamId};

static EMPTY_CACHE: OnceLock<Arc<ExamActivityCache>> = OnceLock::new();

// == Exam Activity Cache ==
/// Activity cache of one exam.
///
/// `Populated` is what lives in the cluster map. `Empty` stands in for "no cache
/// yet": it reads as empty and rejects every mutation.
#[derive(Debug)]
pub enum ExamActivityCache {
    Populated(PopulatedExamActivityCache),
    Empty,
}

impl ExamActivityCache {
    // == Constructors ==
    /// Creates an empty populated cache for `exam_id`.
    pub fn populated(exam_id: ExamId) -> Self {
        Self::Populated(PopulatedExamActivityCache::new(exam_id))
    }

    /// The shared sentinel instance.
    pub fn empty() -> Arc<Self> {
        Arc::clone(EMPTY_CACHE.get_or_init(|| Arc::new(Self::Empty)))
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Exam this cache belongs to; the sentinel belongs to none.
    pub fn exam_id(&self) -> Option<ExamId> {
        match self {
            Self::Populated(cache) => Some(cache.exam_id),
            Self::Empty => None,
        }
    }

    // == Reads ==
    /// Snapshot of all activities keyed by student exam.
    pub fn get_activities(&self) -> HashMap<StudentExamId, ExamActivity> {
        match self {
            Self::Populated(cache) => cache
                .activities
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
            Self::Empty => HashMap::new(),
        }
    }

    /// Snapshot of a single activity.
    pub fn activity(&self, activity_id: StudentExamId) -> Option<ExamActivity> {
        match self {
            Self::Populated(cache) => cache
                .activities
                .get(&activity_id)
                .map(|entry| entry.value().clone()),
            Self::Empty => None,
        }
    }

    /// Every action of every activity, grouped by student exam in ascending id order.
    pub fn all_actions(&self) -> Vec<ExamAction> {
        let mut activities: Vec<ExamActivity> = self.get_activities().into_values().collect();
        activities.sort_by_key(|activity| activity.id);
        activities
            .into_iter()
            .flat_map(|activity| activity.actions)
            .collect()
    }

    /// Number of activities.
    pub fn len(&self) -> usize {
        match self {
            Self::Populated(cache) => cache.activities.len(),
            Self::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Writes ==
    /// Applies `update` to the activity `activity_id`, creating it first if needed.
    ///
    /// Only that single entry is locked while `update` runs, so updates for
    /// other students of the same exam proceed in parallel.
    pub fn update_activity<R, U>(&self, activity_id: StudentExamId, update: U) -> Result<R>
    where
        U: FnOnce(&mut ExamActivity) -> R,
    {
        match self {
            Self::Populated(cache) => {
                let mut entry = cache
                    .activities
                    .entry(activity_id)
                    .or_insert_with(|| ExamActivity::new(activity_id));
                Ok(update(entry.value_mut()))
            }
            Self::Empty => Err(ActivityError::UnsupportedOperation("update_activity")),
        }
    }

    /// Removes every activity. Clearing an already empty cache is a no-op.
    pub fn clear(&self) -> Result<()> {
        match self {
            Self::Populated(cache) => {
                cache.activities.clear();
                Ok(())
            }
            Self::Empty => Err(ActivityError::UnsupportedOperation("clear")),
        }
    }
}

// == Populated Variant ==
/// Activity map of one exam as stored in the cluster map.
#[derive(Debug)]
pub struct PopulatedExamActivityCache {
    exam_id: ExamId,
    activities: DashMap<StudentExamId, ExamActivity>,
}

impl PopulatedExamActivityCache {
    pub fn new(exam_id: ExamId) -> Self {
        Self {
            exam_id,
            activities: DashMap::new(),
        }
    }
}
