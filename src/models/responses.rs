//! Response DTOs for the exam activity API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ExamAction, ExamId};

/// Response body for listing actions (GET /api/exams/:exam_id/actions)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsResponse {
    pub exam_id: ExamId,
    pub count: usize,
    pub actions: Vec<ExamAction>,
}

impl ActionsResponse {
    /// Creates a new ActionsResponse
    pub fn new(exam_id: ExamId, actions: Vec<ExamAction>) -> Self {
        Self {
            exam_id,
            count: actions.len(),
            actions,
        }
    }
}

/// Response body for scheduling (POST /api/exams/:exam_id/schedule)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub exam_id: ExamId,
    /// Whether this node now holds a cleanup timer for the exam
    pub scheduled: bool,
    /// When the cleanup fires, if scheduled
    pub fire_time: Option<DateTime<Utc>>,
}

impl ScheduleResponse {
    /// Creates a new ScheduleResponse
    pub fn new(exam_id: ExamId, fire_time: Option<DateTime<Utc>>) -> Self {
        Self {
            exam_id,
            scheduled: fire_time.is_some(),
            fire_time,
        }
    }
}

/// Response body for cancelling (DELETE /api/exams/:exam_id/schedule)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub message: String,
    pub exam_id: ExamId,
}

impl CancelResponse {
    /// Creates a new CancelResponse
    pub fn new(exam_id: ExamId) -> Self {
        Self {
            message: format!("Exam {} activity cleared", exam_id),
            exam_id,
        }
    }
}

/// Response body for the statistics toggle (PUT /api/exams/:exam_id/statistics)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsToggleResponse {
    pub exam_id: ExamId,
    pub enabled: bool,
}

/// Response body for the administrative reset (POST /api/exam-activity/reset)
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    /// Number of exam caches that were cleared
    pub cleared: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
