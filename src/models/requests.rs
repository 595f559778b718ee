//! Request DTOs for the exam activity API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{ExamAction, ExamActionType, StudentExamId};

/// Request body for submitting an action (POST /api/exams/:exam_id/actions)
///
/// # Fields
/// - `studentExamId`: The attempt the action belongs to
/// - `type`: The kind of action
/// - `timestamp`: Optional client timestamp (server time if omitted)
/// - `payload`: Optional type-specific details
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitActionRequest {
    #[serde(default)]
    pub student_exam_id: Option<StudentExamId>,
    #[serde(rename = "type")]
    pub action_type: ExamActionType,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payload: Value,
}

impl SubmitActionRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.student_exam_id.is_none() {
            return Some("studentExamId is required".to_string());
        }
        None
    }

    /// Converts the request into an action, stamping `now` when no timestamp was sent.
    pub fn into_action(self, now: DateTime<Utc>) -> ExamAction {
        ExamAction {
            student_exam_id: self.student_exam_id,
            action_type: self.action_type,
            timestamp: self.timestamp.unwrap_or(now),
            payload: self.payload,
            exam_activity_id: None,
        }
    }
}

/// Request body for toggling live statistics (PUT /api/exams/:exam_id/statistics)
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsToggleRequest {
    pub enabled: bool,
}
