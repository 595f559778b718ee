//! Exam activity domain model
//!
//! An [`ExamActivity`] collects every [`ExamAction`] of one student exam attempt,
//! in arrival order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Identifiers ==
/// Identifier of an exam; the key of the exam activity cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamId(pub i64);

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one student's exam attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentExamId(pub i64);

impl fmt::Display for StudentExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// == Action Type ==
/// Kind of event a student produced during the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamActionType {
    StartedExam,
    EndedExam,
    HandedInEarly,
    ContinuedAfterHandInEarly,
    SwitchedExercise,
    SavedExercise,
    ConnectionUpdated,
}

// == Exam Action ==
/// One discrete, broadcastable event performed by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamAction {
    /// Attempt the action belongs to; required on ingestion
    pub student_exam_id: Option<StudentExamId>,
    /// Kind of action
    #[serde(rename = "type")]
    pub action_type: ExamActionType,
    /// Client-reported time of the action
    pub timestamp: DateTime<Utc>,
    /// Type-specific details, kept opaque
    #[serde(default)]
    pub payload: Value,
    /// Back-reference to the owning activity, set at ingestion
    #[serde(default)]
    pub exam_activity_id: Option<StudentExamId>,
}

impl ExamAction {
    /// Creates an action for the given attempt without a payload.
    pub fn new(
        student_exam_id: StudentExamId,
        action_type: ExamActionType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            student_exam_id: Some(student_exam_id),
            action_type,
            timestamp,
            payload: Value::Null,
            exam_activity_id: None,
        }
    }

    /// Attaches an opaque payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

// == Exam Activity ==
/// All actions of one student exam attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamActivity {
    /// Activity id; currently the same as the student exam id
    pub id: StudentExamId,
    pub student_exam_id: StudentExamId,
    /// Actions in arrival order
    pub actions: Vec<ExamAction>,
}

impl ExamActivity {
    /// Creates an empty activity for a student exam attempt.
    pub fn new(id: StudentExamId) -> Self {
        Self {
            id,
            student_exam_id: id,
            actions: Vec::new(),
        }
    }

    /// Appends an action, linking it back to this activity.
    pub fn add_action(&mut self, mut action: ExamAction) {
        action.exam_activity_id = Some(self.id);
        self.actions.push(action);
    }
}
