//! API Handlers
//!
//! HTTP request handlers for each exam activity endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::cache::ExamActivityCacheHandler;
use crate::config::Config;
use crate::error::{ActivityError, Result};
use crate::models::{
    ActionsResponse, CancelResponse, ExamAction, ExamId, HealthResponse, ResetResponse,
    ScheduleResponse, StatisticsToggleRequest, StatisticsToggleResponse, SubmitActionRequest,
};
use crate::ports::{ExamRepository, MessagingTemplate};
use crate::tasks::{ClusterTaskScheduler, ScheduleService, ScheduleSettings};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Schedule service of this node
    pub service: Arc<ScheduleService>,
}

impl AppState {
    /// Creates a new AppState around an existing service.
    pub fn new(service: ScheduleService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a single-node AppState from configuration and collaborators.
    pub fn from_config(
        config: &Config,
        repository: Arc<dyn ExamRepository>,
        messaging: Arc<dyn MessagingTemplate>,
    ) -> Self {
        let service = ScheduleService::new(
            ScheduleSettings::from(config),
            Arc::new(ExamActivityCacheHandler::local()),
            repository,
            messaging,
            ClusterTaskScheduler::new(),
        );
        Self::new(service)
    }
}

/// Handler for POST /api/exams/:exam_id/actions
///
/// Stores and broadcasts one student action.
pub async fn submit_action_handler(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Json(req): Json<SubmitActionRequest>,
) -> Result<Json<ExamAction>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(ActivityError::InvalidAction(error_msg));
    }

    let action = state
        .service
        .add_action(ExamId(exam_id), req.into_action(Utc::now()))?;

    Ok(Json(action))
}

/// Handler for GET /api/exams/:exam_id/actions
///
/// Returns every cached action of the exam.
pub async fn get_actions_handler(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> Json<ActionsResponse> {
    let exam_id = ExamId(exam_id);
    Json(ActionsResponse::new(
        exam_id,
        state.service.get_all_actions(exam_id),
    ))
}

/// Handler for PUT /api/exams/:exam_id/statistics
///
/// Broadcasts a live statistics toggle.
pub async fn statistics_toggle_handler(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Json(req): Json<StatisticsToggleRequest>,
) -> Json<StatisticsToggleResponse> {
    let exam_id = ExamId(exam_id);
    state
        .service
        .notify_live_statistics_toggle(exam_id, req.enabled);

    Json(StatisticsToggleResponse {
        exam_id,
        enabled: req.enabled,
    })
}

/// Handler for POST /api/exams/:exam_id/schedule
///
/// (Re)schedules the cleanup of the exam's activity cache.
pub async fn schedule_handler(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> Result<Json<ScheduleResponse>> {
    let exam_id = ExamId(exam_id);
    let fire_time = state.service.schedule_task(exam_id).await?;

    Ok(Json(ScheduleResponse::new(exam_id, fire_time)))
}

/// Handler for DELETE /api/exams/:exam_id/schedule
///
/// Cancels the cleanup timer and clears the cache immediately.
pub async fn cancel_handler(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> Result<Json<CancelResponse>> {
    let exam_id = ExamId(exam_id);
    state.service.cancel_task(exam_id)?;

    Ok(Json(CancelResponse::new(exam_id)))
}

/// Handler for POST /api/exam-activity/reset
///
/// Clears every exam activity cache in the cluster.
pub async fn reset_handler(State(state): State<AppState>) -> Result<Json<ResetResponse>> {
    let cleared = state.service.stop_all()?;

    Ok(Json(ResetResponse { cleared }))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExamActionType, StudentExamId};
    use crate::ports::{BroadcastMessaging, InMemoryExamRepository};

    fn test_state() -> AppState {
        AppState::from_config(
            &Config::default(),
            Arc::new(InMemoryExamRepository::new()),
            Arc::new(BroadcastMessaging::default()),
        )
    }

    fn submit(student: Option<i64>) -> SubmitActionRequest {
        SubmitActionRequest {
            student_exam_id: student.map(StudentExamId),
            action_type: ExamActionType::SwitchedExercise,
            timestamp: None,
            payload: serde_json::json!({"exerciseId": 1}),
        }
    }

    #[tokio::test]
    async fn test_submit_and_list_actions() {
        let state = test_state();

        let result = submit_action_handler(State(state.clone()), Path(1), Json(submit(Some(5)))).await;
        assert!(result.is_ok());

        let response = get_actions_handler(State(state), Path(1)).await;
        assert_eq!(response.count, 1);
        assert_eq!(response.actions[0].exam_activity_id, Some(StudentExamId(5)));
    }

    #[tokio::test]
    async fn test_submit_without_student_exam() {
        let state = test_state();

        let result = submit_action_handler(State(state), Path(1), Json(submit(None))).await;
        assert!(matches!(result, Err(ActivityError::InvalidAction(_))));
    }

    #[tokio::test]
    async fn test_cancel_clears_actions() {
        let state = test_state();
        submit_action_handler(State(state.clone()), Path(2), Json(submit(Some(1))))
            .await
            .unwrap();

        let result = cancel_handler(State(state.clone()), Path(2)).await;
        assert!(result.is_ok());

        let response = get_actions_handler(State(state), Path(2)).await;
        assert_eq!(response.count, 0);
    }

    #[tokio::test]
    async fn test_schedule_unknown_exam() {
        let state = test_state();

        let result = schedule_handler(State(state), Path(404)).await;
        assert!(matches!(result, Err(ActivityError::ExamNotFound(_))));
    }

    #[tokio::test]
    async fn test_reset_handler() {
        let state = test_state();
        submit_action_handler(State(state.clone()), Path(1), Json(submit(Some(1))))
            .await
            .unwrap();

        let response = reset_handler(State(state)).await.unwrap();
        assert_eq!(response.cleared, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
