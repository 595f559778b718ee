//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use exam_activity_cache::{
    api::create_router,
    models::ExamId,
    ports::{BroadcastMessaging, ExamDetails, InMemoryExamRepository},
    AppState, Config,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(test_state(Arc::new(InMemoryExamRepository::new())))
}

fn test_state(repository: Arc<InMemoryExamRepository>) -> AppState {
    AppState::from_config(
        &Config::default(),
        repository,
        Arc::new(BroadcastMessaging::default()),
    )
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn submit_request(exam_id: i64, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/exams/{}/actions", exam_id))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// == Submit Action Endpoint Tests ==

#[tokio::test]
async fn test_submit_action_success() {
    let app = create_test_app();

    let response = app
        .oneshot(submit_request(
            1,
            r#"{"studentExamId":4,"type":"SAVED_EXERCISE","timestamp":"2024-01-01T09:30:00Z","payload":{"exerciseId":2}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["type"], "SAVED_EXERCISE");
    assert_eq!(json["examActivityId"], 4);
    assert_eq!(json["payload"]["exerciseId"], 2);
}

#[tokio::test]
async fn test_submit_action_missing_student_exam() {
    let app = create_test_app();

    let response = app
        .oneshot(submit_request(1, r#"{"type":"STARTED_EXAM"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("studentExamId"));
}

#[tokio::test]
async fn test_submit_action_unknown_type() {
    let app = create_test_app();

    let response = app
        .oneshot(submit_request(1, r#"{"studentExamId":1,"type":"DANCED"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == List Actions Endpoint Tests ==

#[tokio::test]
async fn test_list_actions_in_arrival_order() {
    let app = create_test_app();

    for body in [
        r#"{"studentExamId":1,"type":"STARTED_EXAM"}"#,
        r#"{"studentExamId":1,"type":"SWITCHED_EXERCISE"}"#,
        r#"{"studentExamId":1,"type":"ENDED_EXAM"}"#,
    ] {
        let response = app.clone().oneshot(submit_request(5, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get_request("/api/exams/5/actions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 3);
    let types: Vec<&str> = json["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["STARTED_EXAM", "SWITCHED_EXERCISE", "ENDED_EXAM"]);
}

#[tokio::test]
async fn test_list_actions_unknown_exam_is_empty() {
    let app = create_test_app();

    let response = app
        .oneshot(get_request("/api/exams/999/actions"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0);
}

// == Schedule Endpoint Tests ==

#[tokio::test]
async fn test_schedule_and_cancel() {
    let repository = Arc::new(InMemoryExamRepository::new());
    let now = Utc::now();
    repository
        .upsert_exam(ExamDetails {
            id: ExamId(3),
            start_date: now,
            end_date: now + Duration::hours(2),
            live_statistics_enabled: true,
        })
        .await;
    let state = test_state(repository);
    let app = create_router(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/exams/3/schedule")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["scheduled"], true);
    assert!(json["fireTime"].is_string());
    assert!(state.service.scheduled_fire_time(ExamId(3)).is_some());

    app.clone()
        .oneshot(submit_request(3, r#"{"studentExamId":1,"type":"STARTED_EXAM"}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/exams/3/schedule")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.service.scheduled_fire_time(ExamId(3)).is_none());

    let response = app
        .oneshot(get_request("/api/exams/3/actions"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn test_schedule_unknown_exam() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/exams/42/schedule")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("42"));
}

// == Statistics Toggle Endpoint Tests ==

#[tokio::test]
async fn test_statistics_toggle_broadcasts() {
    let messaging = Arc::new(BroadcastMessaging::new(8));
    let mut receiver = messaging.subscribe();
    let state = AppState::from_config(
        &Config::default(),
        Arc::new(InMemoryExamRepository::new()),
        messaging,
    );
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/exams/8/statistics")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"enabled":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let message = receiver.recv().await.unwrap();
    assert_eq!(message.topic, "/topic/exam-monitoring/8/update");
    assert_eq!(message.payload, Value::Bool(true));
}

// == Reset Endpoint Tests ==

#[tokio::test]
async fn test_reset_clears_all_exams() {
    let app = create_test_app();

    for exam_id in [1, 2] {
        app.clone()
            .oneshot(submit_request(
                exam_id,
                r#"{"studentExamId":1,"type":"STARTED_EXAM"}"#,
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/exam-activity/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cleared"], 2);

    let response = app
        .oneshot(get_request("/api/exams/1/actions"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
