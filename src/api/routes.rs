//! API Routes
//!
//! Configures the Axum router with all exam activity endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cancel_handler, get_actions_handler, health_handler, reset_handler, schedule_handler,
    statistics_toggle_handler, submit_action_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/exams/:exam_id/actions` - Submit a student action
/// - `GET /api/exams/:exam_id/actions` - List cached actions
/// - `PUT /api/exams/:exam_id/statistics` - Broadcast a live statistics toggle
/// - `POST /api/exams/:exam_id/schedule` - Schedule cache cleanup
/// - `DELETE /api/exams/:exam_id/schedule` - Cancel cleanup and clear now
/// - `POST /api/exam-activity/reset` - Clear every exam cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route(
            "/api/exams/:exam_id/actions",
            post(submit_action_handler).get(get_actions_handler),
        )
        .route(
            "/api/exams/:exam_id/statistics",
            put(statistics_toggle_handler),
        )
        .route(
            "/api/exams/:exam_id/schedule",
            post(schedule_handler).delete(cancel_handler),
        )
        .route("/api/exam-activity/reset", post(reset_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
