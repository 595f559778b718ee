//! API Module
//!
//! HTTP handlers and routing for the exam activity server.
//!
//! # Endpoints
//! - `POST /api/exams/:exam_id/actions` - Submit a student action
//! - `GET /api/exams/:exam_id/actions` - List cached actions
//! - `PUT /api/exams/:exam_id/statistics` - Broadcast a live statistics toggle
//! - `POST /api/exams/:exam_id/schedule` - Schedule cache cleanup
//! - `DELETE /api/exams/:exam_id/schedule` - Cancel cleanup and clear now
//! - `POST /api/exam-activity/reset` - Clear every exam cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
