//! Collaborator Ports
//!
//! Contracts for the systems the exam activity cache talks to, with the
//! in-process implementations the server binary runs on.

mod messaging;
mod repository;

pub use messaging::{action_topic, status_topic, BroadcastMessaging, MessagingTemplate, TopicMessage};
pub use repository::{ExamDetails, ExamRepository, ExamSeed, InMemoryExamRepository};
