//! Messaging port
//!
//! Fire-and-forget broadcast of exam monitoring events. Topic names are derived
//! from the exam id.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{ActivityError, Result};
use crate::models::ExamId;

/// Topic carrying every submitted action of an exam.
pub fn action_topic(exam_id: ExamId) -> String {
    format!("/topic/exam-monitoring/{}/action", exam_id)
}

/// Topic carrying live statistics on/off changes of an exam.
pub fn status_topic(exam_id: ExamId) -> String {
    format!("/topic/exam-monitoring/{}/update", exam_id)
}

// == Messaging Port ==
/// Messaging collaborator.
pub trait MessagingTemplate: Send + Sync {
    /// Sends `payload` to every subscriber of `topic`.
    fn publish(&self, topic: &str, payload: Value) -> Result<()>;
}

// == Broadcast Messaging ==
/// One message as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMessage {
    pub topic: String,
    pub payload: Value,
}

/// [`MessagingTemplate`] over an in-process tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastMessaging {
    sender: broadcast::Sender<TopicMessage>,
}

impl BroadcastMessaging {
    /// Creates a channel buffering up to `capacity` messages per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to messages on all topics.
    pub fn subscribe(&self) -> broadcast::Receiver<TopicMessage> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastMessaging {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl MessagingTemplate for BroadcastMessaging {
    fn publish(&self, topic: &str, payload: Value) -> Result<()> {
        if self.sender.receiver_count() == 0 {
            debug!("No subscribers for {}, dropping message", topic);
            return Ok(());
        }
        self.sender
            .send(TopicMessage {
                topic: topic.to_string(),
                payload,
            })
            .map(|_| ())
            .map_err(|e| ActivityError::Messaging(format!("publish to {} failed: {}", topic, e)))
    }
}
