mod http;
mod reply;

use async_trait::async_trait;
use serde::Serialize;
use tutor_core::model::Turn;

use crate::error::CoachError;

pub use http::HttpCoachClient;
pub use reply::{FALLBACK_REPLY, decode_reply};

/// Answer text that stands for "just give me the next question".
pub const NAVIGATION_ANSWER: &str = "ok";

/// One request to the `POST /design_chat` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachRequest {
    pub message: String,
    pub learning_path: String,
    pub context: RequestContext,
    pub is_first_response: bool,
}

/// Windowed slice of the transcript sent along with an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestContext {
    pub conversation: Vec<Turn>,
}

impl CoachRequest {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        learning_path: impl Into<String>,
        window: &[Turn],
        is_first_response: bool,
    ) -> Self {
        Self {
            message: message.into(),
            learning_path: learning_path.into(),
            context: RequestContext {
                conversation: window.to_vec(),
            },
            is_first_response,
        }
    }
}

/// Normalized coach reply.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachReply {
    pub reply: String,
    pub code: Option<String>,
    pub hint: Option<String>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

impl CoachReply {
    /// A reply carrying only text.
    #[must_use]
    pub fn plain(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            code: None,
            hint: None,
            score: None,
            feedback: None,
        }
    }

    /// The system turn this reply becomes in the transcript.
    #[must_use]
    pub fn into_turn(self) -> Turn {
        Turn::system(self.reply)
            .with_code(self.code)
            .with_hint(self.hint)
            .with_feedback(self.feedback)
    }
}

/// Remote reasoning service that turns an answer into the next coach turn.
#[async_trait]
pub trait CoachApi: Send + Sync {
    /// Send one answer and await exactly one reply.
    ///
    /// # Errors
    ///
    /// Returns `CoachError` on transport failure, a non-success status, or a
    /// service-reported error body.
    async fn send(&self, request: &CoachRequest) -> Result<CoachReply, CoachError>;
}

/// Whether an answer is the literal navigation no-op.
#[must_use]
pub fn is_navigation_answer(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(NAVIGATION_ANSWER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_wire_shape() {
        let window = [Turn::system("Q1")];
        let request = CoachRequest::new("my answer", "System Design", &window, true);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "message": "my answer",
                "learning_path": "System Design",
                "context": { "conversation": [{ "sender": "system", "text": "Q1" }] },
                "is_first_response": true
            })
        );
    }

    #[test]
    fn navigation_answer_is_case_insensitive() {
        assert!(is_navigation_answer("OK"));
        assert!(is_navigation_answer(" ok "));
        assert!(!is_navigation_answer("okay"));
    }

    #[test]
    fn reply_becomes_system_turn() {
        let turn = CoachReply {
            reply: "Q2".into(),
            code: Some("x".into()),
            hint: Some(String::new()),
            score: Some(9.0),
            feedback: Some("nice".into()),
        }
        .into_turn();
        assert!(turn.is_system());
        assert_eq!(turn.code(), Some("x"));
        assert_eq!(turn.hint(), None);
        assert_eq!(turn.feedback(), Some("nice"));
        assert_eq!(turn.score(), None);
    }
}
