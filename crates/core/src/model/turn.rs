use serde::{Deserialize, Serialize};

use crate::model::Score;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    System,
    User,
}

/// One message of the transcript. Immutable once appended to a `Conversation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    sender: Sender,
    /// Missing in transcripts saved after a failed reply; decodes as empty.
    #[serde(default)]
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<Score>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    simulated: bool,
}

impl Turn {
    /// A coach turn carrying the reply text.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::System,
            text: text.into(),
            code: None,
            hint: None,
            feedback: None,
            score: None,
            simulated: false,
        }
    }

    /// A learner answer. `score` is `None` when the answer is unscored.
    #[must_use]
    pub fn user(text: impl Into<String>, score: Option<Score>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            code: None,
            hint: None,
            feedback: None,
            score,
            simulated: false,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = non_blank(code);
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = non_blank(hint);
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: Option<String>) -> Self {
        self.feedback = non_blank(feedback);
        self
    }

    /// Marks a system turn as synthesized without a matching user answer.
    ///
    /// Has no effect on user turns.
    #[must_use]
    pub fn into_simulated(mut self) -> Self {
        self.simulated = self.sender == Sender::System;
        self
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.sender == Sender::System
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// Score of a user turn. Always `None` on system turns.
    #[must_use]
    pub fn score(&self) -> Option<Score> {
        match self.sender {
            Sender::User => self.score,
            Sender::System => None,
        }
    }

    #[must_use]
    pub fn is_simulated(&self) -> bool {
        self.simulated && self.sender == Sender::System
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|val| !val.trim().is_empty())
}
