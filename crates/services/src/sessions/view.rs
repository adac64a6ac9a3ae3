use tutor_core::model::{LearningPath, Session, Turn};

/// Snapshot of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub title: String,
    pub ai_message: String,
    pub code_snippet: Option<String>,
    pub hint: Option<String>,
    pub feedback: Option<String>,
    pub progress_percent: u8,
    pub position: usize,
    pub turn_count: usize,
    pub can_retreat: bool,
    /// Advancing either moves locally or asks the coach for a new question.
    pub can_advance: bool,
    pub loading: bool,
    pub completed: bool,
}

impl SessionView {
    #[must_use]
    pub fn new(path: &LearningPath, session: &Session, loading: bool) -> Self {
        let display = session.display();
        let cursor = session.cursor();
        let completed = session.is_completed();
        Self {
            title: path.title.clone(),
            ai_message: display.ai_message.clone(),
            code_snippet: non_empty(&display.code_snippet),
            hint: non_empty(&display.hint),
            feedback: session
                .current_turn()
                .and_then(Turn::feedback)
                .map(str::to_string),
            progress_percent: session.progress().percent(),
            position: cursor.position(),
            turn_count: session.conversation().len(),
            can_retreat: cursor.can_retreat(session.conversation()),
            can_advance: !loading && !completed,
            loading,
            completed,
        }
    }

    /// Short status line, e.g. `System Design  [40%]  3/7`.
    #[must_use]
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "{}  [{}%]  {}/{}",
            self.title,
            self.progress_percent,
            self.position + 1,
            self.turn_count.max(1)
        );
        if self.loading {
            line.push_str("  thinking...");
        } else if self.completed {
            line.push_str("  complete");
        }
        line
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::ProgressPolicy;
    use tutor_core::model::PathId;

    fn path() -> LearningPath {
        LearningPath {
            id: PathId::new("sd"),
            title: "System Design".into(),
            image: None,
            description: None,
        }
    }

    #[test]
    fn view_reflects_current_turn() {
        let policy = ProgressPolicy::default();
        let mut session = Session::start(path().session_key(), "Welcome!", 1, &policy);
        session.extend(
            [
                Turn::user("hi", None),
                Turn::system("Q1")
                    .with_hint(Some("think about load".into()))
                    .with_feedback(Some("fine".into())),
            ],
            &policy,
        );

        let view = SessionView::new(&path(), &session, false);
        assert_eq!(view.ai_message, "Q1");
        assert_eq!(view.hint.as_deref(), Some("think about load"));
        assert_eq!(view.code_snippet, None);
        assert_eq!(view.feedback.as_deref(), Some("fine"));
        assert_eq!(view.position, 2);
        assert_eq!(view.turn_count, 3);
        assert!(view.can_retreat);
        assert!(view.can_advance);
        assert_eq!(view.status_line(), "System Design  [0%]  3/3");
    }

    #[test]
    fn loading_shows_in_status_line() {
        let policy = ProgressPolicy::default();
        let session = Session::start(path().session_key(), "Welcome!", 1, &policy);
        let view = SessionView::new(&path(), &session, true);
        assert!(!view.can_retreat);
        assert!(!view.can_advance);
        assert!(view.status_line().ends_with("thinking..."));
    }
}
