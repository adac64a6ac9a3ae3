use crate::cursor::{Advance, Cursor};
use crate::model::{Conversation, SessionKey, Turn};
use crate::progress::{Progress, ProgressScorer};

/// User-visible message shown when a coach request fails.
pub const ERROR_MESSAGE: &str = "Error processing request.";

/// Cached copy of the turn currently on screen.
///
/// Redundant with the conversation but kept so renderers don't have to look
/// the turn up, and so error text can be shown without touching the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayCache {
    pub ai_message: String,
    pub code_snippet: String,
    pub hint: String,
}

impl DisplayCache {
    #[must_use]
    pub fn from_turn(turn: &Turn) -> Self {
        Self {
            ai_message: turn.text().to_string(),
            code_snippet: turn.code().unwrap_or_default().to_string(),
            hint: turn.hint().unwrap_or_default().to_string(),
        }
    }

    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            ai_message: text.into(),
            ..Self::default()
        }
    }
}

/// One learning path's tutoring session: transcript plus derived display state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    key: SessionKey,
    conversation: Conversation,
    display: DisplayCache,
    cursor: Cursor,
    progress: Progress,
}

impl Session {
    /// Rehydrate a session from persisted parts.
    ///
    /// The cursor defaults to the last turn and is clamped to the log.
    /// Progress is recomputed with `scorer`.
    #[must_use]
    pub fn from_persisted(
        key: SessionKey,
        conversation: Conversation,
        display: DisplayCache,
        cursor: Option<usize>,
        scorer: &impl ProgressScorer,
    ) -> Self {
        let mut position = Cursor::at_tail(&conversation);
        if let Some(index) = cursor {
            position.jump_to(index, &conversation);
        }
        let progress = scorer.score(conversation.turns());
        Self {
            key,
            conversation,
            display,
            cursor: position,
            progress,
        }
    }

    /// A brand-new session seeded with `seed_turns` placeholder questions.
    #[must_use]
    pub fn start(
        key: SessionKey,
        welcome: &str,
        seed_turns: usize,
        scorer: &impl ProgressScorer,
    ) -> Self {
        let conversation = Conversation::new().seed_if_empty(seed_turns, welcome);
        Self::from_persisted(key, conversation, DisplayCache::message(welcome), None, scorer)
    }

    #[must_use]
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub fn display(&self) -> &DisplayCache {
        &self.display
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// The turn under the cursor, if any.
    #[must_use]
    pub fn current_turn(&self) -> Option<&Turn> {
        self.conversation.get(self.cursor.position())
    }

    #[must_use]
    pub fn is_first_response(&self) -> bool {
        self.conversation.user_turn_count() == 0
    }

    /// Progress is full and the cursor is on the last turn.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.progress.is_full() && self.cursor.is_at_tail(&self.conversation)
    }

    /// Seeds placeholder turns if the transcript is still empty.
    pub fn seed_if_empty(&mut self, count: usize, placeholder: &str, scorer: &impl ProgressScorer) {
        if !self.conversation.is_empty() || count == 0 {
            return;
        }
        let conversation = std::mem::take(&mut self.conversation);
        self.conversation = conversation.seed_if_empty(count, placeholder);
        self.settle_on_tail(scorer);
    }

    /// Appends turns, moves the cursor to the new tail and recomputes progress.
    pub fn extend(&mut self, turns: impl IntoIterator<Item = Turn>, scorer: &impl ProgressScorer) {
        let conversation = std::mem::take(&mut self.conversation);
        self.conversation = conversation.append(turns);
        self.settle_on_tail(scorer);
    }

    /// Moves to the next system turn and surfaces it.
    pub fn advance(&mut self) -> Advance {
        let moved = self.cursor.advance(&self.conversation);
        if let Advance::Moved(_) = moved {
            self.surface_current();
        }
        moved
    }

    /// Moves to the previous system turn and surfaces it.
    pub fn retreat(&mut self) -> Option<usize> {
        let moved = self.cursor.retreat(&self.conversation)?;
        self.surface_current();
        Some(moved)
    }

    /// Replaces the display with the fixed error message, leaving the log alone.
    pub fn show_error(&mut self) {
        self.display = DisplayCache::message(ERROR_MESSAGE);
    }

    fn settle_on_tail(&mut self, scorer: &impl ProgressScorer) {
        self.cursor = Cursor::at_tail(&self.conversation);
        self.progress = scorer.score(self.conversation.turns());
        self.surface_current();
    }

    fn surface_current(&mut self) {
        if let Some(turn) = self.conversation.get(self.cursor.position()) {
            self.display = DisplayCache::from_turn(turn);
        }
    }
}
