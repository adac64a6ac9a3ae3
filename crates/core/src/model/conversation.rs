use serde::{Deserialize, Serialize};

use crate::model::{Sender, Turn};

/// Append-only, chronologically ordered transcript of a session.
///
/// Indices are stable for the lifetime of the session: there is no way to
/// remove, reorder or edit a turn once it has been appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a transcript from persisted storage.
    #[must_use]
    pub fn from_persisted(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Returns the conversation with `turns` appended in order.
    #[must_use]
    pub fn append(mut self, turns: impl IntoIterator<Item = Turn>) -> Self {
        self.turns.extend(turns);
        self
    }

    /// Populates `count` placeholder system turns, only when empty.
    #[must_use]
    pub fn seed_if_empty(self, count: usize, placeholder: &str) -> Self {
        if !self.turns.is_empty() {
            return self;
        }
        self.append((0..count).map(|_| Turn::system(placeholder)))
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Index of the last turn, or 0 for an empty conversation.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.turns.len().saturating_sub(1)
    }

    #[must_use]
    pub fn user_turn_count(&self) -> usize {
        self.turns.iter().filter(|t| t.sender() == Sender::User).count()
    }

    /// The most recent `max` turns, oldest first.
    #[must_use]
    pub fn window(&self, max: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(max);
        &self.turns[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_existing_turns() {
        let convo = Conversation::new()
            .append([Turn::system("Q1")])
            .append([Turn::user("A1", None), Turn::system("Q2")]);
        let texts: Vec<_> = convo.turns().iter().map(Turn::text).collect();
        assert_eq!(texts, ["Q1", "A1", "Q2"]);
    }

    #[test]
    fn seed_only_applies_to_empty_conversation() {
        let seeded = Conversation::new().seed_if_empty(3, "Welcome!");
        assert_eq!(seeded.len(), 3);
        assert!(seeded.turns().iter().all(|t| t.is_system() && !t.is_simulated()));

        let again = seeded.clone().seed_if_empty(5, "ignored");
        assert_eq!(again, seeded);
    }

    #[test]
    fn window_returns_tail() {
        let convo = Conversation::new().append((0..30).map(|i| Turn::system(format!("Q{i}"))));
        let window = convo.window(20);
        assert_eq!(window.len(), 20);
        assert_eq!(window[0].text(), "Q10");
        assert_eq!(convo.window(100).len(), 30);
    }

    #[test]
    fn length_never_decreases_across_operations() {
        let mut convo = Conversation::new();
        let mut last = 0;
        for step in 0..10 {
            convo = if step % 3 == 0 {
                convo.seed_if_empty(2, "hi")
            } else {
                convo.append([Turn::user("a", None), Turn::system("q")])
            };
            assert!(convo.len() >= last);
            last = convo.len();
        }
    }

    #[test]
    fn counts_user_turns() {
        let convo = Conversation::new().append([
            Turn::system("Q1"),
            Turn::user("A1", None),
            Turn::system("Q2").into_simulated(),
        ]);
        assert_eq!(convo.user_turn_count(), 1);
        assert_eq!(convo.last_index(), 2);
        assert_eq!(Conversation::new().last_index(), 0);
    }
}
