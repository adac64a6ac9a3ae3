use crate::model::{Conversation, Turn};

/// Result of asking the cursor to move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to the system turn at this index.
    Moved(usize),
    /// No system turn lies ahead: the caller should synthesize the next one.
    EndOfLog,
}

/// The "currently displayed" position in a conversation.
///
/// Independent of the transcript's tail; every move lands on a system turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    #[must_use]
    pub fn at(position: usize) -> Self {
        Self { position }
    }

    /// Initial position on session load: the last turn.
    #[must_use]
    pub fn at_tail(conversation: &Conversation) -> Self {
        Self::at(conversation.last_index())
    }

    #[must_use]
    pub fn position(self) -> usize {
        self.position
    }

    /// Whether the cursor sits on (or past) the last turn.
    #[must_use]
    pub fn is_at_tail(self, conversation: &Conversation) -> bool {
        self.position >= conversation.last_index()
    }

    /// Move to the next system turn after the current position.
    pub fn advance(&mut self, conversation: &Conversation) -> Advance {
        let found = conversation
            .turns()
            .iter()
            .enumerate()
            .skip(self.position + 1)
            .find(|(_, turn)| turn.is_system())
            .map(|(index, _)| index);

        match found {
            Some(index) => {
                self.position = index;
                Advance::Moved(index)
            }
            None => Advance::EndOfLog,
        }
    }

    /// Move to the nearest system turn before the current position.
    ///
    /// Returns `None` (and leaves the cursor untouched) when there is none.
    pub fn retreat(&mut self, conversation: &Conversation) -> Option<usize> {
        let upper = self.position.min(conversation.len());
        let found = conversation.turns()[..upper]
            .iter()
            .rposition(Turn::is_system)?;
        self.position = found;
        Some(found)
    }

    /// Whether a retreat would move the cursor.
    #[must_use]
    pub fn can_retreat(self, conversation: &Conversation) -> bool {
        let upper = self.position.min(conversation.len());
        conversation.turns()[..upper].iter().any(Turn::is_system)
    }

    /// Jump straight to `index`, clamped to the conversation bounds.
    pub fn jump_to(&mut self, index: usize, conversation: &Conversation) {
        self.position = index.min(conversation.last_index());
    }
}
