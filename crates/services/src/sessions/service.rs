use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use storage::repository::{SessionRecord, SessionStore};
use tokio::sync::Mutex as SaveGate;
use tutor_core::Advance;
use tutor_core::model::{LearningPath, Score, Session, SessionSettings, Turn};

use super::view::SessionView;
use crate::coach::{CoachApi, CoachReply, CoachRequest, NAVIGATION_ANSWER, is_navigation_answer};
use crate::error::SessionError;
use crate::narration::Narrator;

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// What a submission or navigation request did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The coach replied and new turns were appended.
    Appended,
    /// The cursor moved locally to this index.
    Moved(usize),
    /// Nothing to do (blank answer, no turn in that direction, session complete).
    Ignored,
    /// Another coach request is still in flight; the request was dropped.
    Busy,
    /// The coach request failed; the error message is on display.
    Failed,
    /// The session was closed before the reply arrived; the reply was dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exchange {
    Answer,
    Synthetic,
}

//
// ─── SESSION ENGINE ────────────────────────────────────────────────────────────
//

struct State {
    session: Session,
    loading: bool,
    generation: u64,
    closed: bool,
}

/// Live tutoring session for one learning path.
///
/// All mutation happens through `&self` so a renderer and an input loop can
/// share it. The state lock is never held across an `.await`: a request is
/// prepared under the lock, sent without it, and applied under it again.
/// At most one coach request is in flight; the `loading` flag rejects others.
///
/// Saves go through a gate and always write the state current at the time
/// the gate is taken, so the last write to land is the newest state.
pub struct CoachSession {
    path: LearningPath,
    settings: SessionSettings,
    coach: Arc<dyn CoachApi>,
    store: Arc<dyn SessionStore>,
    narrator: Option<Arc<dyn Narrator>>,
    state: Mutex<State>,
    save_gate: SaveGate<()>,
    persistent: bool,
}

impl CoachSession {
    #[must_use]
    pub fn new(
        path: LearningPath,
        session: Session,
        settings: SessionSettings,
        coach: Arc<dyn CoachApi>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            path,
            settings,
            coach,
            store,
            narrator: None,
            state: Mutex::new(State {
                session,
                loading: false,
                generation: 0,
                closed: false,
            }),
            save_gate: SaveGate::new(()),
            persistent: true,
        }
    }

    /// Keep this session in memory only; nothing is written to the store.
    ///
    /// Used when the stored copy could not be read, so it is never replaced
    /// by a session that does not know its contents.
    #[must_use]
    pub fn memory_only(mut self) -> Self {
        self.persistent = false;
        self
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    #[must_use]
    pub fn with_narrator(mut self, narrator: Option<Arc<dyn Narrator>>) -> Self {
        self.narrator = narrator;
        self
    }

    #[must_use]
    pub fn learning_path(&self) -> &LearningPath {
        &self.path
    }

    /// Copy of the current session state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is poisoned.
    pub fn snapshot(&self) -> Result<Session, SessionError> {
        Ok(self.lock()?.session.clone())
    }

    /// Render-ready view of the current state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is poisoned.
    pub fn view(&self) -> Result<SessionView, SessionError> {
        let state = self.lock()?;
        Ok(SessionView::new(&self.path, &state.session, state.loading))
    }

    /// Whether a coach request is in flight.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is poisoned.
    pub fn is_loading(&self) -> Result<bool, SessionError> {
        Ok(self.lock()?.loading)
    }

    /// Announce the current message to the narrator, e.g. right after opening.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is poisoned.
    pub fn narrate_current(&self) -> Result<(), SessionError> {
        let message = self.lock()?.session.display().ai_message.clone();
        self.narrate(&message);
        Ok(())
    }

    /// Submit a learner answer to the coach.
    ///
    /// Blank answers are ignored, and so are answers submitted while another
    /// request is in flight.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is poisoned. Coach
    /// and storage failures are reported through `Outcome` and logs instead.
    pub async fn submit(&self, answer: &str) -> Result<Outcome, SessionError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(Outcome::Ignored);
        }
        self.exchange(answer, Exchange::Answer).await
    }

    /// Show the next coach turn.
    ///
    /// Moves locally when one exists. At the end of the log this asks the
    /// coach for a new question instead, unless the session is complete.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is poisoned.
    pub async fn advance(&self) -> Result<Outcome, SessionError> {
        let moved = {
            let mut state = self.lock()?;
            if state.closed {
                return Ok(Outcome::Discarded);
            }
            match state.session.advance() {
                Advance::Moved(position) => {
                    Some((position, state.session.display().ai_message.clone()))
                }
                Advance::EndOfLog if state.session.is_completed() => {
                    return Ok(Outcome::Ignored);
                }
                Advance::EndOfLog => None,
            }
        };

        match moved {
            Some((position, message)) => {
                self.persist().await?;
                self.narrate(&message);
                Ok(Outcome::Moved(position))
            }
            None => self.exchange(NAVIGATION_ANSWER, Exchange::Synthetic).await,
        }
    }

    /// Show the previous coach turn. Never contacts the coach.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the state lock is poisoned.
    pub async fn retreat(&self) -> Result<Outcome, SessionError> {
        let (position, message) = {
            let mut state = self.lock()?;
            if state.closed {
                return Ok(Outcome::Discarded);
            }
            let Some(position) = state.session.retreat() else {
                return Ok(Outcome::Ignored);
            };
            (position, state.session.display().ai_message.clone())
        };

        self.persist().await?;
        self.narrate(&message);
        Ok(Outcome::Moved(position))
    }

    /// Abandon the session view.
    ///
    /// Stops narration and invalidates any in-flight request: its reply will
    /// be dropped when it arrives. The request itself is not cancelled.
    pub fn close(&self) {
        match self.state.lock() {
            Ok(mut state) => {
                state.closed = true;
                state.loading = false;
                state.generation = state.generation.wrapping_add(1);
            }
            Err(_) => tracing::warn!("closing session with poisoned state"),
        }
        if let Some(narrator) = &self.narrator {
            narrator.stop();
        }
    }

    async fn exchange(&self, message: &str, kind: Exchange) -> Result<Outcome, SessionError> {
        let (request, generation) = {
            let mut state = self.lock()?;
            if state.closed {
                return Ok(Outcome::Discarded);
            }
            if state.loading {
                tracing::debug!(path = %self.path.id, "coach request in flight, dropping submission");
                return Ok(Outcome::Busy);
            }
            state.loading = true;
            let conversation = state.session.conversation();
            let request = CoachRequest::new(
                message,
                self.path.title.clone(),
                conversation.window(self.settings.max_window()),
                state.session.is_first_response(),
            );
            (request, state.generation)
        };

        tracing::debug!(
            path = %self.path.id,
            synthetic = kind == Exchange::Synthetic,
            window = request.context.conversation.len(),
            "sending coach request"
        );
        let result = self.coach.send(&request).await;

        let (outcome, message) = {
            let mut state = self.lock()?;
            if state.generation != generation {
                tracing::info!(path = %self.path.id, "session closed, discarding late coach reply");
                return Ok(Outcome::Discarded);
            }
            state.loading = false;

            let policy = self.settings.progress_policy();
            let outcome = match result {
                Ok(reply) => {
                    let turns = self.turns_for(&request, reply, kind);
                    state.session.extend(turns, &policy);
                    Outcome::Appended
                }
                Err(err) => {
                    tracing::warn!(path = %self.path.id, error = %err, "coach request failed");
                    state.session.show_error();
                    Outcome::Failed
                }
            };
            (outcome, state.session.display().ai_message.clone())
        };

        self.persist().await?;
        self.narrate(&message);
        Ok(outcome)
    }

    fn turns_for(&self, request: &CoachRequest, reply: CoachReply, kind: Exchange) -> Vec<Turn> {
        match kind {
            Exchange::Synthetic => vec![reply.into_turn().into_simulated()],
            Exchange::Answer => {
                let score = self.answer_score(request, reply.score);
                vec![Turn::user(request.message.clone(), score), reply.into_turn()]
            }
        }
    }

    /// First answers are never scored; the navigation no-op always scores 0;
    /// otherwise the coach's score, or the configured fallback if it sent none.
    fn answer_score(&self, request: &CoachRequest, reported: Option<f64>) -> Option<Score> {
        if request.is_first_response {
            return None;
        }
        if is_navigation_answer(&request.message) {
            return Some(Score::ZERO);
        }
        Some(
            reported
                .and_then(Score::from_reported)
                .unwrap_or_else(|| self.settings.fallback_score()),
        )
    }

    async fn persist(&self) -> Result<(), SessionError> {
        if !self.persistent {
            return Ok(());
        }
        let _gate = self.save_gate.lock().await;
        let record = SessionRecord::from_session(&self.lock()?.session);
        let key = self.path.session_key();
        if let Err(err) = self.store.save(&key, &record).await {
            tracing::warn!(key = %key, error = %err, "session not persisted, continuing in memory");
        }
        Ok(())
    }

    fn narrate(&self, text: &str) {
        if let Some(narrator) = &self.narrator {
            narrator.narrate(text);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, SessionError> {
        self.state.lock().map_err(|_| SessionError::Poisoned)
    }
}

impl fmt::Debug for CoachSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoachSession")
            .field("path", &self.path.id)
            .field("settings", &self.settings)
            .field("narrated", &self.narrator.is_some())
            .field("persistent", &self.persistent)
            .finish_non_exhaustive()
    }
}
