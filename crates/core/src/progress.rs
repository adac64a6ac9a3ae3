use serde::{Deserialize, Serialize};

use crate::model::{Sender, Turn};

//
// ─── PROGRESS VALUE ────────────────────────────────────────────────────────────
//

/// Raw progress as computed by a policy.
///
/// The raw value may exceed 100 (e.g. more scored answers than the configured
/// question target). It is stored unclamped so recomputation stays idempotent,
/// and clamped only when read through [`Progress::percent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Progress(u32);

impl Progress {
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Display value in `0..=100`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn percent(self) -> u8 {
        self.0.min(100) as u8
    }

    #[must_use]
    pub fn is_full(self) -> bool {
        self.percent() == 100
    }
}

//
// ─── SCORER CONTRACT ───────────────────────────────────────────────────────────
//

/// A pure aggregation of a transcript into a progress value.
pub trait ProgressScorer {
    fn score(&self, turns: &[Turn]) -> Progress;
}

//
// ─── SCORE-AVERAGE POLICY ──────────────────────────────────────────────────────
//

/// Average answer quality over every real (non-simulated) coach question.
///
/// Each non-simulated system turn is paired with the user turn immediately
/// following it. Paired scores are summed (unscored answers contribute
/// nothing) and divided by the number of *all* non-simulated system turns,
/// then scaled from the 0–10 score range to 0–100.
///
/// # Examples
///
/// ```
/// # use tutor_core::model::{Score, Turn};
/// # use tutor_core::progress::{ProgressScorer, ScoreAverage};
/// let turns = vec![
///     Turn::system("Q1"),
///     Turn::user("A1", Some(Score::new(8)?)),
///     Turn::system("Q2"),
///     Turn::user("A2", Some(Score::new(4)?)),
///     Turn::system("Q3"),
/// ];
/// assert_eq!(ScoreAverage.score(&turns).percent(), 40);
/// # Ok::<(), tutor_core::model::ScoreError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreAverage;

impl ProgressScorer for ScoreAverage {
    fn score(&self, turns: &[Turn]) -> Progress {
        let mut questions = 0_u32;
        let mut total = 0_u32;

        for (index, turn) in turns.iter().enumerate() {
            if !turn.is_system() || turn.is_simulated() {
                continue;
            }
            questions = questions.saturating_add(1);
            let paired = turns
                .get(index + 1)
                .filter(|next| next.sender() == Sender::User)
                .and_then(Turn::score);
            if let Some(score) = paired {
                total = total.saturating_add(u32::from(score.value()));
            }
        }

        if questions == 0 {
            return Progress::default();
        }
        Progress(rounded_ratio(total.saturating_mul(10), questions))
    }
}

//
// ─── COUNT-BASED POLICY ────────────────────────────────────────────────────────
//

/// Share of a fixed question target that has been answered with a score.
///
/// `include_simulated` additionally counts synthesized coach turns as
/// progressed questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBased {
    pub total_questions: u32,
    pub include_simulated: bool,
}

impl ProgressScorer for CountBased {
    fn score(&self, turns: &[Turn]) -> Progress {
        if self.total_questions == 0 {
            return Progress::default();
        }
        let counted = turns
            .iter()
            .filter(|turn| {
                turn.score().is_some() || (self.include_simulated && turn.is_simulated())
            })
            .count();
        let counted = u32::try_from(counted).unwrap_or(u32::MAX);
        Progress(rounded_ratio(counted.saturating_mul(100), self.total_questions))
    }
}

//
// ─── POLICY SELECTION ──────────────────────────────────────────────────────────
//

/// Configured aggregation strategy.
///
/// Both formulas are legitimate readings of the tutoring flow; deployments
/// choose one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum ProgressPolicy {
    ScoreAverage,
    Count {
        total_questions: u32,
        #[serde(default)]
        include_simulated: bool,
    },
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self::ScoreAverage
    }
}

impl ProgressScorer for ProgressPolicy {
    fn score(&self, turns: &[Turn]) -> Progress {
        match *self {
            ProgressPolicy::ScoreAverage => ScoreAverage.score(turns),
            ProgressPolicy::Count {
                total_questions,
                include_simulated,
            } => CountBased {
                total_questions,
                include_simulated,
            }
            .score(turns),
        }
    }
}

/// `round(numerator / denominator)` with halves rounded up.
fn rounded_ratio(numerator: u32, denominator: u32) -> u32 {
    let num = u64::from(numerator);
    let den = u64::from(denominator);
    let rounded = (num * 2 + den) / (den * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
