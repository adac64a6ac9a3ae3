use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("score out of range 0..=10: {0}")]
    OutOfRange(u8),
}

//
// ─── SCORE ────────────────────────────────────────────────────────────────────
//

/// Per-answer grade attached to a user turn, in `0..=10`.
///
/// Absence of a score (`Option<Score>::None`) means "unscored" and is never
/// the same thing as `Score::ZERO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 10;
    pub const ZERO: Score = Score(0);

    /// Creates a score.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` when `value` exceeds 10.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if value > Self::MAX {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Normalizes a score reported by the coach service.
    ///
    /// Fractional values are rounded and anything outside the range is
    /// clipped. Returns `None` for non-finite input.
    #[must_use]
    pub fn from_reported(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let clipped = value.round().clamp(0.0, f64::from(Self::MAX));
        // clipped is an integer in 0..=10, the cast is exact
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Self(clipped as u8))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_values_above_ten() {
        assert_eq!(Score::new(11), Err(ScoreError::OutOfRange(11)));
        assert_eq!(Score::new(10).unwrap().value(), 10);
    }

    #[test]
    fn reported_scores_are_rounded_and_clipped() {
        assert_eq!(Score::from_reported(7.6), Some(Score::new(8).unwrap()));
        assert_eq!(Score::from_reported(-3.0), Some(Score::ZERO));
        assert_eq!(Score::from_reported(42.0), Some(Score::new(10).unwrap()));
        assert_eq!(Score::from_reported(f64::NAN), None);
    }

    #[test]
    fn deserialization_validates_range() {
        let ok: Score = serde_json::from_str("9").unwrap();
        assert_eq!(ok.value(), 9);
        assert!(serde_json::from_str::<Score>("12").is_err());
    }
}
