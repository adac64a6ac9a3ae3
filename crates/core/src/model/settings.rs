use thiserror::Error;
use url::Url;

use crate::model::Score;
use crate::progress::ProgressPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_MAX_WINDOW: usize = 20;
pub const DEFAULT_TOTAL_QUESTIONS: u32 = 20;
pub const DEFAULT_FALLBACK_SCORE: u8 = 5;
pub const DEFAULT_SEED_TURNS: usize = 1;

/// Validated engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    base_url: Url,
    max_window: usize,
    progress_policy: ProgressPolicy,
    fallback_score: Score,
    seed_turns: usize,
}

/// Unvalidated configuration, typically assembled from env vars or flags.
#[derive(Clone, Debug, Default)]
pub struct SessionSettingsDraft {
    pub base_url: Option<String>,
    pub max_window: Option<usize>,
    pub progress_policy: Option<String>,
    pub total_questions: Option<u32>,
    pub count_simulated: Option<bool>,
    pub fallback_score: Option<u8>,
    pub seed_turns: Option<usize>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("conversation window must be at least 1")]
    EmptyWindow,
    #[error("total questions must be at least 1")]
    NoQuestions,
    #[error("fallback score must be within 0..=10, got {0}")]
    FallbackScore(u8),
    #[error("unknown progress policy: {0}")]
    UnknownPolicy(String),
}

impl SessionSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for an unparsable base URL, a zero window or
    /// question target, an out-of-range fallback score, or an unknown policy.
    pub fn validate(self) -> Result<SessionSettings, SettingsError> {
        let raw_url = normalize_optional(self.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let base_url = Url::parse(&raw_url).map_err(|_| SettingsError::InvalidBaseUrl(raw_url))?;

        let max_window = self.max_window.unwrap_or(DEFAULT_MAX_WINDOW);
        if max_window == 0 {
            return Err(SettingsError::EmptyWindow);
        }

        let fallback = self.fallback_score.unwrap_or(DEFAULT_FALLBACK_SCORE);
        let fallback_score =
            Score::new(fallback).map_err(|_| SettingsError::FallbackScore(fallback))?;

        let policy_name = normalize_optional(self.progress_policy)
            .map(|name| name.to_ascii_lowercase())
            .unwrap_or_else(|| "score-average".into());
        let progress_policy = match policy_name.as_str() {
            "score-average" | "average" => ProgressPolicy::ScoreAverage,
            "count" | "count-based" => {
                let total_questions = self.total_questions.unwrap_or(DEFAULT_TOTAL_QUESTIONS);
                if total_questions == 0 {
                    return Err(SettingsError::NoQuestions);
                }
                ProgressPolicy::Count {
                    total_questions,
                    include_simulated: self.count_simulated.unwrap_or(false),
                }
            }
            _ => return Err(SettingsError::UnknownPolicy(policy_name)),
        };

        Ok(SessionSettings {
            base_url,
            max_window,
            progress_policy,
            fallback_score,
            seed_turns: self.seed_turns.unwrap_or(DEFAULT_SEED_TURNS),
        })
    }
}

impl SessionSettings {
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn max_window(&self) -> usize {
        self.max_window
    }

    #[must_use]
    pub fn progress_policy(&self) -> ProgressPolicy {
        self.progress_policy
    }

    #[must_use]
    pub fn fallback_score(&self) -> Score {
        self.fallback_score
    }

    #[must_use]
    pub fn seed_turns(&self) -> usize {
        self.seed_turns
    }

    #[must_use]
    pub fn with_progress_policy(mut self, policy: ProgressPolicy) -> Self {
        self.progress_policy = policy;
        self
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            max_window: DEFAULT_MAX_WINDOW,
            progress_policy: ProgressPolicy::default(),
            fallback_score: Score::new(DEFAULT_FALLBACK_SCORE).expect("default score in range"),
            seed_turns: DEFAULT_SEED_TURNS,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_uses_defaults() {
        let settings = SessionSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.max_window(), 20);
    }

    #[test]
    fn count_policy_reads_target() {
        let settings = SessionSettingsDraft {
            progress_policy: Some(" Count ".into()),
            total_questions: Some(40),
            count_simulated: Some(true),
            ..SessionSettingsDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(
            settings.progress_policy(),
            ProgressPolicy::Count {
                total_questions: 40,
                include_simulated: true
            }
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let bad_url = SessionSettingsDraft {
            base_url: Some("not a url".into()),
            ..SessionSettingsDraft::default()
        };
        assert!(matches!(
            bad_url.validate(),
            Err(SettingsError::InvalidBaseUrl(_))
        ));

        let zero_window = SessionSettingsDraft {
            max_window: Some(0),
            ..SessionSettingsDraft::default()
        };
        assert_eq!(zero_window.validate(), Err(SettingsError::EmptyWindow));

        let zero_target = SessionSettingsDraft {
            progress_policy: Some("count".into()),
            total_questions: Some(0),
            ..SessionSettingsDraft::default()
        };
        assert_eq!(zero_target.validate(), Err(SettingsError::NoQuestions));

        let bad_score = SessionSettingsDraft {
            fallback_score: Some(11),
            ..SessionSettingsDraft::default()
        };
        assert_eq!(bad_score.validate(), Err(SettingsError::FallbackScore(11)));

        let bad_policy = SessionSettingsDraft {
            progress_policy: Some("vibes".into()),
            ..SessionSettingsDraft::default()
        };
        assert_eq!(
            bad_policy.validate(),
            Err(SettingsError::UnknownPolicy("vibes".into()))
        );
    }
}
