use std::env;

use tutor_core::model::{SessionSettings, SessionSettingsDraft, SettingsError};

/// Build a settings draft from `TUTOR_*` environment variables.
///
/// Unparsable numeric values are ignored (the default applies) and reported
/// at `warn` level.
#[must_use]
pub fn draft_from_env() -> SessionSettingsDraft {
    draft_from_lookup(|name| env::var(name).ok())
}

/// Load and validate settings from the environment.
///
/// # Errors
///
/// Returns `SettingsError` if the resulting settings are invalid.
pub fn settings_from_env() -> Result<SessionSettings, SettingsError> {
    draft_from_env().validate()
}

/// Same as [`draft_from_env`] but with an injectable variable lookup.
pub fn draft_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SessionSettingsDraft {
    SessionSettingsDraft {
        base_url: lookup("TUTOR_BASE_URL"),
        max_window: parsed(&lookup, "TUTOR_MAX_WINDOW"),
        progress_policy: lookup("TUTOR_PROGRESS_POLICY"),
        total_questions: parsed(&lookup, "TUTOR_TOTAL_QUESTIONS"),
        count_simulated: lookup("TUTOR_COUNT_SIMULATED").and_then(|raw| parse_flag(&raw)),
        fallback_score: parsed(&lookup, "TUTOR_FALLBACK_SCORE"),
        seed_turns: parsed(&lookup, "TUTOR_SEED_TURNS"),
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
