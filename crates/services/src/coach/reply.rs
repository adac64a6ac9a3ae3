use serde_json::{Map, Value};

use super::CoachReply;
use crate::error::CoachError;

/// Reply text used when the service sends none.
pub const FALLBACK_REPLY: &str = "Next question...";

/// Decode a `/design_chat` response body.
///
/// The body is normally an object with `reply`, `code`, `hint`, `score` and
/// `feedback`. Some deployments put the whole structured reply, JSON-encoded
/// and possibly wrapped in a code fence, inside `reply`; that inner object
/// wins over the outer fields. Anything that cannot be decoded is treated as
/// plain reply text.
///
/// # Errors
///
/// Returns `CoachError::Service` when the body is an `{"error": ...}` object
/// without a reply.
pub fn decode_reply(body: &str) -> Result<CoachReply, CoachError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        tracing::debug!("coach reply is not JSON, using raw body as text");
        return Ok(plain_or_fallback(body));
    };

    match value {
        Value::Object(map) => {
            if let Some(message) = service_error(&map) {
                return Err(CoachError::Service(message));
            }
            Ok(Fields::from_map(&map).into_reply())
        }
        Value::String(text) => Ok(Fields::default().with_reply_text(&text).into_reply()),
        _ => Ok(plain_or_fallback(body)),
    }
}

fn plain_or_fallback(text: &str) -> CoachReply {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        CoachReply::plain(FALLBACK_REPLY)
    } else {
        CoachReply::plain(trimmed)
    }
}

fn service_error(map: &Map<String, Value>) -> Option<String> {
    let has_reply = map.get("reply").is_some_and(|reply| !reply.is_null());
    if has_reply {
        return None;
    }
    map.get("error").map(|err| match err {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}

#[derive(Debug, Default)]
struct Fields {
    reply: Option<String>,
    code: Option<String>,
    hint: Option<String>,
    score: Option<f64>,
    feedback: Option<String>,
}

impl Fields {
    fn from_map(map: &Map<String, Value>) -> Self {
        let outer = Self {
            reply: None,
            code: text_field(map, "code"),
            hint: text_field(map, "hint"),
            score: score_field(map),
            feedback: text_field(map, "feedback"),
        };
        match map.get("reply") {
            Some(Value::String(text)) => outer.with_reply_text(text),
            Some(Value::Object(inner)) => Self::from_map(inner).or(outer),
            Some(Value::Null) | None => outer,
            Some(other) => Self {
                reply: Some(other.to_string()),
                ..outer
            },
        }
    }

    /// Interpret `text` as an embedded structured reply, or as plain text.
    fn with_reply_text(self, text: &str) -> Self {
        match embedded_object(text) {
            Some(inner) => Self::from_map(&inner).or(self),
            None => Self {
                reply: Some(text.trim().to_string()),
                ..self
            },
        }
    }

    /// Fill fields missing from `self` with those from `fallback`.
    fn or(self, fallback: Self) -> Self {
        Self {
            reply: self.reply.or(fallback.reply),
            code: self.code.or(fallback.code),
            hint: self.hint.or(fallback.hint),
            score: self.score.or(fallback.score),
            feedback: self.feedback.or(fallback.feedback),
        }
    }

    fn into_reply(self) -> CoachReply {
        let reply = self
            .reply
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());
        CoachReply {
            reply,
            code: self.code,
            hint: self.hint,
            score: self.score,
            feedback: self.feedback,
        }
    }
}

fn embedded_object(text: &str) -> Option<Map<String, Value>> {
    let unfenced = strip_code_fence(text.trim());
    if !unfenced.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Value>(unfenced) {
        Ok(Value::Object(map)) if map.contains_key("reply") => Some(map),
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn text_field(map: &Map<String, Value>, name: &str) -> Option<String> {
    map.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn score_field(map: &Map<String, Value>) -> Option<f64> {
    match map.get("score")? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
