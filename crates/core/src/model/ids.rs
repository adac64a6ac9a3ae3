use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of every persisted session key.
pub const SESSION_KEY_PREFIX: &str = "chat_";

/// Identity of a learning path as issued by the coach backend (`_id`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(String);

impl PathId {
    /// Creates a new `PathId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Durable storage slot for one learning path's session (`"chat_" + path id`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    /// Builds the key for the given learning path.
    #[must_use]
    pub fn for_path(path: &PathId) -> Self {
        Self(format!("{SESSION_KEY_PREFIX}{}", path.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathId({})", self.0)
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for PathId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(ParseIdError {
                kind: "PathId",
                raw: s.to_string(),
            });
        }
        Ok(PathId::new(trimmed))
    }
}

impl FromStr for SessionKey {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdError {
            kind: "SessionKey",
            raw: s.to_string(),
        };
        let rest = s.strip_prefix(SESSION_KEY_PREFIX).ok_or_else(err)?;
        let path: PathId = rest.parse().map_err(|_| err())?;
        Ok(SessionKey::for_path(&path))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_uses_chat_prefix() {
        let key = SessionKey::for_path(&PathId::new("65f0c1"));
        assert_eq!(key.as_str(), "chat_65f0c1");
        assert_eq!(key.to_string(), "chat_65f0c1");
    }

    #[test]
    fn session_key_from_str() {
        let key: SessionKey = "chat_42".parse().unwrap();
        assert_eq!(key, SessionKey::for_path(&PathId::new("42")));
    }

    #[test]
    fn session_key_from_str_requires_prefix() {
        assert!("42".parse::<SessionKey>().is_err());
        assert!("chat_".parse::<SessionKey>().is_err());
    }

    #[test]
    fn path_id_rejects_blank_and_slashes() {
        assert!("   ".parse::<PathId>().is_err());
        assert!("a/b".parse::<PathId>().is_err());
        assert_eq!(" 7 ".parse::<PathId>().unwrap(), PathId::new("7"));
    }
}
