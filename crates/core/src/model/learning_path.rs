use serde::{Deserialize, Serialize};

use crate::model::{PathId, SessionKey};

/// A course the learner can be coached through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPath {
    #[serde(rename = "_id")]
    pub id: PathId,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl LearningPath {
    #[must_use]
    pub fn session_key(&self) -> SessionKey {
        SessionKey::for_path(&self.id)
    }

    /// Greeting shown before the coach has asked anything.
    #[must_use]
    pub fn welcome_text(&self) -> String {
        format!("Welcome to {}!", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_document() {
        let path: LearningPath = serde_json::from_str(
            r#"{"_id":"65f0","title":"System Design","image":"https://x/logo.png","description":"Scale things","extra":1}"#,
        )
        .unwrap();
        assert_eq!(path.id, PathId::new("65f0"));
        assert_eq!(path.session_key().as_str(), "chat_65f0");
        assert_eq!(path.welcome_text(), "Welcome to System Design!");
    }

    #[test]
    fn image_and_description_are_optional() {
        let path: LearningPath = serde_json::from_str(r#"{"_id":"1","title":"Rust"}"#).unwrap();
        assert_eq!(path.image, None);
        assert_eq!(path.description, None);
    }
}
