use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tutor_core::model::{LearningPath, PathId};

use super::{CoachApi, CoachReply, CoachRequest, decode_reply};
use crate::error::{CoachError, LearningPathError};
use crate::learning_paths::LearningPathApi;

/// HTTP client for the coach backend (chat and learning-path endpoints).
#[derive(Clone, Debug)]
pub struct HttpCoachClient {
    client: Client,
    base_url: String,
}

impl HttpCoachClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl CoachApi for HttpCoachClient {
    async fn send(&self, request: &CoachRequest) -> Result<CoachReply, CoachError> {
        let response = self
            .client
            .post(self.endpoint("design_chat"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CoachError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        decode_reply(&body)
    }
}

#[async_trait]
impl LearningPathApi for HttpCoachClient {
    async fn get_path(&self, id: &PathId) -> Result<LearningPath, LearningPathError> {
        let response = self
            .client
            .get(self.endpoint(&format!("learning-paths/{id}")))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(LearningPathError::NotFound(id.clone())),
            status if !status.is_success() => Err(LearningPathError::HttpStatus(status)),
            _ => Ok(response.json().await?),
        }
    }

    async fn list_paths(&self) -> Result<Vec<LearningPath>, LearningPathError> {
        let response = self
            .client
            .get(self.endpoint("learning-paths"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LearningPathError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_tolerate_trailing_slashes() {
        let client = HttpCoachClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.endpoint("/design_chat"),
            "http://localhost:8000/design_chat"
        );
    }
}
