use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{CompletionFeedback, RitualCatalog, SessionId, SessionStore};
use crate::errors::ApiError;
use crate::ritual::{RitualDefinition, RitualSummary};

const USER_AGENT: &str = concat!("ritual-player/", env!("CARGO_PKG_VERSION"));

/// Body returned by `POST /rituals/{id}/sessions`.
#[derive(Debug, Deserialize)]
struct CreatedSession {
    #[serde(alias = "id")]
    session_id: SessionId,
}

/// JSON-over-HTTP client for the ritual catalog and session store.
///
/// The bearer token comes from the caller; this client never refreshes or
/// inspects it.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            anyhow::bail!(
                "API base URL must start with http:// or https:// (got '{}')",
                trimmed
            );
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("Invalid API base URL '{}'", trimmed))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url.clone())
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, url: &Url, builder: RequestBuilder) -> Result<Response, ApiError> {
        let endpoint = url.path();
        let resp = builder.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, ApiError> {
        resp.json::<T>().await.map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn post_empty(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments);
        self.send(&url, self.request(Method::POST, &url)).await?;
        Ok(())
    }
}

#[async_trait]
impl RitualCatalog for HttpApi {
    async fn list_rituals(&self, category: Option<&str>) -> Result<Vec<RitualSummary>, ApiError> {
        let url = self.endpoint(&["rituals"]);
        let mut builder = self.request(Method::GET, &url);
        if let Some(category) = category {
            builder = builder.query(&[("category", category)]);
        }
        let resp = self.send(&url, builder).await?;
        Self::decode(url.path(), resp).await
    }

    async fn get_ritual(&self, ritual_id: &str) -> Result<RitualDefinition, ApiError> {
        let url = self.endpoint(&["rituals", ritual_id]);
        let resp = match self.send(&url, self.request(Method::GET, &url)).await
        {
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(ApiError::RitualNotFound {
                    id: ritual_id.to_string(),
                });
            }
            other => other?,
        };
        Self::decode(url.path(), resp).await
    }
}

#[async_trait]
impl SessionStore for HttpApi {
    async fn create_session(&self, ritual_id: &str) -> Result<SessionId, ApiError> {
        let url = self.endpoint(&["rituals", ritual_id, "sessions"]);
        let resp = self.send(&url, self.request(Method::POST, &url)).await?;
        let created: CreatedSession = Self::decode(url.path(), resp).await?;
        Ok(created.session_id)
    }

    async fn update_progress(
        &self,
        session: &SessionId,
        step_index: usize,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["sessions", session.as_str(), "progress"]);
        let builder = self
            .request(Method::PATCH, &url)
            .json(&serde_json::json!({ "current_step": step_index }));
        self.send(&url, builder).await?;
        Ok(())
    }

    async fn pause_session(&self, session: &SessionId) -> Result<(), ApiError> {
        self.post_empty(&["sessions", session.as_str(), "pause"]).await
    }

    async fn resume_session(&self, session: &SessionId) -> Result<(), ApiError> {
        self.post_empty(&["sessions", session.as_str(), "resume"]).await
    }

    async fn complete_session(
        &self,
        session: &SessionId,
        feedback: &CompletionFeedback,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["sessions", session.as_str(), "complete"]);
        let builder = self.request(Method::POST, &url).json(feedback);
        self.send(&url, builder).await?;
        Ok(())
    }

    async fn abandon_session(&self, session: &SessionId) -> Result<(), ApiError> {
        self.post_empty(&["sessions", session.as_str(), "abandon"]).await
    }
}
