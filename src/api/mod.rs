//! Remote API boundary.
//!
//! The player talks to the remote store through two traits so that the HTTP
//! implementation can be swapped for doubles that simulate latency and failure.
//! Real implementation: [`HttpApi`].

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::ritual::{RitualDefinition, RitualSummary};

pub use http::HttpApi;

/// Opaque handle for a server-side playback session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional feedback attached to a completed session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CompletionFeedback {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn new(rating: Option<u8>, notes: Option<String>) -> Self {
        Self { rating, notes }
    }

    /// Drop out-of-range ratings and blank notes instead of refusing completion.
    pub fn sanitized(mut self) -> Self {
        if let Some(rating) = self.rating
            && !(Self::MIN_RATING..=Self::MAX_RATING).contains(&rating)
        {
            tracing::warn!(rating, "Dropping out-of-range session rating");
            self.rating = None;
        }
        if self.notes.as_deref().is_some_and(|n| n.trim().is_empty()) {
            self.notes = None;
        }
        self
    }
}

/// Read-only access to ritual definitions.
#[async_trait]
pub trait RitualCatalog: Send + Sync {
    async fn list_rituals(&self, category: Option<&str>) -> Result<Vec<RitualSummary>, ApiError>;

    async fn get_ritual(&self, ritual_id: &str) -> Result<RitualDefinition, ApiError>;
}

/// Server-side mirror of playback sessions.
///
/// Every call except `create_session` is issued fire-and-forget by the player;
/// implementations report failure through the returned error only.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, ritual_id: &str) -> Result<SessionId, ApiError>;

    /// Record forward progress. `step_index` is 0-based.
    async fn update_progress(
        &self,
        session: &SessionId,
        step_index: usize,
    ) -> Result<(), ApiError>;

    async fn pause_session(&self, session: &SessionId) -> Result<(), ApiError>;

    async fn resume_session(&self, session: &SessionId) -> Result<(), ApiError>;

    async fn complete_session(
        &self,
        session: &SessionId,
        feedback: &CompletionFeedback,
    ) -> Result<(), ApiError>;

    async fn abandon_session(&self, session: &SessionId) -> Result<(), ApiError>;
}
