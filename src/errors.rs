//! Typed error hierarchy for the ritual player.
//!
//! Three top-level enums cover the three boundaries:
//! - `ApiError`: remote API transport, status and decode failures
//! - `PlayerError`: failures that prevent playback from starting
//! - `TransitionRejected`: intents whose preconditions do not hold

use thiserror::Error;

/// Errors from the remote API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ritual {id} not found")]
    RitualNotFound { id: String },

    #[error("Request to {endpoint} timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },
}

/// Errors that keep a ritual from entering playback.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Failed to load ritual {ritual_id}: {source}")]
    DefinitionFetch {
        ritual_id: String,
        #[source]
        source: ApiError,
    },

    #[error("Ritual {ritual_id} has an invalid definition: {reason}")]
    InvalidDefinition { ritual_id: String, reason: String },
}

/// An intent was refused because its precondition does not hold.
///
/// Rejections never change playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionRejected {
    #[error("No ritual is loaded")]
    NotStarted,

    #[error("Playback has already finished")]
    Terminal,

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Step {current} of {total} is not the last step")]
    NotAtLastStep { current: usize, total: usize },
}
