//! Playback state tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::SessionId;

/// Lifecycle of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// No ritual loaded
    #[default]
    Idle,
    /// Fetching the ritual definition
    Loading,
    /// Definition loaded, opening the remote session
    Ready,
    /// Step clock running
    Playing,
    /// Step clock suspended
    Paused,
    /// Last step finished by the user
    Completed,
    /// Left before the last step
    Abandoned,
    /// Definition could not be loaded
    Failed,
}

impl PlayerState {
    /// Check if playback has finished for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }

    /// Check if the player accepts navigation intents.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlayerState::Idle => "idle",
            PlayerState::Loading => "loading",
            PlayerState::Ready => "ready",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Completed => "completed",
            PlayerState::Abandoned => "abandoned",
            PlayerState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Local record of one playback attempt. Owned by the sequencer alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    /// Local id used to correlate log lines
    pub playback_id: Uuid,
    pub ritual_id: String,
    /// Remote handle; `None` when session creation failed
    pub session_id: Option<SessionId>,
    /// 0-based index into the ritual's steps
    pub current_step_index: usize,
    pub is_paused: bool,
    /// Seconds spent on the current step
    pub elapsed_seconds: u64,
    pub voice_enabled: bool,
    pub started_at: DateTime<Utc>,
}

impl PlaybackSession {
    pub fn new(ritual_id: &str, session_id: Option<SessionId>, voice_enabled: bool) -> Self {
        Self {
            playback_id: Uuid::new_v4(),
            ritual_id: ritual_id.to_string(),
            session_id,
            current_step_index: 0,
            is_paused: false,
            elapsed_seconds: 0,
            voice_enabled,
            started_at: Utc::now(),
        }
    }

    /// Move focus to another step and restart its elapsed time.
    pub fn focus_step(&mut self, index: usize) {
        self.current_step_index = index;
        self.elapsed_seconds = 0;
    }

    /// Whether the remote store mirrors this playback.
    pub fn is_mirrored(&self) -> bool {
        self.session_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_state_terminal() {
        assert!(PlayerState::Completed.is_terminal());
        assert!(PlayerState::Abandoned.is_terminal());
        assert!(!PlayerState::Paused.is_terminal());
        assert!(!PlayerState::Failed.is_terminal());
    }

    #[test]
    fn test_player_state_active() {
        assert!(PlayerState::Playing.is_active());
        assert!(PlayerState::Paused.is_active());
        assert!(!PlayerState::Ready.is_active());
        assert!(!PlayerState::Completed.is_active());
    }

    #[test]
    fn test_player_state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&PlayerState::Abandoned).unwrap(),
            "\"abandoned\""
        );
        assert_eq!(PlayerState::Playing.to_string(), "playing");
    }

    #[test]
    fn test_new_session_starts_at_first_step() {
        let session = PlaybackSession::new("puja", None, true);
        assert_eq!(session.current_step_index, 0);
        assert_eq!(session.elapsed_seconds, 0);
        assert!(!session.is_paused);
        assert!(!session.is_mirrored());
    }

    #[test]
    fn test_focus_step_resets_elapsed() {
        let mut session = PlaybackSession::new("puja", Some(SessionId::new("s")), true);
        session.elapsed_seconds = 17;
        session.focus_step(2);
        assert_eq!(session.current_step_index, 2);
        assert_eq!(session.elapsed_seconds, 0);
        assert!(session.is_mirrored());
    }
}
