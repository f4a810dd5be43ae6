//! Spoken narration for playback.
//!
//! [`SpeechSynth`] is the environment's speech capability. [`NarrationChannel`]
//! wraps one synthesizer per playback session and enforces two rules:
//! at most one utterance is in flight, and a disabled channel is silent.
//!
//! Synthesizers:
//! - [`CommandSynth`]: runs an external TTS program per utterance
//! - [`LogSynth`]: writes utterances to the log only

pub mod command;
pub mod script;

use serde::{Deserialize, Serialize};

pub use command::CommandSynth;

/// Speech capability provided by the environment.
///
/// Both methods must return promptly; `cancel` must silence output before it
/// returns.
pub trait SpeechSynth: Send {
    fn speak(&mut self, text: &str);

    fn cancel(&mut self);
}

/// How much of each step is spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationDetail {
    /// Step number and title only
    #[default]
    Title,
    /// Title, instruction and mantra transliteration
    Full,
}

impl std::fmt::Display for NarrationDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NarrationDetail::Title => write!(f, "title"),
            NarrationDetail::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for NarrationDetail {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(NarrationDetail::Title),
            "full" => Ok(NarrationDetail::Full),
            _ => anyhow::bail!("Invalid narration detail '{}'. Valid values: title, full", s),
        }
    }
}

/// Synthesizer that only logs what would have been spoken.
#[derive(Debug, Default)]
pub struct LogSynth;

impl SpeechSynth for LogSynth {
    fn speak(&mut self, text: &str) {
        tracing::info!(target: "narration", text, "speak");
    }

    fn cancel(&mut self) {
        tracing::debug!(target: "narration", "cancel");
    }
}

/// Single-utterance narration gate owned by one playback session.
pub struct NarrationChannel {
    synth: Box<dyn SpeechSynth>,
    enabled: bool,
    detail: NarrationDetail,
}

impl NarrationChannel {
    pub fn new(synth: Box<dyn SpeechSynth>, enabled: bool, detail: NarrationDetail) -> Self {
        Self {
            synth,
            enabled,
            detail,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn detail(&self) -> NarrationDetail {
        self.detail
    }

    /// Replace whatever is playing with `text`.
    ///
    /// Returns `false` when the channel is disabled and nothing was spoken.
    pub fn speak(&mut self, text: &str) -> bool {
        if !self.enabled {
            return false;
        }
        self.synth.cancel();
        self.synth.speak(text);
        true
    }

    pub fn cancel(&mut self) {
        self.synth.cancel();
    }

    /// Turning the channel off silences it immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.synth.cancel();
        }
    }
}

impl Drop for NarrationChannel {
    fn drop(&mut self) {
        self.synth.cancel();
    }
}
