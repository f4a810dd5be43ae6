//! Configuration for the ritual player.
//!
//! Settings are read from `ritual.toml` (by default under the user's config
//! directory) and layered file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000/api"
//! token = "..."
//! request_timeout_secs = 10
//!
//! [player]
//! tick_interval_ms = 1000
//! completion_delay_secs = 4
//! session_call_timeout_secs = 10
//! session_create_timeout_secs = 5
//! voice_enabled = true
//!
//! [narration]
//! command = "espeak-ng"
//! args = ["-s", "140"]
//! detail = "title"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::narration::NarrationDetail;
use crate::player::SequencerSettings;

pub const CONFIG_FILE_NAME: &str = "ritual.toml";

pub const ENV_API_URL: &str = "RITUAL_API_URL";
pub const ENV_API_TOKEN: &str = "RITUAL_API_TOKEN";
pub const ENV_TTS_CMD: &str = "RITUAL_TTS_CMD";

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token; requests are unauthenticated without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Playback timing and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSection {
    /// Step clock period
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// How long the completed screen stays before returning to the list
    #[serde(default = "default_completion_delay_secs")]
    pub completion_delay_secs: u64,
    /// Upper bound for each fire-and-forget session call
    #[serde(default = "default_session_call_timeout_secs")]
    pub session_call_timeout_secs: u64,
    /// Upper bound for waiting on session creation at start
    #[serde(default = "default_session_create_timeout_secs")]
    pub session_create_timeout_secs: u64,
    #[serde(default = "default_voice_enabled")]
    pub voice_enabled: bool,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_completion_delay_secs() -> u64 {
    4
}

fn default_session_call_timeout_secs() -> u64 {
    10
}

fn default_session_create_timeout_secs() -> u64 {
    5
}

fn default_voice_enabled() -> bool {
    true
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            completion_delay_secs: default_completion_delay_secs(),
            session_call_timeout_secs: default_session_call_timeout_secs(),
            session_create_timeout_secs: default_session_create_timeout_secs(),
            voice_enabled: default_voice_enabled(),
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationSection {
    /// TTS program; an empty command logs narration instead of speaking it
    #[serde(default = "default_tts_command")]
    pub command: String,
    /// Arguments placed before the utterance text
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub detail: NarrationDetail,
}

fn default_tts_command() -> String {
    "espeak-ng".to_string()
}

impl Default for NarrationSection {
    fn default() -> Self {
        Self {
            command: default_tts_command(),
            args: Vec::new(),
            detail: NarrationDetail::default(),
        }
    }
}

/// The complete ritual.toml configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RitualToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub player: PlayerSection,
    #[serde(default)]
    pub narration: NarrationSection,
}

impl RitualToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse ritual.toml")
    }

    /// Load from `path`, or defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize ritual.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.api.token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Some(cmd) = lookup(ENV_TTS_CMD) {
            self.narration.command = cmd;
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            warnings.push("api.base_url is empty".to_string());
        } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            warnings.push(format!(
                "api.base_url '{}' should start with http:// or https://",
                base_url
            ));
        }
        if self.api.request_timeout_secs == 0 {
            warnings.push("api.request_timeout_secs is 0; requests would fail immediately".into());
        }
        if self.player.tick_interval_ms == 0 {
            warnings.push("player.tick_interval_ms must be greater than 0".to_string());
        } else if self.player.tick_interval_ms != 1000 {
            warnings.push(format!(
                "player.tick_interval_ms is {}; elapsed seconds will not match wall time",
                self.player.tick_interval_ms
            ));
        }
        if self.player.session_call_timeout_secs == 0 {
            warnings.push("player.session_call_timeout_secs is 0; session calls would never be sent".into());
        }
        if self.narration.command.trim().is_empty() && self.player.voice_enabled {
            warnings.push("narration.command is empty; narration will only be logged".to_string());
        }

        warnings
    }
}

/// Default config location: `<config dir>/ritual-player/ritual.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ritual-player").join(CONFIG_FILE_NAME))
}

/// Overrides taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub no_voice: bool,
}

/// Resolved configuration: ritual.toml with environment and CLI layered on top.
#[derive(Debug, Clone)]
pub struct RitualConfig {
    /// Where the file was (or would be) read from
    pub path: PathBuf,
    pub toml: RitualToml,
}

impl RitualConfig {
    /// Resolve configuration from `path` (or the default location).
    pub fn resolve(path: Option<PathBuf>, overrides: &CliOverrides) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => default_config_path().context("Could not determine config directory")?,
        };
        let mut toml = RitualToml::load_or_default(&path)?;
        toml.apply_env();

        let mut config = Self { path, toml };
        config.apply_cli(overrides);
        Ok(config)
    }

    pub fn apply_cli(&mut self, overrides: &CliOverrides) {
        if let Some(ref url) = overrides.api_url {
            self.toml.api.base_url = url.clone();
        }
        if let Some(ref token) = overrides.token {
            self.toml.api.token = Some(token.clone());
        }
        if overrides.no_voice {
            self.toml.player.voice_enabled = false;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.toml.api.request_timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        // interval() panics on a zero period
        Duration::from_millis(self.toml.player.tick_interval_ms.max(1))
    }

    pub fn session_call_timeout(&self) -> Duration {
        Duration::from_secs(self.toml.player.session_call_timeout_secs)
    }

    pub fn sequencer_settings(&self) -> SequencerSettings {
        SequencerSettings {
            completion_delay: Duration::from_secs(self.toml.player.completion_delay_secs),
            session_create_timeout: Duration::from_secs(
                self.toml.player.session_create_timeout_secs,
            ),
        }
    }

    /// TTS program and its arguments, or `None` when speech is disabled.
    pub fn tts_command(&self) -> Option<(&str, &[String])> {
        let command = self.toml.narration.command.trim();
        if command.is_empty() {
            None
        } else {
            Some((command, &self.toml.narration.args))
        }
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let toml = RitualToml::parse("").unwrap();
        assert_eq!(toml, RitualToml::default());
        assert_eq!(toml.api.base_url, "http://localhost:8000/api");
        assert_eq!(toml.player.tick_interval_ms, 1000);
        assert_eq!(toml.player.completion_delay_secs, 4);
        assert!(toml.player.voice_enabled);
        assert_eq!(toml.narration.command, "espeak-ng");
        assert_eq!(toml.narration.detail, NarrationDetail::Title);
    }

    #[test]
    fn test_parse_sections() {
        let content = r#"
[api]
base_url = "https://rituals.example.com/api"
token = "secret"

[player]
completion_delay_secs = 2
voice_enabled = false

[narration]
command = "say"
args = ["-r", "160"]
detail = "full"
"#;
        let toml = RitualToml::parse(content).unwrap();
        assert_eq!(toml.api.base_url, "https://rituals.example.com/api");
        assert_eq!(toml.api.token.as_deref(), Some("secret"));
        assert_eq!(toml.api.request_timeout_secs, 10);
        assert_eq!(toml.player.completion_delay_secs, 2);
        assert!(!toml.player.voice_enabled);
        assert_eq!(toml.narration.args, vec!["-r", "160"]);
        assert_eq!(toml.narration.detail, NarrationDetail::Full);
    }

    #[test]
    fn test_parse_rejects_bad_detail() {
        let result = RitualToml::parse("[narration]\ndetail = \"shout\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut toml = RitualToml::default();
        toml.api.token = Some("abc".into());
        toml.narration.detail = NarrationDetail::Full;
        toml.save(&path).unwrap();

        assert_eq!(RitualToml::load(&path).unwrap(), toml);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let toml = RitualToml::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(toml, RitualToml::default());
    }

    #[test]
    fn test_load_reports_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[player\nvoice_enabled = ").unwrap();
        let err = RitualToml::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse ritual.toml"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut toml = RitualToml::parse("[api]\nbase_url = \"http://file\"\n").unwrap();
        toml.apply_env_from(env(&[
            (ENV_API_URL, "http://env"),
            (ENV_API_TOKEN, "tok"),
            (ENV_TTS_CMD, ""),
        ]));
        assert_eq!(toml.api.base_url, "http://env");
        assert_eq!(toml.api.token.as_deref(), Some("tok"));
        assert_eq!(toml.narration.command, "");
    }

    #[test]
    fn test_blank_env_url_is_ignored() {
        let mut toml = RitualToml::default();
        toml.apply_env_from(env(&[(ENV_API_URL, "  ")]));
        assert_eq!(toml.api.base_url, default_base_url());
    }

    #[test]
    fn test_cli_overrides_env() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let overrides = CliOverrides {
            api_url: Some("http://cli".into()),
            token: Some("cli-token".into()),
            no_voice: true,
        };
        let config = RitualConfig::resolve(Some(path.clone()), &overrides).unwrap();
        assert_eq!(config.path, path);
        assert_eq!(config.toml.api.base_url, "http://cli");
        assert_eq!(config.toml.api.token.as_deref(), Some("cli-token"));
        assert!(!config.toml.player.voice_enabled);
    }

    #[test]
    fn test_derived_durations() {
        let mut config = RitualConfig {
            path: PathBuf::from(CONFIG_FILE_NAME),
            toml: RitualToml::default(),
        };
        let settings = config.sequencer_settings();
        assert_eq!(settings.completion_delay, Duration::from_secs(4));
        assert_eq!(settings.session_create_timeout, Duration::from_secs(5));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));

        config.toml.player.tick_interval_ms = 0;
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_tts_command_disabled_when_blank() {
        let mut config = RitualConfig {
            path: PathBuf::from(CONFIG_FILE_NAME),
            toml: RitualToml::default(),
        };
        assert_eq!(config.tts_command().map(|(c, _)| c), Some("espeak-ng"));
        config.toml.narration.command = " ".into();
        assert!(config.tts_command().is_none());
    }

    #[test]
    fn test_validate_default_is_clean() {
        assert!(RitualToml::default().validate().is_empty());
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut toml = RitualToml::default();
        toml.api.base_url = "localhost:8000".into();
        toml.player.tick_interval_ms = 0;
        toml.narration.command = String::new();

        let warnings = toml.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("http://"));
        assert!(warnings[1].contains("tick_interval_ms"));
        assert!(warnings[2].contains("narration.command"));
    }
}
