//! Test doubles for the remote API and the speech capability.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::{CompletionFeedback, RitualCatalog, SessionId, SessionStore};
use crate::errors::ApiError;
use crate::narration::SpeechSynth;
use crate::ritual::{RitualDefinition, RitualStep, RitualSummary};

pub fn step(n: u32, title: &str, secs: u32) -> RitualStep {
    RitualStep {
        step_number: n,
        title: title.to_string(),
        instruction: format!("{} slowly and with attention.", title),
        mantra: None,
        mantra_transliteration: None,
        mantra_translation: None,
        duration_seconds: secs,
        items_needed: vec![],
        tips: vec![],
    }
}

/// Three steps with durations [30, 45, 20].
pub fn three_step_ritual() -> RitualDefinition {
    RitualDefinition {
        id: "morning-puja".to_string(),
        name: "Morning Puja".to_string(),
        category: "daily".to_string(),
        duration_minutes: 2,
        description: None,
        deity: Some("Ganesha".to_string()),
        difficulty: None,
        benefits: vec![],
        steps: vec![
            step(1, "Light the lamp", 30),
            step(2, "Offer flowers", 45),
            step(3, "Chant the mantra", 20),
        ],
    }
}

pub struct StaticCatalog {
    rituals: HashMap<String, RitualDefinition>,
    fail: bool,
}

impl StaticCatalog {
    pub fn new(rituals: Vec<RitualDefinition>) -> Self {
        Self {
            rituals: rituals.into_iter().map(|r| (r.id.clone(), r)).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            rituals: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl RitualCatalog for StaticCatalog {
    async fn list_rituals(&self, category: Option<&str>) -> Result<Vec<RitualSummary>, ApiError> {
        if self.fail {
            return Err(ApiError::Status {
                endpoint: "/rituals".into(),
                status: 503,
            });
        }
        Ok(self
            .rituals
            .values()
            .filter(|r| category.is_none_or(|c| r.category == c))
            .map(RitualSummary::from)
            .collect())
    }

    async fn get_ritual(&self, ritual_id: &str) -> Result<RitualDefinition, ApiError> {
        if self.fail {
            return Err(ApiError::Status {
                endpoint: format!("/rituals/{}", ritual_id),
                status: 503,
            });
        }
        self.rituals
            .get(ritual_id)
            .cloned()
            .ok_or_else(|| ApiError::RitualNotFound {
                id: ritual_id.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Succeed,
    Fail,
    /// Never resolve.
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Create(String),
    Progress(usize),
    Pause,
    Resume,
    Complete(Option<u8>),
    Abandon,
}

/// Session store that records every call and answers according to its mode.
pub struct ScriptedStore {
    mode: Mutex<StoreMode>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedStore {
    pub fn new(mode: StoreMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_mode(&self, mode: StoreMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: RecordedCall) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        let mode = *self.mode.lock().unwrap();
        match mode {
            StoreMode::Succeed => Ok(()),
            StoreMode::Fail => Err(ApiError::Status {
                endpoint: "/sessions".into(),
                status: 500,
            }),
            StoreMode::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl SessionStore for ScriptedStore {
    async fn create_session(&self, ritual_id: &str) -> Result<SessionId, ApiError> {
        self.answer(RecordedCall::Create(ritual_id.to_string()))
            .await?;
        Ok(SessionId::new(format!("session-{}", ritual_id)))
    }

    async fn update_progress(
        &self,
        _session: &SessionId,
        step_index: usize,
    ) -> Result<(), ApiError> {
        self.answer(RecordedCall::Progress(step_index)).await
    }

    async fn pause_session(&self, _session: &SessionId) -> Result<(), ApiError> {
        self.answer(RecordedCall::Pause).await
    }

    async fn resume_session(&self, _session: &SessionId) -> Result<(), ApiError> {
        self.answer(RecordedCall::Resume).await
    }

    async fn complete_session(
        &self,
        _session: &SessionId,
        feedback: &CompletionFeedback,
    ) -> Result<(), ApiError> {
        self.answer(RecordedCall::Complete(feedback.rating)).await
    }

    async fn abandon_session(&self, _session: &SessionId) -> Result<(), ApiError> {
        self.answer(RecordedCall::Abandon).await
    }
}

#[derive(Debug, Default)]
pub struct SynthLog {
    /// Every utterance handed to the synthesizer, in order
    pub spoken: Vec<String>,
    /// Utterance currently audible, if any
    pub current: Option<String>,
    /// Utterances that played to the end
    pub completed: Vec<String>,
    pub cancels: usize,
}

/// Speech double. Utterances stay "playing" until `finish_current` is called.
#[derive(Clone, Default)]
pub struct RecordingSynth {
    log: Arc<Mutex<SynthLog>>,
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish_current(&self) {
        let mut log = self.log.lock().unwrap();
        if let Some(text) = log.current.take() {
            log.completed.push(text);
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.log.lock().unwrap().spoken.clone()
    }

    pub fn current(&self) -> Option<String> {
        self.log.lock().unwrap().current.clone()
    }

    pub fn completed(&self) -> Vec<String> {
        self.log.lock().unwrap().completed.clone()
    }

    pub fn cancels(&self) -> usize {
        self.log.lock().unwrap().cancels
    }
}

impl SpeechSynth for RecordingSynth {
    fn speak(&mut self, text: &str) {
        let mut log = self.log.lock().unwrap();
        log.spoken.push(text.to_string());
        log.current = Some(text.to_string());
    }

    fn cancel(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.current = None;
        log.cancels += 1;
    }
}
