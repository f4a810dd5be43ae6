//! The ritual sequencer: playback state machine.
//!
//! Every intent is applied to local state first, synchronously and
//! unconditionally. Only then is the matching session call fired, and its
//! outcome is never read back. Narration follows the local transition.
//!
//! ```text
//! Idle → Loading → Ready → Playing ⇄ Paused → Completed | Abandoned
//!           └──→ Failed
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::clock::{ClockTick, StepClock};
use super::state::{PlaybackSession, PlayerState};
use crate::api::{CompletionFeedback, RitualCatalog};
use crate::errors::{PlayerError, TransitionRejected};
use crate::narration::{NarrationChannel, script};
use crate::ritual::{RitualDefinition, RitualStep};
use crate::session::SessionClient;

/// Timing knobs for the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerSettings {
    /// How long the completed view stays up before returning to the list
    pub completion_delay: Duration,
    /// Upper bound on waiting for the remote session to be created
    pub session_create_timeout: Duration,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            completion_delay: Duration::from_secs(4),
            session_create_timeout: Duration::from_secs(5),
        }
    }
}

/// Request to leave the player for the ritual list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnToList {
    pub after: Duration,
}

pub struct Sequencer {
    catalog: Arc<dyn RitualCatalog>,
    sessions: SessionClient,
    narration: NarrationChannel,
    clock: StepClock,
    settings: SequencerSettings,
    state: PlayerState,
    ritual: Option<RitualDefinition>,
    session: Option<PlaybackSession>,
}

impl Sequencer {
    pub fn new(
        catalog: Arc<dyn RitualCatalog>,
        sessions: SessionClient,
        narration: NarrationChannel,
        clock: StepClock,
        settings: SequencerSettings,
    ) -> Self {
        Self {
            catalog,
            sessions,
            narration,
            clock,
            settings,
            state: PlayerState::Idle,
            ritual: None,
            session: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn ritual(&self) -> Option<&RitualDefinition> {
        self.ritual.as_ref()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn current_step(&self) -> Option<&RitualStep> {
        let index = self.session.as_ref()?.current_step_index;
        self.ritual.as_ref()?.step(index)
    }

    pub fn voice_enabled(&self) -> bool {
        self.narration.is_enabled()
    }

    pub fn clock_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Load a ritual and begin playing its first step.
    ///
    /// Any previous playback is torn down first. A failed definition fetch
    /// leaves the player in `Failed`; a failed session create does not.
    pub async fn start(&mut self, ritual_id: &str) -> Result<(), PlayerError> {
        self.close();
        self.state = PlayerState::Loading;
        debug!(ritual_id, "Loading ritual definition");

        let ritual = match self.catalog.get_ritual(ritual_id).await {
            Ok(ritual) => ritual,
            Err(source) => {
                self.state = PlayerState::Failed;
                return Err(PlayerError::DefinitionFetch {
                    ritual_id: ritual_id.to_string(),
                    source,
                });
            }
        };
        if let Err(e) = ritual.validate() {
            self.state = PlayerState::Failed;
            return Err(e);
        }
        for warning in ritual.warnings() {
            warn!(ritual_id = %ritual.id, "{}", warning);
        }
        self.state = PlayerState::Ready;

        let session_id = self
            .sessions
            .open(&ritual.id, self.settings.session_create_timeout)
            .await;
        let session = PlaybackSession::new(&ritual.id, session_id, self.narration.is_enabled());
        info!(
            ritual_id = %ritual.id,
            playback_id = %session.playback_id,
            steps = ritual.step_count(),
            mirrored = session.is_mirrored(),
            "Playback started"
        );

        let intro = script::intro(&ritual, &ritual.steps[0], self.narration.detail());
        self.ritual = Some(ritual);
        self.session = Some(session);
        self.state = PlayerState::Playing;
        self.clock.start();
        self.narration.speak(&intro);
        Ok(())
    }

    /// Advance to the next step. Progress is mirrored remotely.
    pub fn next(&mut self) -> Result<(), TransitionRejected> {
        let (index, total) = self.position()?;
        if index + 1 >= total {
            return Err(TransitionRejected::AtLastStep);
        }
        self.focus(index + 1);
        let session_id = self.session.as_ref().and_then(|s| s.session_id.as_ref());
        self.sessions.progress(session_id, index + 1);
        Ok(())
    }

    /// Go back one step. Backward moves are not mirrored remotely.
    pub fn previous(&mut self) -> Result<(), TransitionRejected> {
        let (index, _) = self.position()?;
        if index == 0 {
            return Err(TransitionRejected::AtFirstStep);
        }
        self.focus(index - 1);
        Ok(())
    }

    /// Flip between playing and paused. Returns `true` if now paused.
    pub fn toggle_pause(&mut self) -> Result<bool, TransitionRejected> {
        self.position()?;
        let Some(session) = self.session.as_mut() else {
            return Err(TransitionRejected::NotStarted);
        };
        let paused = self.state == PlayerState::Playing;
        if paused {
            self.state = PlayerState::Paused;
            self.clock.stop();
        } else {
            self.state = PlayerState::Playing;
            self.clock.start();
        }
        session.is_paused = paused;
        debug!(playback_id = %session.playback_id, paused, "Pause toggled");
        if paused {
            self.sessions.pause(session.session_id.as_ref());
        } else {
            self.sessions.resume(session.session_id.as_ref());
            if let Some(step) = self.current_step() {
                let text = script::resume(step);
                self.narration.speak(&text);
            }
        }
        Ok(paused)
    }

    /// Flip narration on or off. Allowed in every state. Returns the new setting.
    pub fn toggle_voice(&mut self) -> bool {
        let enabled = !self.narration.is_enabled();
        self.narration.set_enabled(enabled);
        if let Some(session) = self.session.as_mut() {
            session.voice_enabled = enabled;
        }
        debug!(enabled, "Voice toggled");
        enabled
    }

    /// Finish the ritual from its last step.
    pub fn complete(
        &mut self,
        feedback: CompletionFeedback,
    ) -> Result<ReturnToList, TransitionRejected> {
        let (index, total) = self.position()?;
        if index + 1 != total {
            return Err(TransitionRejected::NotAtLastStep {
                current: index + 1,
                total,
            });
        }
        self.state = PlayerState::Completed;
        self.clock.stop();

        if let Some(session) = self.session.as_mut() {
            session.is_paused = false;
            info!(
                playback_id = %session.playback_id,
                ritual_id = %session.ritual_id,
                "Playback completed"
            );
            self.sessions
                .complete(session.session_id.as_ref(), feedback.sanitized());
        }
        if let Some(ritual) = self.ritual.as_ref() {
            let text = script::closing(ritual);
            self.narration.speak(&text);
        }
        Ok(ReturnToList {
            after: self.settings.completion_delay,
        })
    }

    /// Leave the ritual early. Local teardown never waits on the remote call.
    pub fn abandon(&mut self) -> Result<ReturnToList, TransitionRejected> {
        let (index, _) = self.position()?;
        self.state = PlayerState::Abandoned;
        self.clock.stop();
        self.narration.cancel();

        if let Some(session) = self.session.as_ref() {
            info!(
                playback_id = %session.playback_id,
                step = index + 1,
                "Playback abandoned"
            );
            self.sessions.abandon(session.session_id.as_ref());
        }
        Ok(ReturnToList {
            after: Duration::ZERO,
        })
    }

    /// Count one second on the current step. No-op unless playing.
    pub fn tick(&mut self) -> bool {
        if self.state != PlayerState::Playing {
            return false;
        }
        match self.session.as_mut() {
            Some(session) => {
                session.elapsed_seconds += 1;
                true
            }
            None => false,
        }
    }

    /// Apply a tick from the step clock, discarding stale ones.
    pub fn on_tick(&mut self, tick: ClockTick) -> bool {
        if !self.clock.accepts(tick) {
            return false;
        }
        self.tick()
    }

    /// Session calls still in flight.
    pub fn pending_session_calls(&mut self) -> usize {
        self.sessions.pending()
    }

    /// Give in-flight session calls up to one call timeout to land.
    ///
    /// Calls that outlast it are dropped. Returns how many were cut off.
    pub async fn flush_session_calls(&mut self) -> usize {
        let within = self.sessions.call_timeout();
        self.sessions.drain(within).await
    }

    /// Tear down local playback: stop the clock, silence narration, discard
    /// the session. The remote session is left as it is.
    pub fn close(&mut self) {
        self.clock.stop();
        self.narration.cancel();
        if let Some(session) = self.session.take()
            && !self.state.is_terminal()
        {
            info!(
                playback_id = %session.playback_id,
                step = session.current_step_index + 1,
                "Playback closed before finishing"
            );
        }
        self.ritual = None;
        self.state = PlayerState::Idle;
    }

    /// Current (index, step count) if navigation intents are allowed.
    fn position(&self) -> Result<(usize, usize), TransitionRejected> {
        if self.state.is_terminal() {
            return Err(TransitionRejected::Terminal);
        }
        if !self.state.is_active() {
            return Err(TransitionRejected::NotStarted);
        }
        match (self.session.as_ref(), self.ritual.as_ref()) {
            (Some(session), Some(ritual)) => Ok((session.current_step_index, ritual.step_count())),
            _ => Err(TransitionRejected::NotStarted),
        }
    }

    fn focus(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut() {
            session.focus_step(index);
            debug!(playback_id = %session.playback_id, step = index + 1, "Step focused");
        }
        if self.state == PlayerState::Playing {
            self.clock.start();
        }
        let detail = self.narration.detail();
        if let Some(step) = self.current_step() {
            let text = script::step(step, detail);
            self.narration.speak(&text);
        }
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.close();
    }
}
