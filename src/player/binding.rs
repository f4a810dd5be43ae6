//! Glue between the sequencer and whatever renders it.
//!
//! The binding owns the sequencer and runs its event loop: clock ticks and
//! button presses are applied in arrival order, and after every change a fresh
//! [`PlayerView`] is published on a watch channel. Exiting the loop drops the
//! sequencer, which stops the clock and silences narration on every path.

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::debug;

use super::clock::ClockTick;
use super::sequencer::{ReturnToList, Sequencer};
use super::state::PlayerState;
use crate::api::CompletionFeedback;
use crate::errors::{PlayerError, TransitionRejected};

/// Controls exposed by the player screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Previous,
    Next,
    TogglePause,
    Complete,
    Abandon,
    ToggleVoice,
}

/// Why the player loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerExit {
    /// Completion delay elapsed after the last step was finished
    Completed,
    /// User left the ritual early
    Abandoned,
    /// Input closed before the ritual finished
    Closed,
}

/// Render-ready snapshot of the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerView {
    pub state: PlayerState,
    pub ritual_name: String,
    /// 1-based; 0 when nothing is loaded
    pub step_number: usize,
    pub step_count: usize,
    pub title: String,
    pub instruction: String,
    pub mantra: Option<String>,
    pub mantra_transliteration: Option<String>,
    pub mantra_translation: Option<String>,
    pub items_needed: Vec<String>,
    pub tips: Vec<String>,
    pub elapsed_seconds: u64,
    pub target_seconds: u64,
    /// Elapsed time has passed the step's declared duration
    pub overtime: bool,
    /// Fraction of steps reached, 0.0..=1.0
    pub progress: f64,
    pub can_previous: bool,
    pub can_next: bool,
    pub can_complete: bool,
    pub is_paused: bool,
    pub voice_enabled: bool,
}

impl PlayerView {
    pub fn capture(sequencer: &Sequencer) -> Self {
        let state = sequencer.state();
        let voice_enabled = sequencer.voice_enabled();
        let (Some(ritual), Some(session)) = (sequencer.ritual(), sequencer.session()) else {
            return Self {
                state,
                voice_enabled,
                ..Self::default()
            };
        };

        let index = session.current_step_index;
        let step_count = ritual.step_count();
        let active = state.is_active();
        let mut view = Self {
            state,
            ritual_name: ritual.name.clone(),
            step_number: index + 1,
            step_count,
            elapsed_seconds: session.elapsed_seconds,
            progress: (index + 1) as f64 / step_count.max(1) as f64,
            can_previous: active && index > 0,
            can_next: active && index + 1 < step_count,
            can_complete: active && index + 1 == step_count,
            is_paused: session.is_paused,
            voice_enabled,
            ..Self::default()
        };
        if let Some(step) = ritual.step(index) {
            view.title = step.title.clone();
            view.instruction = step.instruction.clone();
            view.mantra = step.mantra.clone();
            view.mantra_transliteration = step.mantra_transliteration.clone();
            view.mantra_translation = step.mantra_translation.clone();
            view.items_needed = step.items_needed.clone();
            view.tips = step.tips.clone();
            view.target_seconds = u64::from(step.duration_seconds);
            view.overtime = view.target_seconds > 0 && view.elapsed_seconds > view.target_seconds;
        }
        view
    }

    /// "m:ss" elapsed, or "m:ss / m:ss" when the step declares a duration.
    pub fn clock_label(&self) -> String {
        if self.target_seconds == 0 {
            format_clock(self.elapsed_seconds)
        } else {
            format!(
                "{} / {}",
                format_clock(self.elapsed_seconds),
                format_clock(self.target_seconds)
            )
        }
    }
}

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_clock(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

pub struct PlayerBinding {
    sequencer: Sequencer,
    ticks: mpsc::Receiver<ClockTick>,
    view_tx: watch::Sender<PlayerView>,
    feedback: CompletionFeedback,
}

impl PlayerBinding {
    /// `ticks` must be the receiver paired with the sequencer's clock.
    pub fn new(
        sequencer: Sequencer,
        ticks: mpsc::Receiver<ClockTick>,
    ) -> (Self, watch::Receiver<PlayerView>) {
        let (view_tx, view_rx) = watch::channel(PlayerView::capture(&sequencer));
        let binding = Self {
            sequencer,
            ticks,
            view_tx,
            feedback: CompletionFeedback::default(),
        };
        (binding, view_rx)
    }

    /// Feedback sent along when the user completes the ritual.
    pub fn with_feedback(mut self, feedback: CompletionFeedback) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Load a ritual and start playing it.
    pub async fn open(&mut self, ritual_id: &str) -> Result<(), PlayerError> {
        let result = self.sequencer.start(ritual_id).await;
        self.publish();
        result
    }

    /// Apply one button press and publish the resulting view.
    pub fn press(&mut self, button: Button) -> Result<Option<ReturnToList>, TransitionRejected> {
        let result = apply(&mut self.sequencer, &self.feedback, button);
        self.publish();
        result
    }

    fn publish(&self) {
        self.view_tx.send_replace(PlayerView::capture(&self.sequencer));
    }

    /// Run until the ritual finishes or `buttons` closes.
    ///
    /// Once the ritual is completed the loop always waits out the completion
    /// delay, even if input closes in the meantime. Before returning, session
    /// calls still in flight get one call timeout to land.
    pub async fn run(mut self, buttons: mpsc::Receiver<Button>) -> PlayerExit {
        let exit = self.drive(buttons).await;
        let cut_off = self.sequencer.flush_session_calls().await;
        if cut_off > 0 {
            debug!(cut_off, "Left the player with session calls unanswered");
        }
        exit
    }

    async fn drive(&mut self, mut buttons: mpsc::Receiver<Button>) -> PlayerExit {
        let mut return_at: Option<Instant> = None;
        let mut input_open = true;

        loop {
            let deadline = return_at.unwrap_or_else(Instant::now);
            tokio::select! {
                Some(tick) = self.ticks.recv() => {
                    if self.sequencer.on_tick(tick) {
                        self.publish();
                    }
                }

                pressed = buttons.recv(), if input_open => {
                    let Some(button) = pressed else {
                        debug!("Player input closed");
                        if return_at.is_some() {
                            input_open = false;
                            continue;
                        }
                        return exit_for(self.sequencer.state());
                    };
                    match self.press(button) {
                        Ok(Some(route)) if route.after.is_zero() => {
                            return exit_for(self.sequencer.state());
                        }
                        Ok(Some(route)) => {
                            debug!(after_ms = route.after.as_millis() as u64, "Returning to list");
                            return_at = Some(Instant::now() + route.after);
                        }
                        Ok(None) => {}
                        Err(rejected) => debug!(?button, %rejected, "Button ignored"),
                    }
                }

                _ = tokio::time::sleep_until(deadline), if return_at.is_some() => {
                    return exit_for(self.sequencer.state());
                }
            }
        }
    }
}

fn apply(
    sequencer: &mut Sequencer,
    feedback: &CompletionFeedback,
    button: Button,
) -> Result<Option<ReturnToList>, TransitionRejected> {
    match button {
        Button::Previous => sequencer.previous().map(|_| None),
        Button::Next => sequencer.next().map(|_| None),
        Button::TogglePause => sequencer.toggle_pause().map(|_| None),
        Button::Complete => sequencer.complete(feedback.clone()).map(Some),
        Button::Abandon => sequencer.abandon().map(Some),
        Button::ToggleVoice => {
            sequencer.toggle_voice();
            Ok(None)
        }
    }
}

fn exit_for(state: PlayerState) -> PlayerExit {
    match state {
        PlayerState::Completed => PlayerExit::Completed,
        PlayerState::Abandoned => PlayerExit::Abandoned,
        _ => PlayerExit::Closed,
    }
}
