//! Guided playback of a single ritual.
//!
//! - [`Sequencer`]: the state machine that owns one playback session
//! - [`StepClock`]: one-second tick source for elapsed step time
//! - [`PlayerBinding`]: event loop and view publisher for a UI

pub mod binding;
pub mod clock;
pub mod sequencer;
pub mod state;

pub use binding::{Button, PlayerBinding, PlayerExit, PlayerView, format_clock};
pub use clock::{ClockTick, StepClock};
pub use sequencer::{ReturnToList, Sequencer, SequencerSettings};
pub use state::{PlaybackSession, PlayerState};
