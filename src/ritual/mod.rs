//! Ritual catalog model.

pub mod types;

pub use types::{RitualDefinition, RitualStep, RitualSummary};
