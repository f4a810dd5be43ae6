//! Ritual definitions as served by the remote catalog.
//!
//! A definition is immutable once loaded. Steps are numbered from 1 and must be
//! contiguous; the player indexes them from 0 internally.

use serde::{Deserialize, Serialize};

use crate::errors::PlayerError;

/// One guided step of a ritual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualStep {
    /// 1-based position within the ritual
    pub step_number: u32,
    pub title: String,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mantra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mantra_transliteration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mantra_translation: Option<String>,
    /// Declared target duration. Informational only; playback never auto-advances.
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items_needed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,
}

impl RitualStep {
    /// Whether the step carries any mantra text to display or narrate.
    pub fn has_mantra(&self) -> bool {
        self.mantra.is_some() || self.mantra_transliteration.is_some()
    }
}

/// A complete ritual: metadata plus its ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Overall duration as advertised in the catalog
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    pub steps: Vec<RitualStep>,
}

impl RitualDefinition {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Step at a 0-based index.
    pub fn step(&self, index: usize) -> Option<&RitualStep> {
        self.steps.get(index)
    }

    /// Sum of the declared step durations.
    pub fn total_step_seconds(&self) -> u64 {
        self.steps
            .iter()
            .map(|s| u64::from(s.duration_seconds))
            .sum()
    }

    /// Check the structural invariants playback depends on.
    ///
    /// A ritual needs at least one step, and step numbers must run 1, 2, 3, ...
    /// in list order.
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.steps.is_empty() {
            return Err(self.invalid("ritual has no steps".to_string()));
        }
        for (index, step) in self.steps.iter().enumerate() {
            let expected = index as u32 + 1;
            if step.step_number != expected {
                return Err(self.invalid(format!(
                    "step at position {} is numbered {} (expected {})",
                    expected, step.step_number, expected
                )));
            }
            if step.title.trim().is_empty() {
                return Err(self.invalid(format!("step {} has an empty title", expected)));
            }
        }
        Ok(())
    }

    /// Non-fatal inconsistencies worth logging.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let declared = u64::from(self.duration_minutes) * 60;
        let summed = self.total_step_seconds();
        // Catalog durations are rounded to whole minutes.
        if declared > 0 && declared.abs_diff(summed) >= 60 {
            warnings.push(format!(
                "declared duration {} min differs from step total {}s",
                self.duration_minutes, summed
            ));
        }
        if self.steps.iter().all(|s| s.duration_seconds == 0) {
            warnings.push("no step declares a duration".to_string());
        }
        warnings
    }

    fn invalid(&self, reason: String) -> PlayerError {
        PlayerError::InvalidDefinition {
            ritual_id: self.id.clone(),
            reason,
        }
    }
}

/// Catalog entry shown in the ritual list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub step_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl From<&RitualDefinition> for RitualSummary {
    fn from(def: &RitualDefinition) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            category: def.category.clone(),
            duration_minutes: def.duration_minutes,
            step_count: def.step_count(),
            difficulty: def.difficulty.clone(),
        }
    }
}
