//! Narration phrases spoken at step entry, resume and completion.

use super::NarrationDetail;
use crate::ritual::{RitualDefinition, RitualStep};

pub fn step(step: &RitualStep, detail: NarrationDetail) -> String {
    let mut text = format!("Step {}: {}.", step.step_number, step.title.trim_end_matches('.'));
    if detail == NarrationDetail::Full {
        let instruction = step.instruction.trim();
        if !instruction.is_empty() {
            text.push(' ');
            text.push_str(instruction);
        }
        // Transliteration reads better through an English voice than the script.
        if let Some(mantra) = step
            .mantra_transliteration
            .as_deref()
            .or(step.mantra.as_deref())
        {
            text.push_str(" Chant: ");
            text.push_str(mantra.trim());
        }
    }
    text
}

pub fn intro(ritual: &RitualDefinition, first: &RitualStep, detail: NarrationDetail) -> String {
    format!("Beginning {}. {}", ritual.name, step(first, detail))
}

pub fn resume(step: &RitualStep) -> String {
    format!("Resuming {}.", step.title.trim_end_matches('.'))
}

pub fn closing(ritual: &RitualDefinition) -> String {
    format!("{} is complete. Namaste.", ritual.name)
}
