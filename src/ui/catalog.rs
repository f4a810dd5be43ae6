//! Plain-text rendering of the ritual catalog for `list` and `show`.

use console::style;

use crate::player::format_clock;
use crate::ritual::{RitualDefinition, RitualSummary};

/// One line per ritual, sorted by category then name.
pub fn ritual_table(rituals: &[RitualSummary]) -> Vec<String> {
    let mut sorted: Vec<&RitualSummary> = rituals.iter().collect();
    sorted.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

    let id_width = sorted.iter().map(|r| r.id.len()).max().unwrap_or(0);
    sorted
        .into_iter()
        .map(|r| {
            let mut line = format!(
                "{:<width$}  {}  {}",
                r.id,
                style(&r.name).bold(),
                style(format!(
                    "({}, {} steps, {} min)",
                    if r.category.is_empty() { "uncategorized" } else { r.category.as_str() },
                    r.step_count,
                    r.duration_minutes
                ))
                .dim(),
                width = id_width
            );
            if let Some(difficulty) = r.difficulty.as_deref() {
                line.push_str(&format!(" {}", style(difficulty).yellow()));
            }
            line
        })
        .collect()
}

/// Full description of a ritual and its steps.
pub fn ritual_details(ritual: &RitualDefinition, width: usize) -> Vec<String> {
    let mut lines = vec![format!("{}", style(&ritual.name).bold().cyan())];

    let mut meta = Vec::new();
    if !ritual.category.is_empty() {
        meta.push(ritual.category.clone());
    }
    if let Some(deity) = ritual.deity.as_deref() {
        meta.push(deity.to_string());
    }
    if let Some(difficulty) = ritual.difficulty.as_deref() {
        meta.push(difficulty.to_string());
    }
    meta.push(format!("{} min", ritual.duration_minutes));
    lines.push(style(meta.join(" · ")).dim().to_string());

    if let Some(description) = ritual.description.as_deref() {
        lines.push(String::new());
        lines.extend(textwrap::wrap(description, width).into_iter().map(|l| l.into_owned()));
    }
    if !ritual.benefits.is_empty() {
        lines.push(String::new());
        lines.push(style("Benefits").bold().to_string());
        for benefit in &ritual.benefits {
            lines.push(format!("  - {}", benefit));
        }
    }

    lines.push(String::new());
    lines.push(style("Steps").bold().to_string());
    for step in &ritual.steps {
        let mut line = format!(
            "  {:>2}. {} {}",
            step.step_number,
            step.title,
            style(format!("[{}]", format_clock(u64::from(step.duration_seconds)))).dim()
        );
        if step.has_mantra() {
            line.push_str(&format!(" {}", style("· mantra").magenta()));
        }
        lines.push(line);
    }
    lines
}
