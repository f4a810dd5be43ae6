use crate::player::{PlayerExit, PlayerState, PlayerView, format_clock};
use crate::ui::icons::{
    CHECK, CLOCK, CROSS, ITEMS, LAMP, LEAVE, MANTRA, PAUSED, PLAYING, TIP, VOICE_OFF, VOICE_ON,
};
use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub const KEY_HELP: &str =
    "[n]ext  [p]revious  [s]/space pause  [c]omplete  [a]bandon  [v]oice  [q]uit";

const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 100;

/// Terminal renderer for the ritual player, built on `indicatif` bars.
///
/// Two bars stay pinned at the bottom: overall step progress and the clock
/// of the current step. Step details are printed above them each time the
/// focused step changes.
pub struct PlayerScreen {
    multi: MultiProgress,
    ritual_bar: ProgressBar,
    step_bar: ProgressBar,
    width: usize,
    shown_step: Option<usize>,
    shown_state: PlayerState,
}

impl PlayerScreen {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let ritual_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:30.magenta/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");
        let ritual_bar = multi.add(ProgressBar::new(0));
        ritual_bar.set_style(ritual_style);
        ritual_bar.set_prefix("Steps");

        let step_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:30.yellow/white}] {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("=> ");
        let step_bar = multi.add(ProgressBar::new(1));
        step_bar.set_style(step_style);
        step_bar.set_prefix(" Time");

        let width = usize::from(Term::stdout().size().1).clamp(MIN_WIDTH, MAX_WIDTH);

        Self {
            multi,
            ritual_bar,
            step_bar,
            width,
            shown_step: None,
            shown_state: PlayerState::Idle,
        }
    }

    /// Print a line above the bars, falling back to stderr.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn render(&mut self, view: &PlayerView) {
        if view.step_count == 0 {
            return;
        }

        if self.shown_step != Some(view.step_number) {
            self.shown_step = Some(view.step_number);
            for line in step_card(view, self.width) {
                self.print_line(line);
            }
        }
        if self.shown_state != view.state {
            self.shown_state = view.state;
            if let Some(line) = state_banner(view) {
                self.print_line(line);
            }
        }

        self.ritual_bar.set_length(view.step_count as u64);
        self.ritual_bar.set_position(view.step_number as u64);
        self.ritual_bar.set_message(view.ritual_name.clone());

        let target = view.target_seconds.max(1);
        self.step_bar.set_length(target);
        self.step_bar.set_position(view.elapsed_seconds.min(target));
        self.step_bar.set_message(status_line(view));
    }

    /// Clear the bars and print how the ritual ended.
    pub fn finish(&self, exit: PlayerExit, ritual_name: &str) {
        self.ritual_bar.finish_and_clear();
        self.step_bar.finish_and_clear();
        let line = match exit {
            PlayerExit::Completed => format!(
                "{}{} {}",
                CHECK,
                style(ritual_name).green().bold(),
                style("completed").green()
            ),
            PlayerExit::Abandoned => format!(
                "{}{} {}",
                LEAVE,
                style(ritual_name).yellow(),
                style("abandoned").yellow()
            ),
            PlayerExit::Closed => format!(
                "{}{}",
                LEAVE,
                style(format!("Left {} without finishing", ritual_name)).dim()
            ),
        };
        self.print_line(line);
    }

    pub fn error(&self, message: &str) {
        self.print_line(format!("{}{}", CROSS, style(message).red()));
    }
}

impl Default for PlayerScreen {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines describing the focused step, wrapped to `width`.
pub fn step_card(view: &PlayerView, width: usize) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "{}{} {}",
            LAMP,
            style(format!("Step {} of {}", view.step_number, view.step_count)).dim(),
            style(&view.title).bold().cyan()
        ),
    ];

    let indent = "   ";
    let options = textwrap::Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);
    lines.extend(
        textwrap::wrap(&view.instruction, &options)
            .into_iter()
            .map(|l| l.into_owned()),
    );

    if let Some(mantra) = view.mantra.as_deref() {
        lines.push(format!("{}{}", MANTRA, style(mantra).magenta()));
    }
    if let Some(transliteration) = view.mantra_transliteration.as_deref() {
        lines.push(format!("{}{}", indent, style(transliteration).italic()));
    }
    if let Some(translation) = view.mantra_translation.as_deref() {
        lines.push(format!("{}{}", indent, style(format!("\"{}\"", translation)).dim()));
    }
    if !view.items_needed.is_empty() {
        lines.push(format!("{}{}", ITEMS, view.items_needed.join(", ")));
    }
    for tip in &view.tips {
        let wrapped = textwrap::fill(tip, width.saturating_sub(4).max(MIN_WIDTH / 2));
        lines.push(format!("{}{}", TIP, style(wrapped).dim()));
    }
    lines.push(style(KEY_HELP).dim().to_string());
    lines
}

/// One-line status: clock, play state, voice.
pub fn status_line(view: &PlayerView) -> String {
    let clock = if view.overtime {
        style(view.clock_label()).red().to_string()
    } else {
        view.clock_label()
    };
    let state = match view.state {
        PlayerState::Paused => format!("{}paused", PAUSED),
        PlayerState::Playing => format!("{}playing", PLAYING),
        other => other.to_string(),
    };
    let voice = if view.voice_enabled { VOICE_ON } else { VOICE_OFF };
    format!("{}{}  {}  {}", CLOCK, clock, state, voice)
}

fn state_banner(view: &PlayerView) -> Option<String> {
    match view.state {
        PlayerState::Paused => Some(format!(
            "{}{}",
            PAUSED,
            style(format!(
                "Paused at {} on step {}",
                format_clock(view.elapsed_seconds),
                view.step_number
            ))
            .yellow()
        )),
        PlayerState::Completed => Some(format!(
            "{}{}",
            CHECK,
            style(format!("{} is complete. Namaste.", view.ritual_name)).green()
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> PlayerView {
        PlayerView {
            state: PlayerState::Playing,
            ritual_name: "Morning Puja".into(),
            step_number: 3,
            step_count: 3,
            title: "Chant the mantra".into(),
            instruction: "Sit facing east and chant the mantra eleven times with a calm, steady breath.".into(),
            mantra: Some("ॐ गं गणपतये नमः".into()),
            mantra_transliteration: Some("Om Gam Ganapataye Namaha".into()),
            mantra_translation: Some("Salutations to Ganesha".into()),
            items_needed: vec!["mala".into(), "incense".into()],
            tips: vec!["Keep the count on the mala.".into()],
            elapsed_seconds: 12,
            target_seconds: 20,
            voice_enabled: true,
            ..PlayerView::default()
        }
    }

    #[test]
    fn test_step_card_contains_step_content() {
        let text = step_card(&view(), 60).join("\n");
        assert!(text.contains("Step 3 of 3"));
        assert!(text.contains("Chant the mantra"));
        assert!(text.contains("Om Gam Ganapataye Namaha"));
        assert!(text.contains("Salutations to Ganesha"));
        assert!(text.contains("mala, incense"));
        assert!(text.contains("Keep the count"));
        assert!(text.contains("[c]omplete"));
    }

    #[test]
    fn test_step_card_wraps_instruction() {
        let lines = step_card(&view(), 40);
        let instruction: Vec<_> = lines
            .iter()
            .filter(|l| l.starts_with("   ") && !l.contains("Om Gam") && !l.contains("Salutations"))
            .collect();
        assert!(instruction.len() >= 2);
        assert!(instruction.iter().all(|l| l.chars().count() <= 40));
    }

    #[test]
    fn test_step_card_skips_missing_mantra() {
        let mut v = view();
        v.mantra = None;
        v.mantra_transliteration = None;
        v.mantra_translation = None;
        v.items_needed.clear();
        v.tips.clear();
        let text = step_card(&v, 60).join("\n");
        assert!(!text.contains("Om Gam"));
        assert!(!text.contains("mala"));
    }

    #[test]
    fn test_status_line_shows_clock_and_state() {
        let line = status_line(&view());
        assert!(line.contains("0:12 / 0:20"));
        assert!(line.contains("playing"));

        let mut paused = view();
        paused.state = PlayerState::Paused;
        assert!(status_line(&paused).contains("paused"));
    }

    #[test]
    fn test_state_banner_only_for_pause_and_completion() {
        let mut v = view();
        assert!(state_banner(&v).is_none());
        v.state = PlayerState::Completed;
        assert!(state_banner(&v).unwrap().contains("Morning Puja is complete"));
        v.state = PlayerState::Paused;
        assert!(state_banner(&v).unwrap().contains("Paused at 0:12 on step 3"));
    }
}
