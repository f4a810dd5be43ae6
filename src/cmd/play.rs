//! Interactive ritual playback: `ritual-player play`.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;

use ritual_player::api::{CompletionFeedback, HttpApi};
use ritual_player::config::RitualConfig;
use ritual_player::narration::{CommandSynth, LogSynth, NarrationChannel, SpeechSynth};
use ritual_player::player::{Button, PlayerBinding, PlayerExit, PlayerView, Sequencer, StepClock};
use ritual_player::session::SessionClient;
use ritual_player::ui::PlayerScreen;

/// What a line typed at the player prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(Button),
    Quit,
}

/// Map one input line to an action. Unknown input is ignored.
pub fn parse_key(line: &str) -> Option<KeyAction> {
    // A lone space toggles pause; any other whitespace is noise.
    if line == " " {
        return Some(KeyAction::Press(Button::TogglePause));
    }
    let action = match line.trim().to_lowercase().as_str() {
        "n" | "next" => KeyAction::Press(Button::Next),
        "p" | "prev" | "previous" => KeyAction::Press(Button::Previous),
        "s" | "pause" | "resume" => KeyAction::Press(Button::TogglePause),
        "c" | "complete" | "done" => KeyAction::Press(Button::Complete),
        "a" | "abandon" => KeyAction::Press(Button::Abandon),
        "v" | "voice" => KeyAction::Press(Button::ToggleVoice),
        "q" | "quit" => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Forward key presses from `input` until it ends or the user quits.
///
/// Dropping `buttons` on return closes the player.
pub fn read_keys(input: impl BufRead, buttons: mpsc::Sender<Button>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        match parse_key(&line) {
            Some(KeyAction::Press(button)) => {
                if buttons.blocking_send(button).is_err() {
                    break;
                }
            }
            Some(KeyAction::Quit) => break,
            None => {}
        }
    }
}

fn synth_for(config: &RitualConfig) -> Box<dyn SpeechSynth> {
    match config.tts_command() {
        Some((program, args)) => Box::new(CommandSynth::new(program, args.to_vec())),
        None => Box::new(LogSynth),
    }
}

/// Wire a player for `api` according to `config`.
pub fn build_player(
    config: &RitualConfig,
    api: Arc<HttpApi>,
    feedback: CompletionFeedback,
) -> (PlayerBinding, tokio::sync::watch::Receiver<PlayerView>) {
    let (clock, ticks) = StepClock::new(config.tick_interval());
    let narration = NarrationChannel::new(
        synth_for(config),
        config.toml.player.voice_enabled,
        config.toml.narration.detail,
    );
    let sequencer = Sequencer::new(
        api.clone(),
        SessionClient::new(api, config.session_call_timeout()),
        narration,
        clock,
        config.sequencer_settings(),
    );
    let (binding, views) = PlayerBinding::new(sequencer, ticks);
    (binding.with_feedback(feedback), views)
}

fn offer_retry(error: &anyhow::Error) -> bool {
    use dialoguer::Confirm;

    if !console::Term::stderr().is_term() {
        return false;
    }
    eprintln!("{:#}", error);
    Confirm::new()
        .with_prompt("Try loading the ritual again?")
        .default(true)
        .interact()
        .unwrap_or(false)
}

pub async fn cmd_play(
    config: &RitualConfig,
    ritual_id: &str,
    rating: Option<u8>,
    notes: Option<String>,
) -> Result<()> {
    let api = Arc::new(HttpApi::new(
        &config.toml.api.base_url,
        config.toml.api.token.clone(),
        config.request_timeout(),
    )?);
    let (mut binding, mut views) =
        build_player(config, api, CompletionFeedback::new(rating, notes));

    loop {
        match binding
            .open(ritual_id)
            .await
            .with_context(|| format!("Could not start ritual '{}'", ritual_id))
        {
            Ok(()) => break,
            Err(e) => {
                if !offer_retry(&e) {
                    return Err(e);
                }
            }
        }
    }

    let ritual_name = binding
        .sequencer()
        .ritual()
        .map(|r| r.name.clone())
        .unwrap_or_default();

    // Blocking stdin reads can't be cancelled, so they get a plain thread
    // that never holds up runtime shutdown.
    let (buttons_tx, buttons) = mpsc::channel(16);
    std::thread::spawn(move || read_keys(std::io::stdin().lock(), buttons_tx));

    let render = tokio::spawn(async move {
        let mut screen = PlayerScreen::new();
        let first = views.borrow_and_update().clone();
        screen.render(&first);
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            screen.render(&view);
        }
        screen
    });

    let exit = binding.run(buttons).await;
    let screen = render.await.context("Player renderer stopped unexpectedly")?;
    screen.finish(exit, &ritual_name);

    if exit == PlayerExit::Closed {
        tracing::info!(ritual_id, "Player closed before the ritual finished");
    }
    Ok(())
}
