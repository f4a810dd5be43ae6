//! Configuration view and validation commands: `ritual-player config`.

use anyhow::Result;

use super::super::ConfigCommands;
use ritual_player::config::{RitualConfig, RitualToml};

pub fn cmd_config(config: &RitualConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = &config.path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Ritual Player Configuration");
            println!("===========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No ritual.toml found at {}", config_path.display());
                println!("Run 'ritual-player config init' to create one.");
            }
            println!();

            let toml = &config.toml;
            println!("Effective values (with env/CLI overrides):");
            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            println!(
                "  token = {}",
                if toml.api.token.is_some() { "(set)" } else { "(none)" }
            );
            println!("  request_timeout_secs = {}", toml.api.request_timeout_secs);
            println!();
            println!("[player]");
            println!("  tick_interval_ms = {}", toml.player.tick_interval_ms);
            println!("  completion_delay_secs = {}", toml.player.completion_delay_secs);
            println!(
                "  session_call_timeout_secs = {}",
                toml.player.session_call_timeout_secs
            );
            println!(
                "  session_create_timeout_secs = {}",
                toml.player.session_create_timeout_secs
            );
            println!("  voice_enabled = {}", toml.player.voice_enabled);
            println!();
            println!("[narration]");
            println!("  command = \"{}\"", toml.narration.command);
            if !toml.narration.args.is_empty() {
                println!("  args = {:?}", toml.narration.args);
            }
            println!("  detail = \"{}\"", toml.narration.detail);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No ritual.toml found. Using defaults.");
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("ritual.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            RitualToml::default().save(config_path)?;

            println!("Created ritual.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, token");
            println!("  - [player] completion_delay_secs, voice_enabled");
            println!("  - [narration] command, args, detail");
            println!();
        }
    }

    Ok(())
}
