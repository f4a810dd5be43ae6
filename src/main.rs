use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ritual_player::config::{CliOverrides, RitualConfig};
use ritual_player::logging::{self, LogOptions};

mod cmd;

#[derive(Parser)]
#[command(name = "ritual-player")]
#[command(version, about = "Guided, narrated playback of step-by-step rituals")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "RITUAL_LOG_JSON")]
    pub log_json: bool,

    /// Path to ritual.toml. Defaults to the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the ritual API. Overrides ritual.toml and RITUAL_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the ritual API
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available rituals
    List {
        /// Only show rituals in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show a ritual's details and steps
    Show { id: String },
    /// Play a ritual step by step
    Play {
        id: String,

        /// Start with narration muted
        #[arg(long)]
        no_voice: bool,

        /// Rating (1-5) sent when the ritual is completed
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,

        /// Notes sent when the ritual is completed
        #[arg(long)]
        notes: Option<String>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default ritual.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // The player owns the terminal, so its logs go to a file.
    let file_dir = match cli.command {
        Commands::Play { .. } => logging::default_log_dir(),
        _ => None,
    };
    let _log_guard = logging::init(&LogOptions {
        verbose: cli.verbose,
        json: cli.log_json,
        file_dir,
    })?;

    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        token: cli.token.clone(),
        no_voice: matches!(cli.command, Commands::Play { no_voice: true, .. }),
    };
    let config = RitualConfig::resolve(cli.config.clone(), &overrides)?;
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    match &cli.command {
        Commands::List { category } => cmd::cmd_list(&config, category.as_deref()).await?,
        Commands::Show { id } => cmd::cmd_show(&config, id).await?,
        Commands::Play {
            id, rating, notes, ..
        } => cmd::cmd_play(&config, id, *rating, notes.clone()).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
