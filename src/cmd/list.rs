//! Ritual catalog commands: `ritual-player list` and `ritual-player show`.

use anyhow::{Context, Result};

use ritual_player::api::{HttpApi, RitualCatalog};
use ritual_player::config::RitualConfig;
use ritual_player::ui::{ritual_details, ritual_table};

const DETAIL_WIDTH: usize = 80;

fn api(config: &RitualConfig) -> Result<HttpApi> {
    HttpApi::new(
        &config.toml.api.base_url,
        config.toml.api.token.clone(),
        config.request_timeout(),
    )
}

pub async fn cmd_list(config: &RitualConfig, category: Option<&str>) -> Result<()> {
    let rituals = api(config)?
        .list_rituals(category)
        .await
        .context("Failed to list rituals")?;

    if rituals.is_empty() {
        match category {
            Some(category) => println!("No rituals in category '{}'.", category),
            None => println!("No rituals available."),
        }
        return Ok(());
    }

    println!();
    for line in ritual_table(&rituals) {
        println!("  {}", line);
    }
    println!();
    println!("Run 'ritual-player play <id>' to begin.");
    Ok(())
}

pub async fn cmd_show(config: &RitualConfig, ritual_id: &str) -> Result<()> {
    let ritual = api(config)?
        .get_ritual(ritual_id)
        .await
        .with_context(|| format!("Failed to load ritual '{}'", ritual_id))?;

    println!();
    for line in ritual_details(&ritual, DETAIL_WIDTH) {
        println!("{}", line);
    }
    if let Err(e) = ritual.validate() {
        println!();
        println!("Warning: {}", e);
    }
    for warning in ritual.warnings() {
        println!("Warning: {}", warning);
    }
    println!();
    Ok(())
}
