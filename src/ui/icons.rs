//! Shared UI icons.
//!
//! Each icon falls back to plain ASCII on terminals without emoji support.

use console::Emoji;

// Playback states
pub static PLAYING: Emoji<'_, '_> = Emoji("▶️  ", "[>]");
pub static PAUSED: Emoji<'_, '_> = Emoji("⏸️  ", "[||]");
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static LEAVE: Emoji<'_, '_> = Emoji("🚪 ", "[X]");

// Step content
pub static LAMP: Emoji<'_, '_> = Emoji("🪔 ", "*");
pub static MANTRA: Emoji<'_, '_> = Emoji("🕉️  ", "OM");
pub static ITEMS: Emoji<'_, '_> = Emoji("🧺 ", "-");
pub static TIP: Emoji<'_, '_> = Emoji("💡 ", "!");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");

// Narration
pub static VOICE_ON: Emoji<'_, '_> = Emoji("🔊 ", "[voice]");
pub static VOICE_OFF: Emoji<'_, '_> = Emoji("🔇 ", "[muted]");
