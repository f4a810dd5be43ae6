pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod narration;
pub mod player;
pub mod ritual;
pub mod session;
pub mod ui;

#[cfg(test)]
mod testing;
