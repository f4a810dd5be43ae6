pub mod catalog;
pub mod icons;
pub mod player;

pub use catalog::{ritual_details, ritual_table};
pub use player::{KEY_HELP, PlayerScreen};
