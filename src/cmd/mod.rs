//! CLI command implementations.
//!
//! | Module   | Commands handled |
//! |----------|------------------|
//! | `list`   | `List`, `Show`   |
//! | `play`   | `Play`           |
//! | `config` | `Config`         |

pub mod config;
pub mod list;
pub mod play;

pub use config::cmd_config;
pub use list::{cmd_list, cmd_show};
pub use play::cmd_play;
