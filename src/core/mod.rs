//! Constants, configuration and logging shared by the game and the UI.

pub mod config;
pub mod constants;
pub mod logging;

pub use config::{ConfigManager, GameConfig};
pub use constants::*;
