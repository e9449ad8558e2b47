//! Gates of Olympus - falling-target tapping game library.
//!
//! Exposes the game loop for testing and for hosts other than the terminal UI.

pub mod core;
pub mod game;

pub use crate::core::config::GameConfig;
pub use crate::game::{FallingGame, SessionEvent, SessionObserver};
