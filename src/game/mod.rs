//! Falling-target game.
//!
//! Targets spawn above the play area on a fixed period, fall for one period,
//! and must be tapped before they reach the bottom. Too many misses (or too
//! many tapped targets reaching the bottom) end the session.

pub mod clock;
pub mod logic;
pub mod observer;
pub mod types;

pub use clock::*;
pub use logic::*;
pub use observer::*;
pub use types::*;
