//! Core of "Pressing Under Pressure": a reaction game where each round shows
//! an instruction about two buttons and the player has until the timer runs
//! out to press them accordingly.
//!
//! The game logic (`challenge`, `engine`, `session`, `store`) has no terminal
//! dependency; `app`, `event` and `ui` make up the terminal front-end used by
//! the binary.

pub mod app;
pub mod challenge;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;

pub use error::{GameError, RuleError, StoreError};
