//! Snake Trainer - a terminal Snake game that keeps score history
//!
//! This library provides:
//! - Core game logic and headless sessions (game module)
//! - CSV result storage and the score series (results module)
//! - TUI rendering for the game and the trainer screen (render module)
//! - The interactive modes (play, trainer)

pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod results;
pub mod tui;

pub use error::{Error, Result};
