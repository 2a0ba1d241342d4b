//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The engine is a state machine stepped once per tick; [`session`] wraps it with a
//! clock and turns a finished run into a result record.

pub mod action;
pub mod config;
pub mod engine;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::{ConfigField, GameConfig};
pub use engine::{GameEngine, StepInfo, StepResult, level_for_score, speed_for_level};
pub use session::{GameSession, SessionClock, SessionOutcome, VirtualClock, WallClock};
pub use state::{GameOverCause, GameState, Item, ItemKind, Position, Snake, Status};
