//! One play-through from reset to game over
//!
//! A [`GameSession`] drives the engine with whatever tick source the caller
//! uses. The interactive loop pairs it with a [`WallClock`]; tests pair it
//! with a [`VirtualClock`] and a recorded input sequence so a full session
//! runs headlessly and deterministically.

use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use tracing::info;

use super::{
    action::Action,
    config::GameConfig,
    engine::{GameEngine, StepResult},
    state::{GameOverCause, GameState, Status},
};
use crate::results::ResultRecord;

/// Source of elapsed session time
pub trait SessionClock {
    fn elapsed(&self) -> Duration;

    /// Called once per tick with the tick period about to be waited
    fn advance(&mut self, _period: Duration) {}
}

/// Real elapsed time since the session started
#[derive(Debug, Clone)]
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl SessionClock for WallClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Elapsed time as the sum of tick periods
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    elapsed: Duration,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionClock for VirtualClock {
    fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn advance(&mut self, period: Duration) {
        self.elapsed += period;
    }
}

/// What a finished session leaves behind
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub record: ResultRecord,
    pub cause: GameOverCause,
    pub ticks: u32,
}

pub struct GameSession<C: SessionClock> {
    engine: GameEngine,
    state: GameState,
    clock: C,
    started_at: NaiveDateTime,
}

impl<C: SessionClock> GameSession<C> {
    pub fn new(config: GameConfig, clock: C) -> Self {
        Self::with_engine(GameEngine::new(config), clock)
    }

    pub fn with_engine(mut engine: GameEngine, clock: C) -> Self {
        let state = engine.reset();
        let started_at = Local::now().naive_local();
        info!(
            columns = engine.config().columns,
            rows = engine.config().rows,
            base_speed = engine.config().base_speed,
            bonus_count = engine.config().bonus_count,
            "Session started"
        );
        Self {
            engine,
            state,
            clock,
            started_at,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn is_over(&self) -> bool {
        !self.state.is_running()
    }

    /// Wait between ticks at the current speed
    pub fn tick_interval(&self) -> Duration {
        tick_interval_for(self.state.speed)
    }

    pub fn tick(&mut self, action: Action) -> StepResult {
        if self.state.is_running() {
            self.clock.advance(self.tick_interval());
        }
        self.engine.step(&mut self.state, action)
    }

    /// Feed a recorded input sequence, then keep heading until the game ends
    ///
    /// Reaching `max_ticks` while still running quits the session.
    pub fn play_scripted<I>(&mut self, actions: I, max_ticks: u32)
    where
        I: IntoIterator<Item = Action>,
    {
        let mut actions = actions.into_iter();
        while !self.is_over() {
            if self.state.ticks >= max_ticks {
                self.tick(Action::Quit);
                break;
            }
            let action = actions.next().unwrap_or(Action::Continue);
            self.tick(action);
        }
    }

    /// Close the session and produce its result record
    pub fn finish(mut self) -> SessionOutcome {
        if self.state.is_running() {
            self.engine.step(&mut self.state, Action::Quit);
        }
        let cause = match self.state.status {
            Status::GameOver(cause) => cause,
            Status::Running => GameOverCause::UserQuit,
        };

        let record = ResultRecord::now(self.state.score, self.clock.elapsed(), self.state.level);
        info!(
            %cause,
            score = record.score,
            level = record.level,
            duration = record.duration_seconds,
            ticks = self.state.ticks,
            "Session finished"
        );

        SessionOutcome {
            record,
            cause,
            ticks: self.state.ticks,
        }
    }
}

pub fn tick_interval_for(speed: u32) -> Duration {
    Duration::from_secs(1) / speed.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};

    fn headless(config: GameConfig, seed: u64) -> GameSession<VirtualClock> {
        GameSession::with_engine(GameEngine::with_seed(config, seed), VirtualClock::new())
    }

    #[test]
    fn test_tick_interval_follows_speed() {
        assert_eq!(tick_interval_for(10), Duration::from_millis(100));
        assert_eq!(tick_interval_for(20), Duration::from_millis(50));
        assert_eq!(tick_interval_for(0), Duration::from_secs(1));
    }

    #[test]
    fn test_scripted_wall_run() {
        let config = GameConfig {
            cell_size: 20,
            columns: 30,
            rows: 20,
            base_speed: 10,
            bonus_count: 0,
        };
        let mut session = headless(config, 42);
        session.state_mut().food = Position::new(0, 0);

        session.play_scripted(std::iter::repeat_n(Action::Move(Direction::Right), 20), 1_000);
        let outcome = session.finish();

        assert_eq!(outcome.cause, GameOverCause::Wall);
        assert_eq!(outcome.ticks, 15);
        assert_eq!(outcome.record.score, 0);
        assert_eq!(outcome.record.level, 1);
        assert_eq!(outcome.record.duration_seconds, 1.5);
    }

    #[test]
    fn test_tick_cap_quits() {
        let mut session = headless(GameConfig::default(), 1);
        session.state_mut().food = Position::new(0, 0);
        session.state_mut().bonuses.clear();

        session.play_scripted(
            [
                Action::Move(Direction::Up),
                Action::Move(Direction::Right),
                Action::Move(Direction::Down),
            ],
            2,
        );

        assert_eq!(
            session.state().game_over_cause(),
            Some(GameOverCause::UserQuit)
        );
        assert_eq!(session.finish().ticks, 2);
    }

    #[test]
    fn test_finish_running_session_counts_as_quit() {
        let session = headless(GameConfig::default(), 3);
        let outcome = session.finish();
        assert_eq!(outcome.cause, GameOverCause::UserQuit);
        assert_eq!(outcome.record.score, 0);
        assert_eq!(outcome.record.duration_seconds, 0.0);
    }

    #[test]
    fn test_virtual_clock_stops_after_game_over() {
        let mut session = headless(GameConfig::small(), 6);
        session.state_mut().food = Position::new(0, 0);
        session.state_mut().bonuses.clear();
        session.tick(Action::Quit);
        let after_quit = session.elapsed();
        session.tick(Action::Continue);
        assert_eq!(session.elapsed(), after_quit);
    }
}
