use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::game::{
    Action, Direction, GameConfig, GameEngine, GameSession, SessionOutcome, StepResult, WallClock,
};
use crate::input::{InputHandler, KeyAction};
use crate::render::{Renderer, SpriteSet};
use crate::tui::Tui;

/// One interactive game on the terminal
///
/// Runs until the session reaches game over; ticks fire at the session's
/// current speed and a frame is drawn after every tick.
pub struct HumanMode {
    session: GameSession<WallClock>,
    renderer: Renderer,
    input_handler: InputHandler,
    pending_direction: Option<Direction>,
    quit_requested: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, sprites: SpriteSet) -> Self {
        Self::with_engine(GameEngine::new(config), sprites)
    }

    pub fn with_engine(engine: GameEngine, sprites: SpriteSet) -> Self {
        let renderer = Renderer::new(sprites, engine.config().cell_size);
        Self {
            session: GameSession::with_engine(engine, WallClock::start()),
            renderer,
            input_handler: InputHandler::new(),
            pending_direction: None,
            quit_requested: false,
        }
    }

    pub async fn run(mut self, terminal: &mut Tui) -> Result<SessionOutcome> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = new_tick_timer(self.session.tick_interval());

        self.draw(terminal)?;

        while !self.session.is_over() {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.quit_requested = true,
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    let result = self.update_game();
                    if result.info.leveled_up {
                        tick_timer = new_tick_timer(self.session.tick_interval());
                    }
                    self.draw(terminal)?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.quit_requested = true;
                }
            }
        }

        Ok(self.session.finish())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                // Last key between two ticks wins
                KeyAction::GameAction(Action::Move(dir)) => self.pending_direction = Some(dir),
                KeyAction::GameAction(Action::Quit) | KeyAction::Quit => self.quit_requested = true,
                KeyAction::GameAction(Action::Continue) | KeyAction::None => {}
            }
        }
    }

    fn update_game(&mut self) -> StepResult {
        let action = if self.quit_requested {
            Action::Quit
        } else {
            self.pending_direction
                .take()
                .map(Action::Move)
                .unwrap_or(Action::Continue)
        };

        self.session.tick(action)
    }

    fn draw(&self, terminal: &mut Tui) -> Result<()> {
        terminal
            .draw(|frame| {
                self.renderer
                    .render(frame, self.session.state(), self.session.elapsed());
            })
            .context("Failed to draw frame")?;
        Ok(())
    }
}

fn new_tick_timer(period: std::time::Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
