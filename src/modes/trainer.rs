//! Trainer mode: the settings form and results panel around the game
//!
//! This is the idle state of the application. From here the player tunes
//! the game settings, starts a game, views the results table and the score
//! chart, exports the results file or clears it.
//!
//! # Controls
//!
//! - ↑/↓: Select setting
//! - ←/→ or -/+: Adjust setting
//! - Enter: Start game
//! - G: Show score chart
//! - E: Export results
//! - C: Clear results (asks for confirmation)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::widgets::TableState;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::human::HumanMode;
use crate::error::Error;
use crate::game::{ConfigField, GameConfig, SessionOutcome};
use crate::input::{InputHandler, TrainerKey};
use crate::metrics::GameMetrics;
use crate::render::{Notice, Overlay, SpriteSet, TrainerView};
use crate::results::{ResultRecord, ResultStore, ScoreSeries};
use crate::tui::{self, Tui};

/// Destination offered when the export prompt opens
pub const DEFAULT_EXPORT_PATH: &str = "results_export.csv";

/// Configuration for trainer mode
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// CSV file holding one row per finished game
    pub results_path: PathBuf,

    /// JSON file the settings form is saved to
    pub settings_path: PathBuf,

    /// Directory searched for `sprites.json`
    pub assets_dir: Option<PathBuf>,

    /// Initial game settings
    pub game_config: GameConfig,
}

impl TrainerConfig {
    /// Paths with game settings loaded from `settings_path` (defaults if absent)
    pub fn new(results_path: PathBuf, settings_path: PathBuf) -> Self {
        let game_config = GameConfig::load_or_default(&settings_path);
        Self {
            results_path,
            settings_path,
            assets_dir: None,
            game_config,
        }
    }
}

/// What the idle loop asks the outer loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stay,
    StartGame,
    Quit,
}

pub struct TrainerApp {
    config: TrainerConfig,
    game_config: GameConfig,
    selected: ConfigField,
    store: ResultStore,
    records: Vec<ResultRecord>,
    series: Option<ScoreSeries>,
    metrics: GameMetrics,
    overlay: Overlay,
    table_state: TableState,
    sprites: SpriteSet,
    input_handler: InputHandler,
}

impl TrainerApp {
    pub fn new(config: TrainerConfig) -> Self {
        let sprites = SpriteSet::load_or_default(config.assets_dir.as_deref());
        let store = ResultStore::new(&config.results_path);
        let mut app = Self {
            game_config: config.game_config.clamped(),
            config,
            selected: ConfigField::CellSize,
            store,
            records: Vec::new(),
            series: None,
            metrics: GameMetrics::new(),
            overlay: Overlay::None,
            table_state: TableState::default(),
            sprites,
            input_handler: InputHandler::new(),
        };
        app.reload();
        app
    }

    pub fn game_config(&self) -> &GameConfig {
        &self.game_config
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn series(&self) -> Option<&ScoreSeries> {
        self.series.as_ref()
    }

    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        loop {
            match self.idle(terminal).await? {
                Command::StartGame => self.play_round(terminal).await?,
                Command::Quit => break,
                Command::Stay => {}
            }
        }
        info!("Trainer closed");
        Ok(())
    }

    /// Wait for input on the trainer screen until a game starts or the app quits
    async fn idle(&mut self, terminal: &mut Tui) -> Result<Command> {
        let mut event_stream = EventStream::new();

        loop {
            self.draw(terminal)?;

            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            let command = self.handle_key(key);
                            if command != Command::Stay {
                                return Ok(command);
                            }
                        }
                        // Resize and friends only need a redraw
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => return Ok(Command::Quit),
                    }
                }

                _ = tokio::signal::ctrl_c() => return Ok(Command::Quit),
            }
        }
    }

    /// Run one game and record it; game loop failures end up in a notice
    async fn play_round(&mut self, terminal: &mut Tui) -> Result<()> {
        if let Err(e) = self.game_config.save(&self.config.settings_path) {
            warn!("Failed to save settings to {:?}: {}", self.config.settings_path, e);
        }

        let mode = HumanMode::new(self.game_config, self.sprites.clone());
        let result = tui::catch_panic(mode.run(terminal)).await;
        self.finish_round(result);

        terminal.clear().context("Failed to clear terminal")?;
        Ok(())
    }

    /// Record a finished round, or report why it did not finish
    pub fn finish_round(&mut self, result: Result<SessionOutcome>) {
        match result {
            Ok(outcome) => self.record_outcome(&outcome),
            Err(e) => {
                error!("Game loop failed: {:#}", e);
                self.overlay = Overlay::Notice(Notice::error(
                    "Error",
                    format!("The game stopped unexpectedly:\n{e:#}"),
                ));
            }
        }
    }

    fn draw(&mut self, terminal: &mut Tui) -> Result<()> {
        let view = TrainerView {
            config: &self.game_config,
            selected: self.selected,
            records: &self.records,
            series: self.series.as_ref(),
            metrics: &self.metrics,
            overlay: &self.overlay,
            results_path: &self.config.results_path,
        };
        let table_state = &mut self.table_state;
        terminal
            .draw(|frame| view.render(frame, table_state))
            .context("Failed to draw frame")?;
        Ok(())
    }

    /// Apply one key press to the trainer state
    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        match std::mem::take(&mut self.overlay) {
            Overlay::None => self.handle_form_key(key),
            Overlay::Notice(notice) => {
                if !matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.overlay = Overlay::Notice(notice);
                }
                Command::Stay
            }
            Overlay::ConfirmClear => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.clear_results();
                } else {
                    info!("Clear cancelled");
                }
                Command::Stay
            }
            Overlay::ExportPrompt(mut input) => {
                match key.code {
                    KeyCode::Enter => {
                        let dest = input.trim().to_string();
                        self.export(Path::new(&dest));
                    }
                    KeyCode::Esc => {}
                    KeyCode::Backspace => {
                        input.pop();
                        self.overlay = Overlay::ExportPrompt(input);
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        input.push(c);
                        self.overlay = Overlay::ExportPrompt(input);
                    }
                    _ => self.overlay = Overlay::ExportPrompt(input),
                }
                Command::Stay
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Command {
        match self.input_handler.handle_trainer_key(key) {
            TrainerKey::PrevField => self.selected = self.selected.prev(),
            TrainerKey::NextField => self.selected = self.selected.next(),
            TrainerKey::Decrease => self.selected.adjust(&mut self.game_config, -1),
            TrainerKey::Increase => self.selected.adjust(&mut self.game_config, 1),
            TrainerKey::StartGame => return Command::StartGame,
            TrainerKey::ShowGraph => self.show_graph(),
            TrainerKey::Export => self.open_export_prompt(),
            TrainerKey::Clear => self.overlay = Overlay::ConfirmClear,
            TrainerKey::Quit => return Command::Quit,
            TrainerKey::None => {}
        }
        Command::Stay
    }

    /// Append a finished game and show its summary
    pub fn record_outcome(&mut self, outcome: &SessionOutcome) {
        let record = &outcome.record;
        self.overlay = match self.store.append(record) {
            Ok(()) => Overlay::Notice(Notice::info(
                "Game Over",
                format!(
                    "Game over: {}\nScore: {}\nTime: {:.2} s\nLevel: {}",
                    outcome.cause, record.score, record.duration_seconds, record.level
                ),
            )),
            Err(e) => {
                error!("Failed to save result: {}", e);
                Overlay::Notice(Notice::error(
                    "Error",
                    format!("Score {} could not be saved:\n{e}", record.score),
                ))
            }
        };
        self.reload();
    }

    /// Re-read the store into the table, summary and (if shown) the chart
    pub fn reload(&mut self) {
        self.records = match self.store.load_all() {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load results from {:?}: {}", self.store.path(), e);
                Vec::new()
            }
        };
        self.metrics = GameMetrics::from_records(&self.records);
        if self.series.is_some() {
            self.series = Some(ScoreSeries::from_records(&self.records));
        }
        self.table_state
            .select(self.records.len().checked_sub(1));
    }

    fn show_graph(&mut self) {
        self.reload();
        let series = ScoreSeries::from_records(&self.records);
        if series.is_empty() {
            self.overlay = Overlay::Notice(Notice::warning(
                "No data",
                format!(
                    "No valid results in {}.\nPlay at least one game.",
                    self.store.path().display()
                ),
            ));
        } else {
            self.series = Some(series);
        }
    }

    fn open_export_prompt(&mut self) {
        self.overlay = if self.store.exists() {
            Overlay::ExportPrompt(DEFAULT_EXPORT_PATH.to_string())
        } else {
            Overlay::Notice(Notice::warning(
                "No data",
                format!("{} not found.", self.store.path().display()),
            ))
        };
    }

    fn export(&mut self, dest: &Path) {
        if dest.as_os_str().is_empty() {
            self.overlay = Overlay::Notice(Notice::warning("Export", "No destination given."));
            return;
        }

        self.overlay = match self.store.export_to(dest) {
            Ok(_) => Overlay::Notice(Notice::info(
                "Export",
                format!("Exported to {}", dest.display()),
            )),
            Err(Error::NothingToExport(path)) => Overlay::Notice(Notice::warning(
                "No data",
                format!("{} not found.", path.display()),
            )),
            Err(e) => {
                warn!("Export to {:?} failed: {}", dest, e);
                Overlay::Notice(Notice::error("Export failed", format!("Cannot export: {e}")))
            }
        };
    }

    fn clear_results(&mut self) {
        match self.store.clear_all() {
            Ok(_) => {
                self.records.clear();
                self.series = None;
                self.metrics = GameMetrics::new();
                self.table_state.select(None);
            }
            Err(e) => {
                warn!("Failed to clear results: {}", e);
                self.overlay = Overlay::Notice(Notice::error(
                    "Error",
                    format!("Could not delete results:\n{e}"),
                ));
            }
        }
    }
}
