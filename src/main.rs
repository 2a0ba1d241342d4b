use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use snake_trainer::game::{ConfigField, GameConfig};
use snake_trainer::metrics::GameMetrics;
use snake_trainer::modes::{HumanMode, TrainerApp, TrainerConfig};
use snake_trainer::render::SpriteSet;
use snake_trainer::results::ResultStore;
use snake_trainer::{logging, tui};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "snake_trainer")]
#[command(version, about = "Snake game with a score history trainer")]
struct Cli {
    /// What to run
    #[arg(long, value_enum, default_value_t = Mode::Trainer)]
    mode: Mode,

    /// CSV file with one row per finished game
    #[arg(long, default_value = "results.csv")]
    results: PathBuf,

    /// JSON file with the game settings
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// Directory containing sprites.json
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Log file (the terminal is taken by the UI)
    #[arg(long, default_value = "snake_trainer.log")]
    log_file: PathBuf,

    /// Export destination (export mode)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Confirm deleting the results file (clear mode)
    #[arg(long)]
    yes: bool,

    /// Cell size in pixels
    #[arg(long)]
    cell_size: Option<u32>,

    /// Grid width in cells
    #[arg(long)]
    columns: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    rows: Option<u32>,

    /// Ticks per second at level 1
    #[arg(long)]
    base_speed: Option<u32>,

    /// Number of bonus items on the grid
    #[arg(long)]
    bonus_count: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Settings form, results table and chart
    Trainer,
    /// Play a single game
    Play,
    /// Copy the results file to --dest
    Export,
    /// Delete the results file
    Clear,
}

impl Cli {
    /// Saved settings with command line overrides applied (clamped)
    fn game_config(&self) -> GameConfig {
        let mut config = GameConfig::load_or_default(&self.settings);
        let overrides = [
            (ConfigField::CellSize, self.cell_size),
            (ConfigField::Columns, self.columns),
            (ConfigField::Rows, self.rows),
            (ConfigField::BaseSpeed, self.base_speed),
            (ConfigField::BonusCount, self.bonus_count),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                field.set(&mut config, value);
            }
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_file)?;
    info!("Snake trainer starting");

    let store = ResultStore::new(&cli.results);

    match cli.mode {
        Mode::Trainer => {
            let mut config = TrainerConfig::new(cli.results.clone(), cli.settings.clone());
            config.assets_dir = cli.assets.clone();
            config.game_config = cli.game_config();
            let mut app = TrainerApp::new(config);

            let mut terminal = tui::init()?;
            let result = tui::catch_panic(app.run(&mut terminal)).await;
            tui::restore(&mut terminal)?;
            result?;
        }
        Mode::Play => {
            let sprites = SpriteSet::load_or_default(cli.assets.as_deref());
            let mode = HumanMode::new(cli.game_config(), sprites);

            let mut terminal = tui::init()?;
            let result = tui::catch_panic(mode.run(&mut terminal)).await;
            tui::restore(&mut terminal)?;
            let outcome = result?;

            if let Err(e) = store.append(&outcome.record) {
                error!("Failed to save result: {}", e);
                eprintln!("Could not save result to {}: {e}", store.path().display());
            }

            let record = &outcome.record;
            println!("Game over: {}", outcome.cause);
            println!(
                "Score: {} | Level: {} | Time: {:.2} s",
                record.score, record.level, record.duration_seconds
            );
            let records = store.load_all().unwrap_or_default();
            println!("{}", GameMetrics::from_records(&records).format_summary());
        }
        Mode::Export => {
            let Some(dest) = cli.dest.as_deref() else {
                bail!("--dest is required in export mode");
            };
            let bytes = store.export_to(dest)?;
            println!("Exported {bytes} bytes to {}", dest.display());
        }
        Mode::Clear => {
            if !cli.yes {
                bail!(
                    "Refusing to delete {} without --yes",
                    store.path().display()
                );
            }
            if store.clear_all()? {
                println!("Deleted {}", store.path().display());
            } else {
                println!("Nothing to clear");
            }
        }
    }

    Ok(())
}
