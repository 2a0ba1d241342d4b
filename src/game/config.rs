use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};

pub const CELL_SIZE_RANGE: RangeInclusive<u32> = 10..=60;
pub const COLUMNS_RANGE: RangeInclusive<u32> = 10..=60;
pub const ROWS_RANGE: RangeInclusive<u32> = 8..=40;
pub const BASE_SPEED_RANGE: RangeInclusive<u32> = 5..=30;
pub const BONUS_COUNT_RANGE: RangeInclusive<u32> = 0..=5;

/// Settings for one game session
///
/// The engine trusts these values; callers run [`GameConfig::validate`] or
/// [`GameConfig::clamped`] before starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Size of one grid cell in pixels; the terminal view draws `cell_size / 10` columns
    pub cell_size: u32,
    /// Width of the game grid
    pub columns: u32,
    /// Height of the game grid
    pub rows: u32,
    /// Ticks per second at level 1
    pub base_speed: u32,
    /// Number of bonus items on the field, 0 disables bonuses
    pub bonus_count: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 20,
            columns: 30,
            rows: 20,
            base_speed: 10,
            bonus_count: 1,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            ..Default::default()
        }
    }

    /// Create the smallest allowed grid, handy for tests
    pub fn small() -> Self {
        Self::new(*COLUMNS_RANGE.start(), *ROWS_RANGE.start())
    }

    pub fn bonuses_enabled(&self) -> bool {
        self.bonus_count > 0
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        for field in ConfigField::ALL {
            let value = field.get(self);
            let range = field.range();
            if !range.contains(&value) {
                return Err(Error::ConfigOutOfRange {
                    field: field.name(),
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }

    /// Force every field into its allowed range
    pub fn clamped(mut self) -> Self {
        for field in ConfigField::ALL {
            let value = field.get(&self);
            field.set(&mut self, value);
        }
        self
    }

    /// Read settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Read settings, falling back to defaults when the file is absent or broken
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config.clamped(),
            Err(e) if e.is_not_found() => Self::default(),
            Err(e) => {
                warn!("Failed to load settings from {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating parent directories if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// One editable setting, as shown on the settings form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    CellSize,
    Columns,
    Rows,
    BaseSpeed,
    BonusCount,
}

impl ConfigField {
    pub const ALL: [ConfigField; 5] = [
        ConfigField::CellSize,
        ConfigField::Columns,
        ConfigField::Rows,
        ConfigField::BaseSpeed,
        ConfigField::BonusCount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigField::CellSize => "cell_size",
            ConfigField::Columns => "columns",
            ConfigField::Rows => "rows",
            ConfigField::BaseSpeed => "base_speed",
            ConfigField::BonusCount => "bonus_count",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfigField::CellSize => "Cell size (px)",
            ConfigField::Columns => "Columns",
            ConfigField::Rows => "Rows",
            ConfigField::BaseSpeed => "Base speed",
            ConfigField::BonusCount => "Bonuses",
        }
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        match self {
            ConfigField::CellSize => CELL_SIZE_RANGE,
            ConfigField::Columns => COLUMNS_RANGE,
            ConfigField::Rows => ROWS_RANGE,
            ConfigField::BaseSpeed => BASE_SPEED_RANGE,
            ConfigField::BonusCount => BONUS_COUNT_RANGE,
        }
    }

    pub fn get(&self, config: &GameConfig) -> u32 {
        match self {
            ConfigField::CellSize => config.cell_size,
            ConfigField::Columns => config.columns,
            ConfigField::Rows => config.rows,
            ConfigField::BaseSpeed => config.base_speed,
            ConfigField::BonusCount => config.bonus_count,
        }
    }

    /// Store `value`, clamped to the field's range
    pub fn set(&self, config: &mut GameConfig, value: u32) {
        let range = self.range();
        let value = value.clamp(*range.start(), *range.end());
        match self {
            ConfigField::CellSize => config.cell_size = value,
            ConfigField::Columns => config.columns = value,
            ConfigField::Rows => config.rows = value,
            ConfigField::BaseSpeed => config.base_speed = value,
            ConfigField::BonusCount => config.bonus_count = value,
        }
    }

    pub fn adjust(&self, config: &mut GameConfig, delta: i32) {
        let value = self.get(config).saturating_add_signed(delta);
        self.set(config, value);
    }

    pub fn next(&self) -> ConfigField {
        let i = self.index();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> ConfigField {
        let i = self.index();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }
}
