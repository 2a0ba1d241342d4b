use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// File looked up inside the assets directory
pub const SPRITES_FILE: &str = "sprites.json";

/// Optional glyph overrides for the game grid
///
/// Any glyph left unset is drawn as a solid colour block instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpriteSet {
    pub head: Option<char>,
    pub body: Option<char>,
    pub food: Option<char>,
    pub bonus: Option<char>,
}

impl SpriteSet {
    /// Solid colour rendering for everything
    pub fn solid() -> Self {
        Self::default()
    }

    /// Load `sprites.json` from `assets_dir`; a missing or broken file means solid blocks
    pub fn load_or_default(assets_dir: Option<&Path>) -> Self {
        let Some(dir) = assets_dir else {
            return Self::solid();
        };
        let path = dir.join(SPRITES_FILE);

        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not read sprites from {:?}: {}, drawing solid blocks", path, e);
                return Self::solid();
            }
        };

        match serde_json::from_str::<SpriteSet>(&json) {
            Ok(sprites) => {
                info!("Loaded sprites from {:?}", path);
                sprites
            }
            Err(e) => {
                warn!("Invalid sprites file {:?}: {}, drawing solid blocks", path, e);
                Self::solid()
            }
        }
    }
}
