//! Engine configuration resource.
//!
//! Playfield dimensions, grid size, frame rate and engine limits, loaded
//! from an INI file. Every key is optional; missing keys keep their
//! defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 800
//! height = 800
//! fps = 60
//! title = Gridplay
//!
//! [grid]
//! size = 50
//!
//! [engine]
//! max_entities = 9000
//! seed = 0
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 800;
const DEFAULT_FPS: u32 = 60;
const DEFAULT_TITLE: &str = "Gridplay";
const DEFAULT_GRID_SIZE: u32 = 50;
const DEFAULT_MAX_ENTITIES: usize = 9000;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Playfield width in pixels.
    pub width: u32,
    /// Playfield height in pixels.
    pub height: u32,
    pub fps: u32,
    pub title: String,
    /// Side of one grid cell in pixels.
    pub grid_size: u32,
    /// Spawning beyond this many sprites fails.
    pub max_entities: usize,
    /// Random seed; 0 picks one at startup.
    pub seed: u64,
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            title: DEFAULT_TITLE.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            max_entities: DEFAULT_MAX_ENTITIES,
            seed: 0,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    pub fn load_from_file(&mut self) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to load {:?}: {}", self.config_path, e)))?;
        self.apply(&config);

        info!(
            "Loaded config: {}x{} playfield, grid={}, fps={}, max_entities={}, seed={}",
            self.width, self.height, self.grid_size, self.fps, self.max_entities, self.seed
        );
        Ok(())
    }

    /// Same as [`load_from_file`](Self::load_from_file) but from INI text.
    pub fn load_from_str(&mut self, text: &str) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| EngineError::Config(format!("failed to parse: {}", e)))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "fps").ok().flatten() {
            self.fps = (fps as u32).max(1);
        }
        if let Some(title) = config.get("window", "title") {
            self.title = title;
        }

        // [grid] section
        if let Some(size) = config.getuint("grid", "size").ok().flatten() {
            self.grid_size = (size as u32).max(1);
        }

        // [engine] section
        if let Some(max) = config.getuint("engine", "max_entities").ok().flatten() {
            self.max_entities = max as usize;
        }
        if let Some(seed) = config.getuint("engine", "seed").ok().flatten() {
            self.seed = seed;
        }
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> EngineResult<()> {
        let mut config = Ini::new();

        config.set("window", "width", Some(self.width.to_string()));
        config.set("window", "height", Some(self.height.to_string()));
        config.set("window", "fps", Some(self.fps.to_string()));
        config.set("window", "title", Some(self.title.clone()));
        config.set("grid", "size", Some(self.grid_size.to_string()));
        config.set("engine", "max_entities", Some(self.max_entities.to_string()));
        config.set("engine", "seed", Some(self.seed.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to save {:?}: {}", self.config_path, e)))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    /// Playfield size in whole cells.
    pub fn grid_dimensions(&self) -> (u32, u32) {
        (self.width / self.grid_size, self.height / self.grid_size)
    }
}
