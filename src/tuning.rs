//! Data-driven game balance
//!
//! Loaded from JSON (a file on native, LocalStorage on web). Missing fields
//! fall back to the defaults in `consts`.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Basket;

/// Error loading tuning data
#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "failed to read tuning file: {}", e),
            TuningError::Parse(e) => write!(f, "invalid tuning JSON: {}", e),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(e) => Some(e),
            TuningError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

/// Game balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timers ===
    /// Interval between spawns (ms)
    pub spawn_rate_ms: u64,
    /// How long an uncaught fruit stays in play (ms)
    pub fruit_lifetime_ms: u64,

    // === Player ===
    /// Basket speed (pixels per second)
    pub basket_speed: f32,
    /// Lives at the start of a run (1-3)
    pub start_lives: u8,
    pub basket_start_x: f32,
    pub basket_y: f32,
    pub basket_width: f32,
    pub basket_height: f32,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Spawn column range, inclusive
    pub spawn_x_min: u32,
    pub spawn_x_max: u32,

    // === Fruit ===
    /// Displayed fruit size for the headless host
    pub fruit_size: f32,
    /// Fall acceleration for the headless host (pixels/s²)
    pub fall_gravity: f32,
    /// Take missed fruit out of play right away instead of letting it expire
    pub remove_missed_fruit: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_rate_ms: SPAWN_RATE_MS,
            fruit_lifetime_ms: FRUIT_LIFETIME_MS,

            basket_speed: BASKET_SPEED,
            start_lives: START_LIVES,
            basket_start_x: BASKET_START_X,
            basket_y: BASKET_Y,
            basket_width: BASKET_WIDTH,
            basket_height: BASKET_HEIGHT,

            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            spawn_x_min: SPAWN_X_MIN,
            spawn_x_max: SPAWN_X_MAX,

            fruit_size: FRUIT_SIZE,
            fall_gravity: FALL_GRAVITY,
            remove_missed_fruit: true,
        }
    }
}

impl Tuning {
    /// Parse tuning JSON and sanitize it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Load tuning from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Clamp out-of-range values, warning about each one
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.spawn_rate_ms == 0 {
            log::warn!("spawn_rate_ms must be positive, using {}", defaults.spawn_rate_ms);
            self.spawn_rate_ms = defaults.spawn_rate_ms;
        }
        if !(1..=START_LIVES).contains(&self.start_lives) {
            let clamped = self.start_lives.clamp(1, START_LIVES);
            log::warn!("start_lives {} out of range, using {}", self.start_lives, clamped);
            self.start_lives = clamped;
        }
        for (name, value, fallback) in [
            ("world_width", &mut self.world_width, defaults.world_width),
            ("world_height", &mut self.world_height, defaults.world_height),
            ("basket_width", &mut self.basket_width, defaults.basket_width),
            ("basket_height", &mut self.basket_height, defaults.basket_height),
            ("fruit_size", &mut self.fruit_size, defaults.fruit_size),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("{} must be positive, using {}", name, fallback);
                *value = fallback;
            }
        }
        for (name, value, fallback) in [
            ("basket_speed", &mut self.basket_speed, defaults.basket_speed),
            ("fall_gravity", &mut self.fall_gravity, defaults.fall_gravity),
            ("basket_start_x", &mut self.basket_start_x, defaults.basket_start_x),
            ("basket_y", &mut self.basket_y, defaults.basket_y),
        ] {
            if !value.is_finite() || *value < 0.0 {
                log::warn!("{} must be non-negative, using {}", name, fallback);
                *value = fallback;
            }
        }
        if self.spawn_x_min > self.spawn_x_max {
            log::warn!(
                "spawn_x_min {} > spawn_x_max {}, swapping",
                self.spawn_x_min,
                self.spawn_x_max
            );
            std::mem::swap(&mut self.spawn_x_min, &mut self.spawn_x_max);
        }

        self
    }

    /// Basket at its starting position
    pub fn basket(&self) -> Basket {
        let mut basket = Basket::new(
            self.basket_start_x,
            self.basket_y,
            Vec2::new(self.basket_width, self.basket_height),
        );
        basket.nudge(0.0, self.world_width);
        basket
    }

    /// LocalStorage key for hand-edited tuning JSON
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "fruit_catch_tuning";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }
}
