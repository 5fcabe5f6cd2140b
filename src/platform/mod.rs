//! Platform abstraction layer
//!
//! Contracts the presentation side implements for the core:
//! - Entities (create/destroy sprites, report displayed geometry)
//! - Input (two directional buttons, polled once per frame)
//! - Notifications (score, lives, game over)
//!
//! Timers are not here: the session owns its own `Scheduler`.

pub mod headless;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{FrameInput, FruitKind};

pub use headless::KinematicHost;

/// Opaque handle to a host-side visual entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u32);

/// Displayed geometry of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Center position
    pub pos: Vec2,
    /// Size after scale
    pub size: Vec2,
}

/// The engine side of fruit entities
pub trait EntityHost {
    /// Create a visual fruit centered at `pos`
    fn create_entity(&mut self, pos: Vec2, kind: FruitKind) -> EntityHandle;

    /// Remove a visual entity. Must tolerate handles that are already gone.
    fn destroy_entity(&mut self, handle: EntityHandle);

    /// Current geometry, or `None` if the entity no longer exists
    fn entity_geometry(&self, handle: EntityHandle) -> Option<Geometry>;

    /// Let the host move its entities. Engines that integrate motion on their
    /// own leave this empty.
    fn step(&mut self, _delta_ms: f32) {}
}

/// Directional input, polled once per frame
pub trait InputSource {
    fn read_input(&mut self) -> FrameInput;
}

impl InputSource for FrameInput {
    fn read_input(&mut self) -> FrameInput {
        *self
    }
}

/// UI hooks for score/lives text and the game-over panel
pub trait GameObserver {
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_lives_changed(&mut self, _lives: u8) {}
    fn on_game_over(&mut self, _score: u32, _high_score: u32) {}
}

impl GameObserver for () {}

/// Observer that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl GameObserver for LogObserver {
    fn on_score_changed(&mut self, score: u32) {
        log::info!("Score: {}", score);
    }

    fn on_lives_changed(&mut self, lives: u8) {
        log::info!("Lives: {}", lives);
    }

    fn on_game_over(&mut self, score: u32, high_score: u32) {
        log::info!("Game Over - score {} (high score {})", score, high_score);
    }
}
