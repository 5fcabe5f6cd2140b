//! Game state and core simulation types
//!
//! Score, lives and the Playing/GameOver state machine live here, along with
//! the basket the player steers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::fruit::{FruitId, FruitKind};
use crate::clamp_basket_x;
use crate::consts::START_LIVES;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended, waiting for a restart
    GameOver,
}

/// Something that happened to a fruit during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: FruitId, kind: FruitKind, x: u32 },
    Caught { id: FruitId },
    Missed { id: FruitId },
    /// Lifetime ran out before the fruit was caught or missed
    Expired { id: FruitId },
}

/// Tracker output for the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    ScoreChanged(u32),
    LivesChanged(u8),
    GameOver { score: u32, high_score: u32 },
}

/// The player's basket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Basket {
    /// Center x
    pub x: f32,
    /// Center y (fixed)
    pub y: f32,
    pub size: Vec2,
    /// Cleared at game over so input stops moving it
    pub enabled: bool,
}

impl Basket {
    pub fn new(x: f32, y: f32, size: Vec2) -> Self {
        Self {
            x,
            y,
            size,
            enabled: true,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.size.x.abs() / 2.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(Vec2::new(self.x, self.y), self.size)
    }

    /// Move horizontally by `dx`, staying inside `[0, world_width]`
    pub fn nudge(&mut self, dx: f32, world_width: f32) {
        if !self.enabled {
            return;
        }
        self.x = clamp_basket_x(self.x + dx, self.half_width(), world_width);
    }
}

/// Score and lives for one run, plus the best score seen in this process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub score: u32,
    pub lives: u8,
    pub high_score: u32,
    pub phase: GamePhase,
    /// Lives a fresh run starts with
    start_lives: u8,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(START_LIVES)
    }
}

impl GameState {
    /// Fresh run. `start_lives` is clamped to `1..=START_LIVES`.
    pub fn new(start_lives: u8) -> Self {
        let start_lives = start_lives.clamp(1, START_LIVES);
        Self {
            score: 0,
            lives: start_lives,
            high_score: 0,
            phase: GamePhase::Playing,
            start_lives,
        }
    }

    /// Fresh run that remembers the high score
    pub fn next_game(&self) -> Self {
        Self {
            high_score: self.high_score,
            ..Self::new(self.start_lives)
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Apply a fruit event. Frozen once the game is over.
    pub fn apply(&mut self, event: &GameEvent) -> Vec<Notice> {
        if self.is_over() {
            return Vec::new();
        }

        match event {
            GameEvent::Caught { .. } => {
                self.score = self.score.saturating_add(1);
                vec![Notice::ScoreChanged(self.score)]
            }
            GameEvent::Missed { .. } => {
                if self.lives == 0 {
                    return Vec::new();
                }
                self.lives -= 1;
                let mut notices = vec![Notice::LivesChanged(self.lives)];
                if self.lives == 0 {
                    self.phase = GamePhase::GameOver;
                    self.high_score = self.high_score.max(self.score);
                    notices.push(Notice::GameOver {
                        score: self.score,
                        high_score: self.high_score,
                    });
                }
                notices
            }
            GameEvent::Spawned { .. } | GameEvent::Expired { .. } => Vec::new(),
        }
    }
}
