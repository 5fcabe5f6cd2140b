//! Fruit Catch - catch falling fruit in a basket
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, catching, lives, game over)
//! - `game`: Session that wires the simulation to its host
//! - `platform`: Engine-facing contracts (entities, input, notifications)
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use game::{Session, Snapshot};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// World dimensions (pixels)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Basket defaults - sits near the bottom edge, starts centered
    pub const BASKET_START_X: f32 = 400.0;
    pub const BASKET_Y: f32 = 550.0;
    pub const BASKET_WIDTH: f32 = 100.0;
    pub const BASKET_HEIGHT: f32 = 50.0;
    /// Horizontal basket speed (pixels per second)
    pub const BASKET_SPEED: f32 = 300.0;

    /// Fruit defaults
    pub const FRUIT_SIZE: f32 = 40.0;
    /// Spawn column range, inclusive
    pub const SPAWN_X_MIN: u32 = 50;
    pub const SPAWN_X_MAX: u32 = 750;
    /// Downward acceleration for the headless host (pixels/s²)
    pub const FALL_GRAVITY: f32 = 300.0;

    /// Timers (milliseconds)
    pub const SPAWN_RATE_MS: u64 = 2000;
    pub const FRUIT_LIFETIME_MS: u64 = 5000;

    pub const START_LIVES: u8 = 3;

    /// Longest frame the loop driver will integrate movement over
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Most wall time a single frame may feed the timer clock (ms). Anything
    /// beyond this (a suspended tab, a bogus host delta) is dropped.
    pub const MAX_CATCHUP_MS: u64 = 1000;
}

/// Clamp a basket center so the whole basket stays inside the world.
///
/// A basket wider than the world is pinned to the center.
#[inline]
pub fn clamp_basket_x(x: f32, half_width: f32, world_width: f32) -> f32 {
    let lo = half_width;
    let hi = world_width - half_width;
    if lo > hi {
        return world_width / 2.0;
    }
    if x.is_nan() {
        return lo;
    }
    x.clamp(lo, hi)
}

/// Sanitize a frame delta (milliseconds) to `[0, MAX_FRAME_MS]`
#[inline]
pub fn clamp_frame_ms(delta_ms: f32) -> f32 {
    if delta_ms.is_nan() {
        return 0.0;
    }
    delta_ms.clamp(0.0, consts::MAX_FRAME_MS)
}
