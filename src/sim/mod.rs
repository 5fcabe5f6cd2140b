//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (no wall time)
//! - Seeded RNG only
//! - Stable iteration order (by fruit ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod boundary;
pub mod collision;
pub mod fruit;
pub mod scheduler;
pub mod spawner;
pub mod state;
pub mod tick;

pub use boundary::check_missed;
pub use collision::{Aabb, check_catch};
pub use fruit::{Fruit, FruitCollection, FruitId, FruitKind};
pub use scheduler::{Scheduler, TimerId};
pub use spawner::{Spawner, TimerTask, expire};
pub use state::{Basket, GameEvent, GamePhase, GameState, Notice};
pub use tick::{FrameInput, FrameOutcome, update};
