//! Per-frame simulation step
//!
//! Order matters: move the basket, then catch, then floor check. Catching
//! first means a fruit that is both in the basket and touching the floor
//! counts as caught.

use serde::{Deserialize, Serialize};

use super::boundary::check_missed;
use super::collision::check_catch;
use super::fruit::FruitCollection;
use super::state::{Basket, GameEvent, GameState, Notice};
use crate::clamp_frame_ms;
use crate::tuning::Tuning;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
}

impl FrameInput {
    /// -1, 0 or +1 (both keys cancel out)
    #[inline]
    pub fn direction(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub events: Vec<GameEvent>,
    pub notices: Vec<Notice>,
}

/// Advance the world by one rendered frame.
///
/// Returns immediately once the game is over.
pub fn update(
    state: &mut GameState,
    basket: &mut Basket,
    fruits: &mut FruitCollection,
    input: &FrameInput,
    delta_ms: f32,
    tuning: &Tuning,
) -> FrameOutcome {
    let mut outcome = FrameOutcome::default();
    if state.is_over() {
        return outcome;
    }

    let delta_ms = clamp_frame_ms(delta_ms);
    let dx = input.direction() * tuning.basket_speed * delta_ms / 1000.0;
    basket.nudge(dx, tuning.world_width);

    outcome.events.extend(check_catch(basket, fruits));

    let missed = check_missed(fruits, tuning.world_height);
    if tuning.remove_missed_fruit {
        for event in &missed {
            if let GameEvent::Missed { id } = event {
                fruits.remove(*id);
            }
        }
    }
    outcome.events.extend(missed);

    for event in &outcome.events {
        outcome.notices.extend(state.apply(event));
    }

    outcome
}
