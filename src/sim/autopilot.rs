//! Idle/demo mode - steer the basket toward the most urgent fruit

use super::fruit::FruitCollection;
use super::state::Basket;
use super::tick::FrameInput;

/// Chase the lowest live fruit. Within `deadzone` pixels the basket holds still.
pub fn steer(basket: &Basket, fruits: &FruitCollection, deadzone: f32) -> FrameInput {
    let target = fruits
        .iter_active()
        .filter(|f| f.collectable)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let Some(fruit) = target else {
        return FrameInput::default();
    };

    let offset = fruit.pos.x - basket.x;
    FrameInput {
        left: offset < -deadzone,
        right: offset > deadzone,
    }
}
