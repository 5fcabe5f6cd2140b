//! Catch detection
//!
//! Fruit and basket are both treated as axis-aligned boxes around their
//! centers. Touching edges do not count as an overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fruit::{FruitCollection, FruitId};
use super::state::{Basket, GameEvent};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box centered on `center` spanning `size`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap test
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Catch every live fruit overlapping the basket.
///
/// Caught fruit is marked non-collectable and removed from the collection.
/// Returns one `Caught` event per fruit, in id order.
pub fn check_catch(basket: &Basket, fruits: &mut FruitCollection) -> Vec<GameEvent> {
    let basket_box = basket.bounds();

    let caught: Vec<FruitId> = fruits
        .iter_active()
        .filter(|f| f.collectable && f.bounds().intersects(&basket_box))
        .map(|f| f.id)
        .collect();

    caught
        .into_iter()
        .filter_map(|id| {
            let fruit = fruits.get_mut(id)?;
            fruit.collectable = false;
            fruits.remove(id);
            Some(GameEvent::Caught { id })
        })
        .collect()
}
