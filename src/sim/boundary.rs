//! Floor check for fruit that slipped past the basket

use super::fruit::FruitCollection;
use super::state::GameEvent;

/// Flag every live fruit whose bottom edge reached `world_bottom`.
///
/// Missed fruit stays in the collection but is no longer collectable, so it
/// is reported once no matter how many frames it sits on the floor.
pub fn check_missed(fruits: &mut FruitCollection, world_bottom: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for fruit in fruits.iter_active_mut() {
        if fruit.collectable && fruit.bottom() >= world_bottom {
            fruit.collectable = false;
            events.push(GameEvent::Missed { id: fruit.id });
        }
    }
    events
}
