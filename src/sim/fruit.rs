//! Fruit entities and the collection that owns them

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::FRUIT_SIZE;

/// Stable fruit identifier (allocated in increasing order)
pub type FruitId = u32;

/// Fruit types - purely cosmetic, every fruit is worth one point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FruitKind {
    Apple,
    Banana,
    Cherries,
}

impl FruitKind {
    pub const ALL: [FruitKind; 3] = [FruitKind::Apple, FruitKind::Banana, FruitKind::Cherries];

    /// Texture key the presentation layer uses for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FruitKind::Apple => "apple",
            FruitKind::Banana => "banana",
            FruitKind::Cherries => "cherries",
        }
    }
}

/// A falling fruit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fruit {
    pub id: FruitId,
    pub kind: FruitKind,
    /// Center position
    pub pos: Vec2,
    /// Displayed size (after scale)
    pub size: Vec2,
    /// Cleared once caught or missed, so each fruit scores or costs at most once
    pub collectable: bool,
    /// Cleared when the fruit is removed from play
    pub active: bool,
}

impl Fruit {
    pub fn new(id: FruitId, kind: FruitKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            size: Vec2::splat(FRUIT_SIZE),
            collectable: true,
            active: true,
        }
    }

    /// Still eligible for catch/miss evaluation
    #[inline]
    pub fn is_live(&self) -> bool {
        self.active && self.collectable
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// Y coordinate of the bottom edge
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }
}

/// All fruit currently in play, iterated in id order for determinism
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FruitCollection {
    fruits: BTreeMap<FruitId, Fruit>,
    next_id: FruitId,
}

impl Default for FruitCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl FruitCollection {
    pub fn new() -> Self {
        Self {
            fruits: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a new fruit ID
    fn next_fruit_id(&mut self) -> FruitId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create a fruit at `pos` and return its id
    pub fn spawn(&mut self, kind: FruitKind, pos: Vec2) -> FruitId {
        let id = self.next_fruit_id();
        self.fruits.insert(id, Fruit::new(id, kind, pos));
        id
    }

    pub fn get(&self, id: FruitId) -> Option<&Fruit> {
        self.fruits.get(&id)
    }

    pub fn get_mut(&mut self, id: FruitId) -> Option<&mut Fruit> {
        self.fruits.get_mut(&id)
    }

    pub fn contains(&self, id: FruitId) -> bool {
        self.fruits.contains_key(&id)
    }

    /// Remove a fruit from play. The returned fruit is marked inactive.
    pub fn remove(&mut self, id: FruitId) -> Option<Fruit> {
        let mut fruit = self.fruits.remove(&id)?;
        fruit.active = false;
        fruit.collectable = false;
        Some(fruit)
    }

    /// Drop every fruit, returning the ids that were in play
    pub fn clear(&mut self) -> Vec<FruitId> {
        let ids = self.fruits.keys().copied().collect();
        self.fruits.clear();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fruit> {
        self.fruits.values()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Fruit> {
        self.fruits.values().filter(|f| f.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Fruit> {
        self.fruits.values_mut().filter(|f| f.active)
    }

    pub fn len(&self) -> usize {
        self.fruits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }
}
