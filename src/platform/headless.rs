//! Headless entity host
//!
//! Fruit falls straight down under constant acceleration and comes to rest on
//! the floor. No bounce, no collisions between bodies.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{EntityHandle, EntityHost, Geometry};
use crate::sim::FruitKind;
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
struct Body {
    pos: Vec2,
    vel: Vec2,
    size: Vec2,
}

/// Simple falling-body host for tests, the native demo and the web build
#[derive(Debug, Clone)]
pub struct KinematicHost {
    bodies: BTreeMap<EntityHandle, Body>,
    next_handle: u32,
    gravity: f32,
    floor: f32,
    fruit_size: Vec2,
}

impl KinematicHost {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_handle: 1,
            gravity: tuning.fall_gravity,
            floor: tuning.world_height,
            fruit_size: Vec2::splat(tuning.fruit_size),
        }
    }

    /// Teleport an entity (tests use this to stage collisions)
    pub fn set_position(&mut self, handle: EntityHandle, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = pos;
            body.vel = Vec2::ZERO;
        }
    }

    /// Live entities with their geometry, in creation order
    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, Geometry)> + '_ {
        self.bodies.iter().map(|(h, b)| {
            (
                *h,
                Geometry {
                    pos: b.pos,
                    size: b.size,
                },
            )
        })
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl EntityHost for KinematicHost {
    /// Every kind gets the same box; sprites are the renderer's business
    fn create_entity(&mut self, pos: Vec2, _kind: FruitKind) -> EntityHandle {
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            Body {
                pos,
                vel: Vec2::ZERO,
                size: self.fruit_size,
            },
        );
        handle
    }

    fn destroy_entity(&mut self, handle: EntityHandle) {
        self.bodies.remove(&handle);
    }

    fn entity_geometry(&self, handle: EntityHandle) -> Option<Geometry> {
        self.bodies.get(&handle).map(|b| Geometry {
            pos: b.pos,
            size: b.size,
        })
    }

    fn step(&mut self, delta_ms: f32) {
        let dt = delta_ms / 1000.0;
        for body in self.bodies.values_mut() {
            body.vel.y += self.gravity * dt;
            body.pos += body.vel * dt;

            let rest_y = self.floor - body.size.y / 2.0;
            if body.pos.y >= rest_y {
                body.pos.y = rest_y;
                body.vel = Vec2::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_fall_and_rest_on_floor() {
        let tuning = Tuning::default();
        let mut host = KinematicHost::new(&tuning);
        let handle = host.create_entity(Vec2::new(100.0, 0.0), FruitKind::Apple);

        host.step(500.0);
        let y = host.entity_geometry(handle).unwrap().pos.y;
        assert!(y > 0.0);

        for _ in 0..100 {
            host.step(100.0);
        }
        let geometry = host.entity_geometry(handle).unwrap();
        assert_eq!(
            geometry.pos.y + geometry.size.y / 2.0,
            tuning.world_height
        );
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut host = KinematicHost::new(&Tuning::default());
        let handle = host.create_entity(Vec2::ZERO, FruitKind::Banana);
        host.destroy_entity(handle);
        host.destroy_entity(handle);
        assert!(host.entity_geometry(handle).is_none());
        assert!(host.is_empty());
    }
}
