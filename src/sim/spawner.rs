//! Fruit spawning and lifetime expiry
//!
//! The spawner runs off the scheduler rather than frame time, so spawn cadence
//! stays steady whatever the frame rate is.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::fruit::{FruitCollection, FruitId, FruitKind};
use super::scheduler::{Scheduler, TimerId};
use super::state::{GameEvent, GameState};
use crate::tuning::Tuning;

/// Work carried by session timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerTask {
    /// Periodic spawn
    Spawn,
    /// Lifetime of a fruit ran out
    Expire(FruitId),
}

/// Periodic fruit generator
#[derive(Debug, Clone)]
pub struct Spawner {
    spawn_rate_ms: u64,
    fruit_lifetime_ms: u64,
    x_min: u32,
    x_max: u32,
    timer: Option<TimerId>,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            spawn_rate_ms: tuning.spawn_rate_ms,
            fruit_lifetime_ms: tuning.fruit_lifetime_ms,
            x_min: tuning.spawn_x_min.min(tuning.spawn_x_max),
            x_max: tuning.spawn_x_max.max(tuning.spawn_x_min),
            timer: None,
        }
    }

    /// Arm the repeating spawn timer (no-op if already running)
    pub fn start(&mut self, scheduler: &mut Scheduler<TimerTask>) {
        if self.timer.is_none() {
            self.timer = Some(scheduler.schedule_repeating(self.spawn_rate_ms, TimerTask::Spawn));
        }
    }

    /// Cancel the spawn timer
    pub fn stop(&mut self, scheduler: &mut Scheduler<TimerTask>) {
        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Spawn one fruit at the top of the world and schedule its expiry.
    ///
    /// Does nothing once the game is over.
    pub fn tick(
        &mut self,
        state: &GameState,
        fruits: &mut FruitCollection,
        rng: &mut Pcg32,
        scheduler: &mut Scheduler<TimerTask>,
    ) -> Option<GameEvent> {
        if state.is_over() {
            return None;
        }

        let kind = FruitKind::ALL[rng.random_range(0..FruitKind::ALL.len())];
        let x = rng.random_range(self.x_min..=self.x_max);
        let id = fruits.spawn(kind, Vec2::new(x as f32, 0.0));
        scheduler.schedule_once(self.fruit_lifetime_ms, TimerTask::Expire(id));

        Some(GameEvent::Spawned { id, kind, x })
    }
}

/// Remove a fruit whose lifetime ran out.
///
/// Stale timers (fruit already caught, missed and removed, or cleared) are a no-op.
pub fn expire(fruits: &mut FruitCollection, id: FruitId) -> Option<GameEvent> {
    if !fruits.get(id).is_some_and(|f| f.active) {
        return None;
    }
    fruits.remove(id)?;
    Some(GameEvent::Expired { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    struct Rig {
        spawner: Spawner,
        state: GameState,
        fruits: FruitCollection,
        rng: Pcg32,
        scheduler: Scheduler<TimerTask>,
    }

    impl Rig {
        fn new() -> Self {
            let tuning = Tuning::default();
            let mut rig = Self {
                spawner: Spawner::new(&tuning),
                state: GameState::default(),
                fruits: FruitCollection::new(),
                rng: Pcg32::seed_from_u64(7),
                scheduler: Scheduler::new(),
            };
            rig.spawner.start(&mut rig.scheduler);
            rig
        }

        /// Advance the clock, handling timers like the session does
        fn advance(&mut self, ms: u64) -> Vec<GameEvent> {
            let until = self.scheduler.now() + ms;
            let mut events = Vec::new();
            while let Some(task) = self.scheduler.pop_due(until) {
                let event = match task {
                    TimerTask::Spawn => self.spawner.tick(
                        &self.state,
                        &mut self.fruits,
                        &mut self.rng,
                        &mut self.scheduler,
                    ),
                    TimerTask::Expire(id) => expire(&mut self.fruits, id),
                };
                events.extend(event);
            }
            self.scheduler.settle(until);
            events
        }
    }

    #[test]
    fn spawns_on_interval() {
        let mut rig = Rig::new();
        assert!(rig.advance(1999).is_empty());
        let events = rig.advance(1);
        assert!(matches!(events.as_slice(), [GameEvent::Spawned { .. }]));
        assert_eq!(rig.fruits.len(), 1);
    }

    #[test]
    fn spawn_position_in_range() {
        let mut rig = Rig::new();
        let events = rig.advance(2000 * 50);
        for fruit in rig.fruits.iter() {
            assert!((50.0..=750.0).contains(&fruit.pos.x));
            assert_eq!(fruit.pos.y, 0.0);
            assert!(fruit.collectable && fruit.active);
        }

        let kinds: HashSet<FruitKind> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Spawned { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds.len(), FruitKind::ALL.len());
    }

    #[test]
    fn fruit_expires_after_lifetime() {
        let mut rig = Rig::new();
        rig.advance(2000);
        let id = rig.fruits.iter().next().unwrap().id;

        // Spawned at 2000, expires at 7000; spawns at 4000 and 6000 in between
        let events = rig.advance(4999);
        assert!(!events.contains(&GameEvent::Expired { id }));
        let events = rig.advance(1);
        assert_eq!(events, vec![GameEvent::Expired { id }]);
        assert!(!rig.fruits.contains(id));
    }

    #[test]
    fn stale_expiry_is_noop() {
        let mut rig = Rig::new();
        rig.advance(2000);
        let id = rig.fruits.iter().next().unwrap().id;
        rig.fruits.remove(id);

        let events = rig.advance(5000);
        assert!(!events.contains(&GameEvent::Expired { id }));
    }

    #[test]
    fn no_spawn_after_game_over() {
        let mut rig = Rig::new();
        rig.state = GameState::new(1);
        rig.state.apply(&GameEvent::Missed { id: 0 });
        assert!(rig.advance(10_000).is_empty());
        assert!(rig.fruits.is_empty());
    }

    #[test]
    fn stop_cancels_timer() {
        let mut rig = Rig::new();
        rig.spawner.stop(&mut rig.scheduler);
        rig.spawner.stop(&mut rig.scheduler);
        assert!(!rig.spawner.is_running());
        assert!(rig.advance(10_000).is_empty());
    }

    #[test]
    fn same_seed_same_spawns() {
        let mut a = Rig::new();
        let mut b = Rig::new();
        assert_eq!(a.advance(20_000), b.advance(20_000));
    }
}
