//! Game session
//!
//! Owns everything one play session needs (state, basket, fruit, timers, RNG)
//! and connects the pure simulation to the host engine: sprites are created
//! and destroyed through `EntityHost`, geometry is read back each frame, and
//! score/lives changes go out through `GameObserver`.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{clamp_frame_ms, consts};
use crate::platform::{EntityHandle, EntityHost, GameObserver, InputSource};
use crate::sim::{
    self, Basket, Fruit, FruitCollection, FruitId, FrameOutcome, GameEvent, GameState, Notice,
    Scheduler, Spawner, TimerTask,
};
use crate::tuning::Tuning;

/// Serializable view of a session for HUDs and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub seed: u64,
    /// Session clock (ms)
    pub time_ms: u64,
    pub state: GameState,
    pub basket: Basket,
    pub fruits: Vec<Fruit>,
}

/// One play session, from first spawn through any number of restarts
pub struct Session<H: EntityHost, O: GameObserver = ()> {
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    state: GameState,
    basket: Basket,
    fruits: FruitCollection,
    /// Host entity for each fruit in play
    handles: BTreeMap<FruitId, EntityHandle>,
    spawner: Spawner,
    scheduler: Scheduler<TimerTask>,
    /// Sub-millisecond remainder from `frame`
    clock_carry: f32,
    host: H,
    observer: O,
}

impl<H: EntityHost, O: GameObserver> Session<H, O> {
    /// Start a new session. The spawner is armed immediately.
    pub fn new(tuning: Tuning, seed: u64, host: H, observer: O) -> Self {
        let tuning = tuning.sanitized();
        let mut session = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            state: GameState::new(tuning.start_lives),
            basket: tuning.basket(),
            fruits: FruitCollection::new(),
            handles: BTreeMap::new(),
            spawner: Spawner::new(&tuning),
            scheduler: Scheduler::new(),
            clock_carry: 0.0,
            host,
            observer,
            tuning,
        };
        session.begin();
        log::info!("Session started with seed {}", seed);
        session
    }

    fn begin(&mut self) {
        self.spawner.start(&mut self.scheduler);
        self.observer.on_score_changed(self.state.score);
        self.observer.on_lives_changed(self.state.lives);
    }

    /// One rendered frame: advance timers by the frame's wall time (at most
    /// `MAX_CATCHUP_MS`), then run the per-frame update.
    pub fn frame(&mut self, delta_ms: f32, input: &mut impl InputSource) -> FrameOutcome {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.clock_carry += delta_ms;
        }
        let whole = self.clock_carry.floor();
        self.clock_carry -= whole;
        let elapsed = (whole as u64).min(consts::MAX_CATCHUP_MS);

        let mut events = self.advance_clock(elapsed);
        let mut outcome = self.update(delta_ms, input);
        events.append(&mut outcome.events);
        outcome.events = events;
        outcome
    }

    /// Advance the session clock, firing spawn and expiry timers in order
    pub fn advance_clock(&mut self, elapsed_ms: u64) -> Vec<GameEvent> {
        let until = self.scheduler.now().saturating_add(elapsed_ms);
        let mut events = Vec::new();
        while let Some(task) = self.scheduler.pop_due(until) {
            let event = match task {
                TimerTask::Spawn => self.spawn_fruit(),
                TimerTask::Expire(id) => self.expire_fruit(id),
            };
            events.extend(event);
        }
        self.scheduler.settle(until);
        events
    }

    /// Per-frame update: basket movement, catch check, floor check.
    ///
    /// Does nothing once the game is over.
    pub fn update(&mut self, delta_ms: f32, input: &mut impl InputSource) -> FrameOutcome {
        if self.state.is_over() {
            return FrameOutcome::default();
        }

        let input = input.read_input();
        self.host.step(clamp_frame_ms(delta_ms));
        self.sync_geometry();

        let outcome = sim::update(
            &mut self.state,
            &mut self.basket,
            &mut self.fruits,
            &input,
            delta_ms,
            &self.tuning,
        );

        for event in &outcome.events {
            match event {
                GameEvent::Caught { id } => log::debug!("Caught fruit #{}", id),
                GameEvent::Missed { id } => log::debug!("Missed fruit #{}", id),
                _ => {}
            }
        }

        self.reap();
        self.dispatch(&outcome.notices);
        outcome
    }

    /// Start over after a game over (the "press any key" path).
    ///
    /// Returns false while a game is still running.
    pub fn restart(&mut self) -> bool {
        if !self.state.is_over() {
            return false;
        }

        for (_, handle) in std::mem::take(&mut self.handles) {
            self.host.destroy_entity(handle);
        }
        self.fruits.clear();
        self.spawner.stop(&mut self.scheduler);
        self.scheduler.cancel_all();
        self.state = self.state.next_game();
        self.basket = self.tuning.basket();
        self.clock_carry = 0.0;
        self.begin();

        log::info!("Game restarted (high score {})", self.state.high_score);
        true
    }

    fn spawn_fruit(&mut self) -> Option<GameEvent> {
        let event = self.spawner.tick(
            &self.state,
            &mut self.fruits,
            &mut self.rng,
            &mut self.scheduler,
        )?;

        if let GameEvent::Spawned { id, kind, x } = event {
            let handle = self.host.create_entity(Vec2::new(x as f32, 0.0), kind);
            self.handles.insert(id, handle);
            if let (Some(fruit), Some(geometry)) =
                (self.fruits.get_mut(id), self.host.entity_geometry(handle))
            {
                fruit.pos = geometry.pos;
                fruit.size = geometry.size;
            }
            log::debug!(
                "Spawned {} #{} at x={} (t={}ms)",
                kind.as_str(),
                id,
                x,
                self.scheduler.now()
            );
        }

        Some(event)
    }

    fn expire_fruit(&mut self, id: FruitId) -> Option<GameEvent> {
        let event = sim::expire(&mut self.fruits, id)?;
        log::debug!("Fruit #{} expired", id);
        self.reap();
        Some(event)
    }

    /// Copy displayed geometry from the host into each fruit in play
    fn sync_geometry(&mut self) {
        let mut lost = Vec::new();
        for fruit in self.fruits.iter_active_mut() {
            let Some(handle) = self.handles.get(&fruit.id) else {
                continue;
            };
            match self.host.entity_geometry(*handle) {
                Some(geometry) => {
                    fruit.pos = geometry.pos;
                    fruit.size = geometry.size;
                }
                None => lost.push(fruit.id),
            }
        }

        for id in lost {
            log::warn!("Fruit #{} lost its entity, dropping it", id);
            self.fruits.remove(id);
            self.handles.remove(&id);
        }
    }

    /// Destroy host entities whose fruit is no longer in play
    fn reap(&mut self) {
        let fruits = &self.fruits;
        let host = &mut self.host;
        self.handles.retain(|id, handle| {
            let alive = fruits.get(*id).is_some_and(|f| f.active);
            if !alive {
                host.destroy_entity(*handle);
            }
            alive
        });
    }

    fn dispatch(&mut self, notices: &[Notice]) {
        for notice in notices {
            match *notice {
                Notice::ScoreChanged(score) => self.observer.on_score_changed(score),
                Notice::LivesChanged(lives) => self.observer.on_lives_changed(lives),
                Notice::GameOver { score, high_score } => {
                    self.enter_game_over(score, high_score)
                }
            }
        }
    }

    /// Freeze the world: no more spawns or expiries, basket locked
    fn enter_game_over(&mut self, score: u32, high_score: u32) {
        self.spawner.stop(&mut self.scheduler);
        self.scheduler.cancel_all();
        self.basket.enabled = false;
        log::info!("Game over: score {}, high score {}", score, high_score);
        self.observer.on_game_over(score, high_score);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    pub fn fruits(&self) -> &FruitCollection {
        &self.fruits
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Session clock (ms)
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn is_spawning(&self) -> bool {
        self.spawner.is_running()
    }

    /// Host entity backing a fruit, if it is still in play
    pub fn entity_of(&self, id: FruitId) -> Option<EntityHandle> {
        self.handles.get(&id).copied()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            seed: self.seed,
            time_ms: self.scheduler.now(),
            state: self.state.clone(),
            basket: self.basket.clone(),
            fruits: self.fruits.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::KinematicHost;
    use crate::sim::{FrameInput, GamePhase};

    #[derive(Default)]
    struct Recorder {
        scores: Vec<u32>,
        lives: Vec<u8>,
        game_overs: Vec<(u32, u32)>,
    }

    impl GameObserver for Recorder {
        fn on_score_changed(&mut self, score: u32) {
            self.scores.push(score);
        }
        fn on_lives_changed(&mut self, lives: u8) {
            self.lives.push(lives);
        }
        fn on_game_over(&mut self, score: u32, high_score: u32) {
            self.game_overs.push((score, high_score));
        }
    }

    fn session() -> Session<KinematicHost, Recorder> {
        let tuning = Tuning::default();
        Session::new(
            tuning.clone(),
            1234,
            KinematicHost::new(&tuning),
            Recorder::default(),
        )
    }

    #[test]
    fn announces_initial_hud() {
        let session = session();
        assert_eq!(session.observer().scores, vec![0]);
        assert_eq!(session.observer().lives, vec![3]);
        assert!(session.is_spawning());
    }

    #[test]
    fn spawn_creates_entity() {
        let mut session = session();
        let events = session.advance_clock(2000);
        let Some(GameEvent::Spawned { id, .. }) = events.first().copied() else {
            panic!("expected a spawn, got {:?}", events);
        };
        assert_eq!(session.host().len(), 1);
        assert!(session.entity_of(id).is_some());
    }

    #[test]
    fn expiry_destroys_entity() {
        let mut session = session();
        session.advance_clock(2000);
        let id = session.fruits().iter().next().unwrap().id;

        let events = session.advance_clock(5000);
        assert!(events.contains(&GameEvent::Expired { id }));
        assert!(session.entity_of(id).is_none());
        assert!(!session.fruits().contains(id));
    }

    #[test]
    fn catch_destroys_entity_and_scores() {
        let mut session = session();
        session.advance_clock(2000);
        let id = session.fruits().iter().next().unwrap().id;
        let handle = session.entity_of(id).unwrap();
        let basket = session.basket().clone();
        session
            .host_mut()
            .set_position(handle, Vec2::new(basket.x, basket.y));

        let outcome = session.update(0.0, &mut FrameInput::default());
        assert_eq!(outcome.events, vec![GameEvent::Caught { id }]);
        assert_eq!(session.state().score, 1);
        assert!(session.host().entity_geometry(handle).is_none());
        assert_eq!(session.observer().scores, vec![0, 1]);
    }

    #[test]
    fn game_over_stops_everything() {
        let mut session = session();
        for _ in 0..3 {
            session.advance_clock(2000);
        }
        let handles: Vec<_> = session.host().entities().map(|(h, _)| h).collect();
        assert_eq!(handles.len(), 3);
        for handle in handles {
            session
                .host_mut()
                .set_position(handle, Vec2::new(100.0, 1000.0));
        }

        session.update(16.0, &mut FrameInput::default());
        assert_eq!(session.state().phase, GamePhase::GameOver);
        assert_eq!(session.observer().lives, vec![3, 2, 1, 0]);
        assert_eq!(session.observer().game_overs, vec![(0, 0)]);
        assert!(!session.is_spawning());
        assert!(!session.basket().enabled);

        // Frozen: no spawns, no movement
        assert!(session.advance_clock(60_000).is_empty());
        let x = session.basket().x;
        let mut right = FrameInput {
            left: false,
            right: true,
        };
        session.frame(100.0, &mut right);
        assert_eq!(session.basket().x, x);
    }

    #[test]
    fn restart_only_after_game_over() {
        let mut session = session();
        assert!(!session.restart());

        session.advance_clock(2000);
        let id = session.fruits().iter().next().unwrap().id;
        let handle = session.entity_of(id).unwrap();
        let basket = session.basket().clone();
        session
            .host_mut()
            .set_position(handle, Vec2::new(basket.x, basket.y));
        session.update(0.0, &mut FrameInput::default());

        for _ in 0..3 {
            session.advance_clock(2000);
            let handles: Vec<_> = session.host().entities().map(|(h, _)| h).collect();
            for handle in handles {
                session
                    .host_mut()
                    .set_position(handle, Vec2::new(100.0, 1000.0));
            }
            session.update(0.0, &mut FrameInput::default());
        }
        assert!(session.state().is_over());
        assert_eq!(session.state().high_score, 1);

        assert!(session.restart());
        assert_eq!(session.state().phase, GamePhase::Playing);
        assert_eq!(session.state().score, 0);
        assert_eq!(session.state().lives, 3);
        assert_eq!(session.state().high_score, 1);
        assert!(session.fruits().is_empty());
        assert!(session.host().is_empty());
        assert!(session.basket().enabled);
        assert!(session.is_spawning());

        let events = session.advance_clock(2000);
        assert!(matches!(events.as_slice(), [GameEvent::Spawned { .. }]));
    }

    #[test]
    fn frame_carries_fractional_time() {
        let mut session = session();
        let mut idle = FrameInput::default();
        // 120 frames of 16.666ms is just under 2000ms
        for _ in 0..120 {
            session.frame(1000.0 / 60.0, &mut idle);
        }
        assert!(session.now() >= 1999);
        assert!(session.now() <= 2000);
    }

    #[test]
    fn long_frame_catch_up_is_capped() {
        let mut session = session();
        let mut idle = FrameInput::default();

        let outcome = session.frame(1.0e9, &mut idle);
        assert!(outcome.events.is_empty());
        assert_eq!(session.now(), consts::MAX_CATCHUP_MS);

        let outcome = session.frame(1.0e9, &mut idle);
        assert!(matches!(outcome.events.as_slice(), [GameEvent::Spawned { .. }]));
        assert_eq!(session.now(), 2 * consts::MAX_CATCHUP_MS);
        assert_eq!(session.host().len(), 1);
    }

    #[test]
    fn lost_entity_drops_fruit() {
        let mut session = session();
        session.advance_clock(2000);
        let id = session.fruits().iter().next().unwrap().id;
        let handle = session.entity_of(id).unwrap();
        session.host_mut().destroy_entity(handle);

        let outcome = session.update(16.0, &mut FrameInput::default());
        assert!(outcome.events.is_empty());
        assert!(!session.fruits().contains(id));
        assert_eq!(session.state().lives, 3);
    }

    #[test]
    fn snapshot_serializes() {
        let mut session = session();
        session.advance_clock(4000);
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.time_ms, 4000);
        assert_eq!(back.fruits.len(), 2);
        assert_eq!(back.seed, 1234);
    }
}
