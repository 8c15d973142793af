//! World state
//!
//! The arena, the live entity list and everything a round needs to be
//! replayed deterministically from its seed.

use std::collections::HashSet;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind, EntityType, ShipCommand};
use super::torus::{CollisionBody, collision_bodies};
use crate::settings::{RoundRules, Settings, Tuning};

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Every asteroid destroyed
    Won,
    /// Ship hit, or the round timed out
    Lost,
}

impl RoundOutcome {
    pub fn won(self) -> bool {
        self == RoundOutcome::Won
    }
}

/// Entity type pairs that are never tested for collision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreMatrix {
    pairs: HashSet<(EntityType, EntityType)>,
}

impl IgnoreMatrix {
    /// Asteroids always pass through one another
    pub fn with_defaults() -> Self {
        let mut matrix = Self::default();
        matrix.ignore(EntityType::Asteroid, EntityType::Asteroid);
        matrix
    }

    pub fn ignore(&mut self, a: EntityType, b: EntityType) {
        self.pairs.insert((a, b));
    }

    /// Checks both orderings of the pair
    pub fn is_ignored(&self, a: EntityType, b: EntityType) -> bool {
        self.pairs.contains(&(a, b)) || self.pairs.contains(&(b, a))
    }
}

/// The toroidal arena and its population
#[derive(Debug, Clone)]
pub struct World {
    pub width: f32,
    pub height: f32,
    /// Live entities, in spawn order
    pub entities: Vec<Entity>,
    pub ignored: IgnoreMatrix,
    pub tuning: Tuning,
    pub rules: RoundRules,
    /// Ticks since the round started
    pub time_ticks: u64,
    /// Set once per round; later outcomes are ignored
    pub outcome: Option<RoundOutcome>,
    pub seed: u64,
    rng: Pcg32,
    next_id: EntityId,
}

impl World {
    /// Empty arena; call `restart` to populate a round
    pub fn new(width: f32, height: f32, tuning: Tuning, rules: RoundRules, seed: u64) -> Self {
        Self {
            width,
            height,
            entities: Vec::new(),
            ignored: IgnoreMatrix::with_defaults(),
            tuning,
            rules,
            time_ticks: 0,
            outcome: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.arena_width,
            settings.arena_height,
            settings.tuning,
            settings.rules(),
            settings.seed,
        )
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Change arena bounds; ghost bodies pick up the new size on the next query
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn ship(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_ship())
    }

    pub fn ship_mut(&mut self) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.is_ship())
    }

    pub fn asteroids(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_asteroid())
    }

    pub fn asteroid_count(&self) -> usize {
        self.asteroids().count()
    }

    /// Collision bodies (ghosts included) for an entity at the current arena size
    pub fn bodies(&self, entity: &Entity) -> Vec<CollisionBody> {
        collision_bodies(entity, self.width, self.height)
    }

    /// Every asteroid body in the arena, paired with its owner
    pub fn asteroid_bodies(&self) -> impl Iterator<Item = (&Entity, CollisionBody)> {
        self.asteroids()
            .flat_map(move |a| self.bodies(a).into_iter().map(move |b| (a, b)))
    }

    /// Uniformly distributed unit vector
    pub fn random_unit(&mut self) -> Vec2 {
        Vec2::from_angle(self.rng.random_range(0.0..TAU))
    }

    /// Random scalar in [lo, hi); returns `lo` for an empty range
    pub fn random_between(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }

    /// Random drift velocity within the asteroid speed range
    pub fn random_asteroid_velocity(&mut self) -> Vec2 {
        let tuning = self.tuning.asteroid;
        let speed = self.random_between(tuning.min_speed, tuning.max_speed);
        self.random_unit() * speed
    }

    pub fn spawn_ship(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let ship = Entity::ship(id, pos, &self.tuning.ship);
        self.entities.push(ship);
        id
    }

    /// Spawn an asteroid with a freshly randomized velocity
    pub fn spawn_asteroid(&mut self, pos: Vec2, scale: f32) -> EntityId {
        let id = self.next_entity_id();
        let vel = self.random_asteroid_velocity();
        self.entities.push(Entity::asteroid(id, pos, vel, scale));
        id
    }

    /// Latch the round outcome; only the first call per round has any effect
    pub fn end_round(&mut self, outcome: RoundOutcome) {
        if self.outcome.is_none() {
            log::info!(
                "Round over: {} after {} ticks",
                if outcome.won() { "won" } else { "lost" },
                self.time_ticks
            );
            self.outcome = Some(outcome);
        }
    }

    /// Fire from the ship if its cooldown has elapsed
    pub fn fire(&mut self) {
        let Some(ship) = self.ship() else {
            return;
        };
        if ship.kind != (EntityKind::Ship { fire_cooldown: 0 }) {
            return;
        }
        let (origin, heading) = (ship.pos, ship.heading());

        let id = self.next_entity_id();
        let projectile = Entity::projectile(id, origin, heading, &self.tuning.projectile);
        self.entities.push(projectile);

        let reload_ticks = self.tuning.ship.reload_ticks;
        if let Some(ship) = self.ship_mut() {
            ship.kind = EntityKind::Ship {
                fire_cooldown: reload_ticks,
            };
        }
    }

    /// Apply steering, thrust and fire commands to the ship
    pub fn apply_command(&mut self, command: ShipCommand) {
        let ship_tuning = self.tuning.ship;
        if let Some(ship) = self.ship_mut() {
            if let Some(direction) = command.turn {
                ship.turn(direction, ship_tuning.angular_velocity);
            }
            if command.accelerate {
                ship.accelerate(&ship_tuning);
            }
        }
        if command.fire {
            self.fire();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::TurnDirection;

    fn world() -> World {
        World::from_settings(&Settings::default())
    }

    #[test]
    fn test_ignore_matrix_is_symmetric() {
        let mut matrix = IgnoreMatrix::with_defaults();
        assert!(matrix.is_ignored(EntityType::Asteroid, EntityType::Asteroid));
        assert!(!matrix.is_ignored(EntityType::Ship, EntityType::Asteroid));

        matrix.ignore(EntityType::Ship, EntityType::Projectile);
        assert!(matrix.is_ignored(EntityType::Projectile, EntityType::Ship));
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut world = world();
        let a = world.spawn_ship(Vec2::ZERO);
        let b = world.spawn_asteroid(Vec2::ZERO, 64.0);
        assert_ne!(a, b);
        assert_eq!(world.entity(b).map(|e| e.scale), Some(64.0));
    }

    #[test]
    fn test_asteroid_velocity_in_range() {
        let mut world = world();
        for _ in 0..100 {
            let speed = world.random_asteroid_velocity().length();
            assert!((0.5 - 1e-4..=2.0 + 1e-4).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut world = world();
        world.spawn_ship(Vec2::new(400.0, 300.0));

        world.fire();
        world.fire();
        let shots = world
            .entities
            .iter()
            .filter(|e| e.entity_type() == EntityType::Projectile)
            .count();
        assert_eq!(shots, 1);
        assert_eq!(
            world.ship().map(|s| s.kind),
            Some(EntityKind::Ship { fire_cooldown: 30 })
        );
    }

    #[test]
    fn test_apply_command_turns_and_thrusts() {
        let mut world = world();
        world.spawn_ship(Vec2::new(400.0, 300.0));

        world.apply_command(ShipCommand {
            turn: Some(TurnDirection::Clockwise),
            accelerate: true,
            fire: false,
        });

        let ship = world.ship().unwrap();
        assert!((ship.rotation - world.tuning.ship.angular_velocity).abs() < 1e-6);
        assert!(ship.vel.length() > 0.0);
    }

    #[test]
    fn test_outcome_is_latched() {
        let mut world = world();
        world.end_round(RoundOutcome::Lost);
        world.end_round(RoundOutcome::Won);
        assert_eq!(world.outcome, Some(RoundOutcome::Lost));
    }

    #[test]
    fn test_same_seed_same_velocities() {
        let mut a = world();
        let mut b = world();
        for _ in 0..10 {
            assert_eq!(a.random_asteroid_velocity(), b.random_asteroid_velocity());
        }
    }
}
