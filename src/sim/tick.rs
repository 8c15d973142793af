//! Fixed timestep simulation tick
//!
//! Advances the world deterministically: drag and timers, wraparound,
//! integration, collisions, then the ship's command for this tick.

use glam::Vec2;

use super::autopilot::Autopilot;
use super::collision::{detect_collisions, resolve_contacts};
use super::entity::{EntityKind, ShipCommand, TurnDirection};
use super::state::{RoundOutcome, World};
use super::torus::wrap_position;

/// Held controls for a single tick (human control path)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub fire: bool,
}

impl TickInput {
    /// Resolve held keys into a ship command; opposing turns cancel out
    pub fn command(&self) -> ShipCommand {
        let turn = match (self.turn_left, self.turn_right) {
            (true, false) => Some(TurnDirection::CounterClockwise),
            (false, true) => Some(TurnDirection::Clockwise),
            _ => None,
        };
        ShipCommand {
            turn,
            accelerate: self.thrust,
            fire: self.fire,
        }
    }
}

/// Advance the world by one tick
///
/// With an autopilot attached the ship follows it and `input` is ignored.
/// Does nothing once the round has an outcome.
pub fn tick(world: &mut World, input: &TickInput, autopilot: Option<&mut Autopilot>) {
    if world.outcome.is_some() {
        return;
    }
    world.time_ticks += 1;

    // Move everything; expired projectiles are dropped after the pass
    let (width, height) = (world.width, world.height);
    let braking = world.tuning.ship.braking;
    let mut expired = false;
    for entity in &mut world.entities {
        if entity.is_ship() {
            entity.brake(braking);
        }
        if !entity.tick_timers() {
            expired = true;
        }
        wrap_position(entity, width, height);
        entity.integrate();
    }
    if expired {
        world.entities.retain(|e| match e.kind {
            EntityKind::Projectile { ticks_to_death } => ticks_to_death > 0,
            _ => true,
        });
    }

    let contacts = detect_collisions(world);
    resolve_contacts(world, &contacts);

    if world.outcome.is_none() {
        let command = match autopilot {
            Some(pilot) => pilot.update(world),
            None => input.command(),
        };
        world.apply_command(command);
    }

    if let Some(limit) = world.rules.timeout_ticks {
        if world.outcome.is_none() && world.time_ticks >= u64::from(limit) {
            log::debug!("Round timed out after {} ticks", world.time_ticks);
            world.end_round(RoundOutcome::Lost);
        }
    }
}

/// Reset the world for a new round in a `width` × `height` arena
///
/// The ship starts centred and at rest; asteroids are scattered around it no
/// closer than the minimum spawn distance. The RNG is not reseeded, so
/// successive rounds differ while staying reproducible from the world seed.
pub fn restart(world: &mut World, width: f32, height: f32) {
    world.resize(width, height);
    world.entities.clear();
    world.time_ticks = 0;
    world.outcome = None;

    let center = Vec2::new(width, height) * 0.5;
    world.spawn_ship(center);

    let min_distance = world.rules.min_spawn_distance;
    let range = (width.min(height) / 2.0 - min_distance).max(0.0);
    let scale = world.tuning.asteroid.initial_scale;

    for _ in 0..world.rules.asteroid_count {
        let direction = world.random_unit();
        let distance = world.random_between(0.0, 1.0) * range + min_distance;
        world.spawn_asteroid(center + direction * distance, scale);
    }

    log::info!(
        "Round started: {}x{} arena, {} asteroids, seed {}",
        width,
        height,
        world.rules.asteroid_count,
        world.seed
    );
}
