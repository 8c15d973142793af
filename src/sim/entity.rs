//! Simulation entities and their physical update rules

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::{ProjectileTuning, ShipTuning};
use crate::{angle_to_heading, normalize_angle};

/// Stable entity identifier (allocated by the world, never reused in a round)
pub type EntityId = u32;

/// Type tag used for collision filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Ship,
    Asteroid,
    Projectile,
}

impl EntityType {
    /// Entities that need wrap-translated ghost bodies for edge-correct tests
    ///
    /// Ships and projectiles are checked against asteroid ghosts instead.
    pub fn has_ghost_bodies(self) -> bool {
        matches!(self, EntityType::Asteroid)
    }
}

/// Variant-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Ship {
        /// Ticks until the ship may fire again
        fire_cooldown: u32,
    },
    Asteroid,
    Projectile {
        /// Ticks until the projectile expires
        ticks_to_death: u32,
    },
}

/// Rotation direction for one steering step (clockwise is positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Clockwise,
    CounterClockwise,
}

impl TurnDirection {
    pub fn sign(self) -> f32 {
        match self {
            TurnDirection::Clockwise => 1.0,
            TurnDirection::CounterClockwise => -1.0,
        }
    }
}

/// Commands issued to the ship for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShipCommand {
    pub turn: Option<TurnDirection>,
    pub accelerate: bool,
    pub fire: bool,
}

/// A circular body in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// World position (unconstrained; wrapped lazily)
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radians in [0, 2π), 0 = up, clockwise
    pub rotation: f32,
    /// Diameter of the collision circle
    pub scale: f32,
}

impl Entity {
    pub fn ship(id: EntityId, pos: Vec2, tuning: &ShipTuning) -> Self {
        Self {
            id,
            kind: EntityKind::Ship { fire_cooldown: 0 },
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            scale: tuning.scale,
        }
    }

    pub fn asteroid(id: EntityId, pos: Vec2, vel: Vec2, scale: f32) -> Self {
        Self {
            id,
            kind: EntityKind::Asteroid,
            pos,
            vel,
            rotation: 0.0,
            scale,
        }
    }

    /// Projectile launched from `origin` along unit `direction`
    ///
    /// It starts one tick of travel ahead of the origin so it clears the shooter.
    pub fn projectile(id: EntityId, origin: Vec2, direction: Vec2, tuning: &ProjectileTuning) -> Self {
        let vel = direction * tuning.speed;
        Self {
            id,
            kind: EntityKind::Projectile {
                ticks_to_death: tuning.lifetime_ticks,
            },
            pos: origin + vel,
            vel,
            rotation: normalize_angle(crate::vector_angle(direction)),
            scale: tuning.scale,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Ship { .. } => EntityType::Ship,
            EntityKind::Asteroid => EntityType::Asteroid,
            EntityKind::Projectile { .. } => EntityType::Projectile,
        }
    }

    pub fn is_ship(&self) -> bool {
        matches!(self.kind, EntityKind::Ship { .. })
    }

    pub fn is_asteroid(&self) -> bool {
        matches!(self.kind, EntityKind::Asteroid)
    }

    /// Radius of the enclosing circle
    #[inline]
    pub fn radius(&self) -> f32 {
        self.scale / 2.0
    }

    /// Unit vector the entity is facing
    pub fn heading(&self) -> Vec2 {
        angle_to_heading(self.rotation)
    }

    /// Entities with a broken shape or position take no part in collisions
    pub fn is_well_formed(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0 && self.pos.is_finite()
    }

    /// Rotate one steering step and keep rotation in [0, 2π)
    pub fn turn(&mut self, direction: TurnDirection, angular_velocity: f32) {
        self.rotation = normalize_angle(self.rotation + angular_velocity * direction.sign());
    }

    /// Thrust along the heading, capped at the ship's top speed
    pub fn accelerate(&mut self, tuning: &ShipTuning) {
        self.vel = (self.vel + self.heading() * tuning.acceleration).clamp_length_max(tuning.max_speed);
    }

    /// Scalar drag: shed `braking` speed without changing direction
    pub fn brake(&mut self, braking: f32) {
        let speed = self.vel.length();
        if speed > 0.0 {
            let reduced = speed - braking;
            self.vel = if reduced <= 0.0 {
                Vec2::ZERO
            } else {
                self.vel * (reduced / speed)
            };
        }
    }

    /// Count down per-tick timers; returns false once the entity has expired
    pub fn tick_timers(&mut self) -> bool {
        match &mut self.kind {
            EntityKind::Ship { fire_cooldown } => {
                *fire_cooldown = fire_cooldown.saturating_sub(1);
                true
            }
            EntityKind::Projectile { ticks_to_death } => {
                *ticks_to_death = ticks_to_death.saturating_sub(1);
                *ticks_to_death > 0
            }
            EntityKind::Asteroid => true,
        }
    }

    /// Advance position by one tick of velocity
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, TAU};

    #[test]
    fn test_turn_keeps_rotation_normalized() {
        let tuning = ShipTuning::default();
        let mut ship = Entity::ship(1, Vec2::ZERO, &tuning);

        ship.turn(TurnDirection::CounterClockwise, tuning.angular_velocity);
        assert!(ship.rotation >= 0.0 && ship.rotation < TAU);
        assert!((ship.rotation - (TAU - tuning.angular_velocity)).abs() < 1e-5);

        ship.turn(TurnDirection::Clockwise, tuning.angular_velocity);
        assert!(ship.rotation < 1e-5 || ship.rotation > TAU - 1e-5);
    }

    #[test]
    fn test_accelerate_clamps_speed() {
        let tuning = ShipTuning::default();
        let mut ship = Entity::ship(1, Vec2::ZERO, &tuning);

        ship.accelerate(&tuning);
        assert!((ship.vel - Vec2::new(0.0, tuning.acceleration)).length() < 1e-6);

        for _ in 0..100 {
            ship.accelerate(&tuning);
        }
        assert!((ship.vel.length() - tuning.max_speed).abs() < 1e-4);
    }

    #[test]
    fn test_brake_preserves_direction_and_stops() {
        let mut ship = Entity::ship(1, Vec2::ZERO, &ShipTuning::default());
        ship.vel = Vec2::new(3.0, 4.0);

        ship.brake(1.0);
        assert!((ship.vel.length() - 4.0).abs() < 1e-5);
        assert!((ship.vel.normalize() - Vec2::new(0.6, 0.8)).length() < 1e-5);

        ship.brake(10.0);
        assert_eq!(ship.vel, Vec2::ZERO);

        // Braking at rest is a no-op
        ship.brake(1.0);
        assert_eq!(ship.vel, Vec2::ZERO);
    }

    #[test]
    fn test_projectile_spawns_ahead_and_expires() {
        let tuning = ProjectileTuning {
            lifetime_ticks: 2,
            ..Default::default()
        };
        let heading = angle_to_heading(FRAC_PI_2);
        let mut shot = Entity::projectile(7, Vec2::new(100.0, 100.0), heading, &tuning);

        assert!((shot.pos - (Vec2::new(100.0, 100.0) + heading * tuning.speed)).length() < 1e-4);
        assert_eq!(shot.entity_type(), EntityType::Projectile);
        assert!(shot.tick_timers());
        assert!(!shot.tick_timers());
    }

    #[test]
    fn test_ship_cooldown_counts_down_to_zero() {
        let mut ship = Entity::ship(1, Vec2::ZERO, &ShipTuning::default());
        ship.kind = EntityKind::Ship { fire_cooldown: 1 };
        assert!(ship.tick_timers());
        assert!(ship.tick_timers());
        assert_eq!(ship.kind, EntityKind::Ship { fire_cooldown: 0 });
    }

    #[test]
    fn test_malformed_entities() {
        let mut rock = Entity::asteroid(3, Vec2::ZERO, Vec2::ZERO, 64.0);
        assert!(rock.is_well_formed());
        rock.scale = 0.0;
        assert!(!rock.is_well_formed());
        rock.scale = 64.0;
        rock.pos = Vec2::new(f32::NAN, 0.0);
        assert!(!rock.is_well_formed());
    }
}
