//! Pursuit/evasion autopilot
//!
//! Every tick the controller recomputes, from scratch, a desired velocity for
//! the ship. It is built from a pursuit force toward a firing position off the
//! most reachable asteroid, and avoidance forces away from asteroids whose
//! predicted motion crosses the ship's. The ship then turns toward the desired
//! velocity and thrusts when aligned. Firing is independent of steering and
//! happens whenever an asteroid lies on the ship's line of sight.
//!
//! Historical controller variants differ only in how avoidance is modelled and
//! blended with pursuit, so they are presets of one [`AutopilotConfig`].

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, ShipCommand, TurnDirection};
use super::geometry::{Circle, Ray, RotatableBox, ray_intersects_circle};
use super::state::World;
use crate::error::ConfigError;
use crate::settings::{ShipTuning, Tuning};
use crate::{angle_in_relation_to, min_angular_difference, normalize_angle, vector_angle};

/// Default fraction of projectile range the ship tries to keep from its target
pub const PROXIMITY_FACTOR: f32 = 0.75;

/// Stand-in magnitude for a pursuit force that would otherwise be zero or negative
const MIN_PURSUIT_MAGNITUDE: f32 = 1e-4;

/// How threats are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AvoidanceModel {
    /// Pure pursuit
    Disabled,
    /// Swept boxes between current and predicted positions, tested with SAT
    #[default]
    MovementBox,
    /// Circles at the predicted positions
    PredictedCircle,
}

/// How avoidance combines with pursuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForceBlending {
    /// Any avoidance force replaces pursuit entirely
    #[default]
    Priority,
    /// All forces are summed
    Additive,
}

/// Look-ahead used for avoidance predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AvoidanceHorizon {
    /// Time for the ship to coast to a stop, turn half a circle, plus one tick
    #[default]
    TurnAround,
    /// Combined distance divided by the closing speed of ship and asteroid
    ClosingSpeed,
}

/// Controller policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    pub avoidance: AvoidanceModel,
    pub blending: ForceBlending,
    pub horizon: AvoidanceHorizon,
    /// Fraction of projectile range to keep as standoff from the target
    pub proximity_factor: f32,
    /// Thrust only when heading is within this angle of the desired velocity
    pub alignment_threshold: f32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self::box_avoidance()
    }
}

impl AutopilotConfig {
    /// Chase and shoot, ignoring threats
    pub fn pursuit() -> Self {
        Self {
            avoidance: AvoidanceModel::Disabled,
            blending: ForceBlending::Priority,
            horizon: AvoidanceHorizon::TurnAround,
            proximity_factor: PROXIMITY_FACTOR,
            alignment_threshold: FRAC_PI_2,
        }
    }

    pub fn box_avoidance() -> Self {
        Self {
            avoidance: AvoidanceModel::MovementBox,
            ..Self::pursuit()
        }
    }

    /// Steering-behaviour variant: every force summed, stricter alignment
    pub fn circle_avoidance() -> Self {
        Self {
            avoidance: AvoidanceModel::PredictedCircle,
            blending: ForceBlending::Additive,
            horizon: AvoidanceHorizon::ClosingSpeed,
            proximity_factor: 1.0,
            alignment_threshold: FRAC_PI_4,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.proximity_factor.is_finite() && self.proximity_factor >= 0.0) {
            return Err(ConfigError::InvalidTuning {
                name: "autopilot.proximity_factor",
                value: self.proximity_factor,
                reason: "must be non-negative",
            });
        }
        if !(self.alignment_threshold > 0.0 && self.alignment_threshold <= PI) {
            return Err(ConfigError::InvalidTuning {
                name: "autopilot.alignment_threshold",
                value: self.alignment_threshold,
                reason: "must be in (0, π]",
            });
        }
        Ok(())
    }
}

/// What the controller decided last tick, for overlays and tests
///
/// Overwritten every update and never read back by the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutopilotDebug {
    pub target: Option<EntityId>,
    pub target_body_position: Option<Vec2>,
    pub predicted_target_position: Option<Vec2>,
    /// Heading scaled by the remaining distance to firing range
    pub firing_offset: Vec2,
    pub pursuit_force: Vec2,
    pub avoidance_force: Vec2,
    pub desired_velocity: Vec2,
}

/// One asteroid collision body as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBody {
    pub owner: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

/// All asteroid bodies, ghosts included
pub fn target_bodies(world: &World) -> Vec<TargetBody> {
    world
        .asteroid_bodies()
        .map(|(asteroid, body)| TargetBody {
            owner: asteroid.id,
            position: body.center(asteroid),
            velocity: asteroid.vel,
            radius: asteroid.radius(),
        })
        .collect()
}

/// Approximate ticks for the ship to face a body and close to touching range
pub fn combined_distance(ship: &Entity, body: &TargetBody, tuning: &ShipTuning) -> f32 {
    let offset = body.position - ship.pos;
    let linear = offset.length() - body.radius - ship.radius();
    let bearing = normalize_angle(angle_in_relation_to(body.position, ship.pos));
    let angular = min_angular_difference(ship.rotation, bearing);
    linear / tuning.max_speed + angular / tuning.angular_velocity
}

/// Linear extrapolation; negative look-ahead is treated as zero
#[inline]
pub fn predict_position(position: Vec2, velocity: Vec2, look_ahead: f32) -> Vec2 {
    position + velocity * look_ahead.max(0.0)
}

/// Ship position after coasting under drag for `look_ahead` ticks
///
/// Uses the average speed while braking and never looks past the time to stop.
pub fn predict_ship_position(ship: &Entity, look_ahead: f32, braking: f32) -> Vec2 {
    let speed = ship.vel.length();
    if speed == 0.0 || braking <= 0.0 {
        return predict_position(ship.pos, ship.vel, look_ahead);
    }
    let t = look_ahead.max(0.0).min(speed / braking);
    ship.pos + ship.vel.normalize_or_zero() * (speed - braking * t / 2.0) * t
}

/// Direction covering the shorter arc from `current` to `target`
pub fn rotation_direction(current: f32, target: f32) -> TurnDirection {
    if target > current {
        if target - current <= PI {
            TurnDirection::Clockwise
        } else {
            TurnDirection::CounterClockwise
        }
    } else if current - target <= PI {
        TurnDirection::CounterClockwise
    } else {
        TurnDirection::Clockwise
    }
}

/// Turn and thrust decisions for a desired velocity
///
/// Holds course for a zero vector. Within half a turn step of the target angle
/// the ship does not turn, so it cannot oscillate around alignment.
pub fn steer(
    ship: &Entity,
    desired: Vec2,
    tuning: &ShipTuning,
    alignment_threshold: f32,
) -> (Option<TurnDirection>, bool) {
    if desired == Vec2::ZERO {
        return (None, false);
    }

    let target = normalize_angle(vector_angle(desired));
    let current = normalize_angle(ship.rotation);

    let turn = if min_angular_difference(target, current) < tuning.angular_velocity / 2.0 {
        None
    } else {
        Some(rotation_direction(current, target))
    };
    let rotation = match turn {
        Some(direction) => normalize_angle(current + direction.sign() * tuning.angular_velocity),
        None => current,
    };

    let aligned = min_angular_difference(target, rotation) < alignment_threshold;
    let wants_speed = desired.length() >= ship.vel.length() + tuning.net_acceleration();
    (turn, aligned && wants_speed)
}

/// Whether a ray along the ship's heading hits any asteroid body
pub fn line_of_sight(ship: &Entity, bodies: &[TargetBody]) -> bool {
    let ray = Ray::new(ship.pos, ship.heading());
    bodies
        .iter()
        .any(|body| ray_intersects_circle(&ray, &Circle::new(body.position, body.radius)))
}

/// Stateless pursuit/evasion controller for the ship
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    config: AutopilotConfig,
    debug: AutopilotDebug,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            debug: AutopilotDebug::default(),
        }
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    pub fn debug(&self) -> &AutopilotDebug {
        &self.debug
    }

    /// Decide this tick's ship command
    pub fn update(&mut self, world: &World) -> ShipCommand {
        let Some(ship) = world.ship() else {
            self.debug = AutopilotDebug::default();
            return ShipCommand::default();
        };
        let tuning = &world.tuning;
        let bodies = target_bodies(world);

        let mut debug = AutopilotDebug::default();

        let target = bodies
            .iter()
            .map(|body| (body, combined_distance(ship, body, &tuning.ship)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b));

        let pursuit = match target {
            Some((body, distance)) => {
                let predicted = predict_position(body.position, body.velocity, distance);
                debug.target = Some(body.owner);
                debug.target_body_position = Some(body.position);
                debug.predicted_target_position = Some(predicted);
                self.pursuit_force(ship, body, predicted, tuning, &mut debug)
            }
            None => Vec2::ZERO,
        };

        let avoidance: Vec2 = bodies
            .iter()
            .map(|body| self.avoidance_force(ship, body, tuning))
            .sum();

        let desired = match self.config.blending {
            ForceBlending::Priority if avoidance != Vec2::ZERO => avoidance,
            ForceBlending::Priority => pursuit,
            ForceBlending::Additive => pursuit + avoidance,
        };

        let (turn, accelerate) = steer(ship, desired, &tuning.ship, self.config.alignment_threshold);
        let fire = line_of_sight(ship, &bodies);

        if debug.target != self.debug.target {
            log::trace!("Autopilot target {:?} -> {:?}", self.debug.target, debug.target);
        }
        debug.pursuit_force = pursuit;
        debug.avoidance_force = avoidance;
        debug.desired_velocity = desired;
        self.debug = debug;

        ShipCommand {
            turn,
            accelerate,
            fire,
        }
    }

    /// Velocity that brings the ship to the edge of weapon range of `predicted`
    ///
    /// Once inside that range the magnitude is floored at a negligible value,
    /// so the ship keeps facing the target instead of backing away.
    fn pursuit_force(
        &self,
        ship: &Entity,
        body: &TargetBody,
        predicted: Vec2,
        tuning: &Tuning,
        debug: &mut AutopilotDebug,
    ) -> Vec2 {
        let offset = predicted - ship.pos;
        let standoff = body.radius
            + ship.radius()
            + tuning.projectile.max_travel() * self.config.proximity_factor;
        let remaining = offset.length() - standoff;
        debug.firing_offset = ship.heading() * remaining;

        let magnitude = if remaining > 0.0 {
            remaining
        } else {
            MIN_PURSUIT_MAGNITUDE
        };
        let direction = if offset == Vec2::ZERO {
            ship.heading()
        } else {
            offset.normalize_or_zero()
        };
        direction * magnitude
    }

    fn avoidance_horizon(&self, ship: &Entity, body: &TargetBody, tuning: &ShipTuning) -> f32 {
        match self.config.horizon {
            AvoidanceHorizon::TurnAround => {
                tuning.time_to_stop(ship.vel.length()) + PI / tuning.angular_velocity + 1.0
            }
            AvoidanceHorizon::ClosingSpeed => {
                let closing = tuning.max_speed + body.velocity.length();
                (combined_distance(ship, body, tuning) / closing).max(0.0)
            }
        }
    }

    /// Repulsion away from one body if its predicted motion meets the ship's
    fn avoidance_force(&self, ship: &Entity, body: &TargetBody, tuning: &Tuning) -> Vec2 {
        if self.config.avoidance == AvoidanceModel::Disabled {
            return Vec2::ZERO;
        }

        let horizon = self.avoidance_horizon(ship, body, &tuning.ship);
        let body_future = predict_position(body.position, body.velocity, horizon);
        let ship_future = predict_ship_position(ship, horizon, tuning.ship.braking);

        let threatened = match self.config.avoidance {
            AvoidanceModel::MovementBox => {
                let body_box = RotatableBox::sweep(body.position, body_future, body.radius * 2.0);
                let ship_box = RotatableBox::sweep(ship.pos, ship_future, ship.scale);
                body_box.to_polygon().overlaps(&ship_box.to_polygon())
            }
            AvoidanceModel::PredictedCircle => Circle::new(body_future, body.radius)
                .overlaps(&Circle::new(ship_future, ship.radius())),
            AvoidanceModel::Disabled => false,
        };
        if !threatened {
            return Vec2::ZERO;
        }

        let away = (ship.pos - body_future).normalize_or_zero();
        let away = if away == Vec2::ZERO {
            (ship.pos - body.position).normalize_or_zero()
        } else {
            away
        };
        away * tuning.ship.max_speed
    }
}
