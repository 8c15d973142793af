//! Asteroid Pilot - a toroidal asteroid field flown by an autonomous ship
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, wraparound, collisions, autopilot)
//! - `settings`: Data-driven arena setup and tuning
//! - `stats`: Win-rate bookkeeping for headless replays
//! - `error`: Setup-time configuration errors

pub mod error;
pub mod settings;
pub mod sim;
pub mod stats;

pub use error::ConfigError;
pub use settings::Settings;
pub use stats::{RoundSummary, WinRateReport};

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Simulation updates per second in normal play
    pub const UPDATES_PER_SECOND: u32 = 120;
    /// Simulation updates per second while debug overlays are shown
    pub const DEBUG_UPDATES_PER_SECOND: u32 = 30;
    /// Drawing cadence offered to rendering collaborators
    pub const FRAMES_PER_SECOND: u32 = 30;

    /// Arena dimensions
    pub const DEFAULT_ARENA_WIDTH: f32 = 800.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 600.0;

    /// Round setup
    pub const DEFAULT_ASTEROID_COUNT: u32 = 5;
    pub const MIN_SPAWN_DISTANCE: f32 = 250.0;
    pub const ROUND_TIMEOUT_TICKS: u32 = 10_000;

    /// Ship defaults
    pub const SHIP_SCALE: f32 = 32.0;
    pub const SHIP_ANGULAR_VELOCITY: f32 = PI * 0.012;
    pub const SHIP_MAX_SPEED: f32 = 4.0;
    pub const SHIP_BRAKING: f32 = 0.1;
    pub const SHIP_ACCELERATION: f32 = 0.3;
    pub const SHIP_RELOAD_TICKS: u32 = 30;

    /// Projectile defaults
    pub const PROJECTILE_SCALE: f32 = 5.0;
    pub const PROJECTILE_SPEED: f32 = 5.0;
    pub const PROJECTILE_LIFETIME_TICKS: u32 = 60;

    /// Asteroid defaults
    pub const ASTEROID_SCALE: f32 = 128.0;
    pub const ASTEROID_MIN_SPLIT_SCALE: f32 = 32.0;
    pub const ASTEROID_MIN_SPEED: f32 = 0.5;
    pub const ASTEROID_MAX_SPEED: f32 = 2.0;
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest unsigned separation between two angles, in [0, π]
#[inline]
pub fn min_angular_difference(a: f32, b: f32) -> f32 {
    let difference = (normalize_angle(a) - normalize_angle(b)).abs();
    if difference > PI {
        TAU - difference
    } else {
        difference
    }
}

/// Unit heading for an angle where 0 is "up" and angles grow clockwise
#[inline]
pub fn angle_to_heading(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

/// Angle of a vector in the heading convention (inverse of `angle_to_heading`)
#[inline]
pub fn vector_angle(v: Vec2) -> f32 {
    (-v.x).atan2(v.y)
}

/// Angle of `point` as seen from `origin`
#[inline]
pub fn angle_in_relation_to(point: Vec2, origin: Vec2) -> f32 {
    vector_angle(point - origin)
}
