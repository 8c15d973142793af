//! Arena setup and gameplay tuning
//!
//! Loaded from a JSON file when one is given, otherwise the defaults below.
//! Every field is optional in the file; missing fields take their default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::AutopilotConfig;

/// Ship handling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    /// Diameter of the ship's collision circle
    pub scale: f32,
    /// Radians turned per tick while steering
    pub angular_velocity: f32,
    pub max_speed: f32,
    /// Speed lost every tick to drag
    pub braking: f32,
    /// Speed gained per tick of thrust, before drag
    pub acceleration: f32,
    /// Ticks between shots
    pub reload_ticks: u32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            scale: SHIP_SCALE,
            angular_velocity: SHIP_ANGULAR_VELOCITY,
            max_speed: SHIP_MAX_SPEED,
            braking: SHIP_BRAKING,
            acceleration: SHIP_ACCELERATION,
            reload_ticks: SHIP_RELOAD_TICKS,
        }
    }
}

impl ShipTuning {
    pub fn radius(&self) -> f32 {
        self.scale / 2.0
    }

    /// Forward acceleration left over after one tick of drag
    pub fn net_acceleration(&self) -> f32 {
        self.acceleration - self.braking
    }

    /// Ticks for drag alone to bring `speed` down to zero
    pub fn time_to_stop(&self, speed: f32) -> f32 {
        speed / self.braking
    }
}

/// Projectile flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub scale: f32,
    pub speed: f32,
    pub lifetime_ticks: u32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            scale: PROJECTILE_SCALE,
            speed: PROJECTILE_SPEED,
            lifetime_ticks: PROJECTILE_LIFETIME_TICKS,
        }
    }
}

impl ProjectileTuning {
    /// Distance covered before the projectile expires
    pub fn max_travel(&self) -> f32 {
        self.speed * self.lifetime_ticks as f32
    }
}

/// Asteroid sizes and drift speeds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTuning {
    /// Scale of asteroids spawned at round start
    pub initial_scale: f32,
    /// Asteroids at or below this scale vanish instead of splitting
    pub min_split_scale: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            initial_scale: ASTEROID_SCALE,
            min_split_scale: ASTEROID_MIN_SPLIT_SCALE,
            min_speed: ASTEROID_MIN_SPEED,
            max_speed: ASTEROID_MAX_SPEED,
        }
    }
}

/// All per-entity tuning, shared by the world and the autopilot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ship: ShipTuning,
    pub projectile: ProjectileTuning,
    pub asteroid: AsteroidTuning,
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ship.scale", self.ship.scale)?;
        positive("ship.angular_velocity", self.ship.angular_velocity)?;
        positive("ship.max_speed", self.ship.max_speed)?;
        positive("ship.braking", self.ship.braking)?;
        if self.ship.net_acceleration() <= 0.0 {
            return Err(ConfigError::InvalidTuning {
                name: "ship.acceleration",
                value: self.ship.acceleration,
                reason: "must exceed ship.braking",
            });
        }
        positive("projectile.scale", self.projectile.scale)?;
        positive("projectile.speed", self.projectile.speed)?;
        if self.projectile.lifetime_ticks == 0 {
            return Err(ConfigError::InvalidTuning {
                name: "projectile.lifetime_ticks",
                value: 0.0,
                reason: "must be at least one tick",
            });
        }
        positive("asteroid.initial_scale", self.asteroid.initial_scale)?;
        positive("asteroid.min_split_scale", self.asteroid.min_split_scale)?;
        if self.asteroid.min_speed < 0.0 || self.asteroid.min_speed > self.asteroid.max_speed {
            return Err(ConfigError::InvalidTuning {
                name: "asteroid.min_speed",
                value: self.asteroid.min_speed,
                reason: "must be non-negative and no greater than asteroid.max_speed",
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTuning {
            name,
            value,
            reason: "must be positive",
        })
    }
}

/// Round rules derived from settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRules {
    pub asteroid_count: u32,
    pub min_spawn_distance: f32,
    /// Ticks before an undecided round counts as lost
    pub timeout_ticks: Option<u32>,
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,

    // === Round ===
    pub asteroid_count: u32,
    /// Closest an asteroid may spawn to the ship
    pub min_spawn_distance: f32,
    /// `None` disables the time-defeat rule
    pub round_timeout_ticks: Option<u32>,
    /// RNG seed for asteroid placement and splits
    pub seed: u64,

    // === Control ===
    /// Ship follows `TickInput` instead of the autopilot
    pub human_controlled: bool,
    pub autopilot: AutopilotConfig,

    // === Debug ===
    /// Draw autopilot overlays and slow the update rate
    pub debug_mode: bool,

    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: DEFAULT_ARENA_WIDTH,
            arena_height: DEFAULT_ARENA_HEIGHT,

            asteroid_count: DEFAULT_ASTEROID_COUNT,
            min_spawn_distance: MIN_SPAWN_DISTANCE,
            round_timeout_ticks: Some(ROUND_TIMEOUT_TICKS),
            seed: 0,

            human_controlled: false,
            autopilot: AutopilotConfig::default(),

            debug_mode: false,

            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(err),
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let arena_ok = |v: f32| v.is_finite() && v > 0.0;
        if !arena_ok(self.arena_width) || !arena_ok(self.arena_height) {
            return Err(ConfigError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if !(self.min_spawn_distance >= 0.0) {
            return Err(ConfigError::InvalidTuning {
                name: "min_spawn_distance",
                value: self.min_spawn_distance,
                reason: "must be non-negative",
            });
        }
        self.autopilot.validate()?;
        self.tuning.validate()
    }

    pub fn rules(&self) -> RoundRules {
        RoundRules {
            asteroid_count: self.asteroid_count,
            min_spawn_distance: self.min_spawn_distance,
            timeout_ticks: self.round_timeout_ticks,
        }
    }

    /// Simulation cadence; debug mode slows updates so overlays can be followed
    pub fn updates_per_second(&self) -> u32 {
        if self.debug_mode {
            DEBUG_UPDATES_PER_SECOND
        } else {
            UPDATES_PER_SECOND
        }
    }

    pub fn frames_per_second(&self) -> u32 {
        FRAMES_PER_SECOND
    }
}
