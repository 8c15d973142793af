//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod entity;
pub mod game;
pub mod geometry;
pub mod state;
pub mod tick;
pub mod torus;

pub use autopilot::{
    Autopilot, AutopilotConfig, AutopilotDebug, AvoidanceHorizon, AvoidanceModel, ForceBlending,
};
pub use collision::{Contact, detect_collisions, resolve_contacts};
pub use entity::{Entity, EntityId, EntityKind, EntityType, ShipCommand, TurnDirection};
pub use game::Game;
pub use geometry::{Circle, Polygon, Ray, RotatableBox, ray_intersects_circle};
pub use state::{IgnoreMatrix, RoundOutcome, World};
pub use tick::{TickInput, restart, tick};
pub use torus::{CollisionBody, collision_bodies, ghost_offsets, wrap_position};
