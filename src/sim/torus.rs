//! Toroidal world model
//!
//! The arena's opposite edges are identified. Positions are wrapped once an
//! entity has fully left the arena, and entities that need edge-correct
//! proximity tests carry ghost bodies translated by one arena size in every
//! compass direction. Ghosts are derived from the current arena size on every
//! query, so a resize can never leave stale offsets behind.

use glam::Vec2;

use super::entity::{Entity, EntityId};
use super::geometry::Circle;

/// Offsets of the 8 ghost copies around the primary body
pub const GHOST_COUNT: usize = 8;

/// One collision circle of an entity, at a fixed offset from its position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBody {
    pub owner: EntityId,
    pub offset: Vec2,
}

impl CollisionBody {
    pub fn primary(owner: EntityId) -> Self {
        Self {
            owner,
            offset: Vec2::ZERO,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.offset != Vec2::ZERO
    }

    /// World position of this body for its owning entity
    #[inline]
    pub fn center(&self, owner: &Entity) -> Vec2 {
        owner.pos + self.offset
    }

    /// Circle collider sharing the owner's radius
    #[inline]
    pub fn circle(&self, owner: &Entity) -> Circle {
        Circle::new(self.center(owner), owner.radius())
    }
}

/// Non-zero combinations of {-W, 0, W} × {-H, 0, H}
pub fn ghost_offsets(width: f32, height: f32) -> [Vec2; GHOST_COUNT] {
    let mut offsets = [Vec2::ZERO; GHOST_COUNT];
    let mut n = 0;
    for i in -1..=1 {
        for j in -1..=1 {
            if i != 0 || j != 0 {
                offsets[n] = Vec2::new(width * i as f32, height * j as f32);
                n += 1;
            }
        }
    }
    offsets
}

/// Primary body plus ghosts for an entity in a `width` × `height` arena
///
/// Malformed entities get no bodies at all and are skipped by collision tests.
pub fn collision_bodies(entity: &Entity, width: f32, height: f32) -> Vec<CollisionBody> {
    if !entity.is_well_formed() {
        return Vec::new();
    }

    let mut bodies = Vec::with_capacity(1 + GHOST_COUNT);
    bodies.push(CollisionBody::primary(entity.id));
    if entity.entity_type().has_ghost_bodies() {
        bodies.extend(ghost_offsets(width, height).into_iter().map(|offset| CollisionBody {
            owner: entity.id,
            offset,
        }));
    }
    bodies
}

/// Move an entity to the opposite side once its circle has fully left the arena
///
/// Each axis is handled independently, so a diagonal exit wraps both at once.
pub fn wrap_position(entity: &mut Entity, width: f32, height: f32) {
    let radius = entity.radius();
    let pos = &mut entity.pos;

    if pos.x - radius > width {
        pos.x -= width;
    } else if pos.x + radius <= 0.0 {
        pos.x += width;
    }

    if pos.y - radius > height {
        pos.y -= height;
    } else if pos.y + radius <= 0.0 {
        pos.y += height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ShipTuning;

    #[test]
    fn test_ghost_offsets_cover_all_compass_points() {
        let offsets = ghost_offsets(800.0, 600.0);
        assert_eq!(offsets.len(), 8);
        assert!(!offsets.contains(&Vec2::ZERO));
        for x in [-800.0, 0.0, 800.0] {
            for y in [-600.0, 0.0, 600.0] {
                if x != 0.0 || y != 0.0 {
                    assert!(offsets.contains(&Vec2::new(x, y)), "missing ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_asteroid_has_primary_and_eight_ghosts() {
        let rock = Entity::asteroid(4, Vec2::new(10.0, 10.0), Vec2::ZERO, 64.0);
        let bodies = collision_bodies(&rock, 800.0, 600.0);
        assert_eq!(bodies.len(), 9);
        assert!(!bodies[0].is_ghost());
        assert_eq!(bodies.iter().filter(|b| b.is_ghost()).count(), 8);
        assert!(bodies.iter().all(|b| b.owner == 4));
        assert_eq!(bodies[0].circle(&rock).radius, 32.0);
    }

    #[test]
    fn test_ghosts_follow_arena_size() {
        let rock = Entity::asteroid(4, Vec2::ZERO, Vec2::ZERO, 64.0);
        let small = collision_bodies(&rock, 100.0, 100.0);
        let large = collision_bodies(&rock, 1000.0, 500.0);
        assert!(small.iter().any(|b| b.offset == Vec2::new(100.0, 100.0)));
        assert!(large.iter().any(|b| b.offset == Vec2::new(1000.0, -500.0)));
        assert!(!large.iter().any(|b| b.offset == Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_ship_has_single_body() {
        let ship = Entity::ship(1, Vec2::new(400.0, 300.0), &ShipTuning::default());
        let bodies = collision_bodies(&ship, 800.0, 600.0);
        assert_eq!(bodies, vec![CollisionBody::primary(1)]);
    }

    #[test]
    fn test_malformed_entity_has_no_bodies() {
        let rock = Entity::asteroid(4, Vec2::new(f32::INFINITY, 0.0), Vec2::ZERO, 64.0);
        assert!(collision_bodies(&rock, 800.0, 600.0).is_empty());
    }

    #[test]
    fn test_wrap_requires_full_exit() {
        let mut rock = Entity::asteroid(4, Vec2::new(820.0, 300.0), Vec2::ZERO, 64.0);
        // Still straddling the right edge (radius 32)
        wrap_position(&mut rock, 800.0, 600.0);
        assert_eq!(rock.pos, Vec2::new(820.0, 300.0));

        rock.pos.x = 833.0;
        wrap_position(&mut rock, 800.0, 600.0);
        assert_eq!(rock.pos, Vec2::new(33.0, 300.0));

        rock.pos.x = -32.0;
        wrap_position(&mut rock, 800.0, 600.0);
        assert_eq!(rock.pos.x, 768.0);
    }

    #[test]
    fn test_wrap_diagonal_exit() {
        let mut rock = Entity::asteroid(4, Vec2::new(-40.0, 640.0), Vec2::ZERO, 64.0);
        wrap_position(&mut rock, 800.0, 600.0);
        assert_eq!(rock.pos, Vec2::new(760.0, 40.0));
    }
}
