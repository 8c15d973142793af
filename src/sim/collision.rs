//! Collision detection and response on the torus
//!
//! Detection is a pairwise scan over every entity, testing every body of one
//! against every body of the other so that ghosts catch contacts across the
//! wrap seam. Resolution runs afterwards, over the collected contacts, so the
//! entity list is never mutated while it is being scanned.

use std::collections::HashSet;

use super::entity::{Entity, EntityId, EntityType};
use super::state::{RoundOutcome, World};
use super::torus::CollisionBody;

/// Two entities found touching during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub first: EntityId,
    pub second: EntityId,
}

/// Check whether any body of `a` overlaps any body of `b`
///
/// Stops at the first overlapping pair; one contact per entity pair per tick.
pub fn bodies_overlap(a: &Entity, a_bodies: &[CollisionBody], b: &Entity, b_bodies: &[CollisionBody]) -> bool {
    a_bodies.iter().any(|body_a| {
        let circle_a = body_a.circle(a);
        b_bodies
            .iter()
            .any(|body_b| circle_a.overlaps(&body_b.circle(b)))
    })
}

/// Find every touching pair of entities
///
/// Each unordered pair is tested once and no entity is tested against itself.
/// Pairs whose types are ignored, and malformed entities (no bodies), are
/// skipped.
pub fn detect_collisions(world: &World) -> Vec<Contact> {
    let entities = &world.entities;
    let bodies: Vec<Vec<CollisionBody>> = entities.iter().map(|e| world.bodies(e)).collect();

    let mut contacts = Vec::new();
    for i in 0..entities.len() {
        if bodies[i].is_empty() {
            continue;
        }
        for j in (i + 1)..entities.len() {
            let (a, b) = (&entities[i], &entities[j]);
            if bodies[j].is_empty() || world.ignored.is_ignored(a.entity_type(), b.entity_type()) {
                continue;
            }
            if bodies_overlap(a, &bodies[i], b, &bodies[j]) {
                contacts.push(Contact {
                    first: a.id,
                    second: b.id,
                });
            }
        }
    }
    contacts
}

/// Apply collision handlers for each contact, in scan order
///
/// Entities destroyed by an earlier contact take no part in later ones.
/// Removal happens once every contact has been handled.
pub fn resolve_contacts(world: &mut World, contacts: &[Contact]) {
    let mut destroyed: HashSet<EntityId> = HashSet::new();
    let mut asteroid_destroyed = false;

    for contact in contacts {
        if destroyed.contains(&contact.first) || destroyed.contains(&contact.second) {
            continue;
        }
        let (Some(first), Some(second)) = (world.entity(contact.first), world.entity(contact.second))
        else {
            continue;
        };

        // Handlers are symmetric; order the pair by type so each case is matched once
        let (a, b) = if first.entity_type() <= second.entity_type() {
            (first, second)
        } else {
            (second, first)
        };

        match (a.entity_type(), b.entity_type()) {
            (EntityType::Ship, EntityType::Asteroid) => {
                log::debug!("Ship {} hit asteroid {}", a.id, b.id);
                world.end_round(RoundOutcome::Lost);
            }
            (EntityType::Asteroid, EntityType::Projectile) => {
                let (asteroid, projectile) = (a.clone(), b.id);
                destroyed.insert(asteroid.id);
                destroyed.insert(projectile);
                asteroid_destroyed = true;
                split_asteroid(world, &asteroid);
            }
            _ => {}
        }
    }

    if !destroyed.is_empty() {
        world.entities.retain(|e| !destroyed.contains(&e.id));
    }

    if asteroid_destroyed && world.asteroid_count() == 0 {
        world.end_round(RoundOutcome::Won);
    }
}

/// Replace a destroyed asteroid with two half-scale children, or nothing if small
fn split_asteroid(world: &mut World, asteroid: &Entity) {
    if asteroid.scale <= world.tuning.asteroid.min_split_scale {
        log::debug!("Asteroid {} destroyed (scale {})", asteroid.id, asteroid.scale);
        return;
    }

    let scale = asteroid.scale / 2.0;
    let left = world.spawn_asteroid(asteroid.pos, scale);
    let right = world.spawn_asteroid(asteroid.pos, scale);
    log::debug!(
        "Asteroid {} split into {} and {} (scale {})",
        asteroid.id,
        left,
        right,
        scale
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use glam::Vec2;

    fn empty_world() -> World {
        World::from_settings(&Settings::default())
    }

    fn push_asteroid(world: &mut World, pos: Vec2, vel: Vec2, scale: f32) -> EntityId {
        let id = world.next_entity_id();
        world.entities.push(Entity::asteroid(id, pos, vel, scale));
        id
    }

    fn push_projectile(world: &mut World, pos: Vec2) -> EntityId {
        let id = world.next_entity_id();
        let tuning = world.tuning.projectile;
        let mut shot = Entity::projectile(id, pos, Vec2::Y, &tuning);
        shot.pos = pos;
        world.entities.push(shot);
        id
    }

    #[test]
    fn test_ghost_body_detects_contact_across_seam() {
        let mut world = empty_world();
        let ship = world.spawn_ship(Vec2::new(10.0, 300.0));
        let rock = push_asteroid(&mut world, Vec2::new(790.0, 300.0), Vec2::ZERO, 64.0);

        // Primary bodies are 780 apart; the (-W, 0) ghost sits at x = -10
        let contacts = detect_collisions(&world);
        assert_eq!(
            contacts,
            vec![Contact {
                first: ship,
                second: rock
            }]
        );

        resolve_contacts(&mut world, &contacts);
        assert_eq!(world.outcome, Some(RoundOutcome::Lost));
    }

    #[test]
    fn test_one_contact_per_pair() {
        let mut world = empty_world();
        world.resize(40.0, 40.0);
        world.spawn_ship(Vec2::new(20.0, 20.0));
        // Small arena: several ghosts overlap the ship at once
        push_asteroid(&mut world, Vec2::new(20.0, 20.0), Vec2::ZERO, 64.0);
        assert_eq!(detect_collisions(&world).len(), 1);
    }

    #[test]
    fn test_asteroids_pass_through_each_other() {
        let mut world = empty_world();
        push_asteroid(&mut world, Vec2::new(400.0, 300.0), Vec2::ZERO, 128.0);
        push_asteroid(&mut world, Vec2::new(410.0, 300.0), Vec2::ZERO, 128.0);
        assert!(detect_collisions(&world).is_empty());
    }

    #[test]
    fn test_registered_ignore_pair_is_skipped() {
        let mut world = empty_world();
        world.spawn_ship(Vec2::new(400.0, 300.0));
        push_asteroid(&mut world, Vec2::new(400.0, 300.0), Vec2::ZERO, 64.0);
        assert_eq!(detect_collisions(&world).len(), 1);

        world.ignored.ignore(EntityType::Asteroid, EntityType::Ship);
        assert!(detect_collisions(&world).is_empty());
    }

    #[test]
    fn test_malformed_entity_is_skipped() {
        let mut world = empty_world();
        world.spawn_ship(Vec2::new(400.0, 300.0));
        push_asteroid(&mut world, Vec2::new(400.0, 300.0), Vec2::ZERO, 0.0);
        push_asteroid(&mut world, Vec2::new(f32::NAN, 300.0), Vec2::ZERO, 64.0);
        assert!(detect_collisions(&world).is_empty());
    }

    #[test]
    fn test_large_asteroid_splits_in_two() {
        let mut world = empty_world();
        let pos = Vec2::new(400.0, 300.0);
        let rock = push_asteroid(&mut world, pos, Vec2::new(1.0, 0.0), 128.0);
        let shot = push_projectile(&mut world, pos);

        let contacts = detect_collisions(&world);
        resolve_contacts(&mut world, &contacts);

        assert!(world.entity(rock).is_none());
        assert!(world.entity(shot).is_none());

        let children: Vec<&Entity> = world.asteroids().collect();
        assert_eq!(children.len(), 2);
        for child in &children {
            assert_eq!(child.scale, 64.0);
            assert_eq!(child.pos, pos);
            assert!(child.vel.length() >= 0.5 - 1e-4);
        }
        assert_ne!(
            children[0].vel.normalize(),
            children[1].vel.normalize(),
            "children should drift independently"
        );
        assert_eq!(world.outcome, None);
    }

    #[test]
    fn test_smallest_asteroid_vanishes_and_wins() {
        let mut world = empty_world();
        let pos = Vec2::new(400.0, 300.0);
        world.spawn_ship(Vec2::new(100.0, 100.0));
        push_asteroid(&mut world, pos, Vec2::ZERO, 32.0);
        push_projectile(&mut world, pos);

        let contacts = detect_collisions(&world);
        resolve_contacts(&mut world, &contacts);

        assert_eq!(world.asteroid_count(), 0);
        assert_eq!(world.outcome, Some(RoundOutcome::Won));
    }

    #[test]
    fn test_destroyed_asteroid_absorbs_only_one_projectile() {
        let mut world = empty_world();
        let pos = Vec2::new(400.0, 300.0);
        push_asteroid(&mut world, pos, Vec2::ZERO, 32.0);
        let first = push_projectile(&mut world, pos);
        let second = push_projectile(&mut world, pos + Vec2::new(1.0, 0.0));

        // Both shots hit the rock and each other; the shot-shot contact is a no-op
        let contacts = detect_collisions(&world);
        assert_eq!(contacts.len(), 3);
        resolve_contacts(&mut world, &contacts);

        assert!(world.entity(first).is_none());
        assert!(world.entity(second).is_some());
    }

    #[test]
    fn test_win_requires_last_asteroid() {
        let mut world = empty_world();
        let pos = Vec2::new(400.0, 300.0);
        push_asteroid(&mut world, pos, Vec2::ZERO, 32.0);
        push_asteroid(&mut world, Vec2::new(100.0, 100.0), Vec2::ZERO, 32.0);
        push_projectile(&mut world, pos);

        let contacts = detect_collisions(&world);
        resolve_contacts(&mut world, &contacts);
        assert_eq!(world.asteroid_count(), 1);
        assert_eq!(world.outcome, None);
    }
}
