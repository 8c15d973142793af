//! Game facade
//!
//! The single entry point collaborators drive: a renderer or a headless
//! harness calls `update` at the simulation cadence and reads entities back
//! for display. Nothing outside this type mutates the world.

use super::autopilot::{Autopilot, AutopilotDebug};
use super::entity::{Entity, EntityType};
use super::state::{RoundOutcome, World};
use super::tick::{TickInput, restart, tick};
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::stats::RoundSummary;

/// Hard cap on a headless round when no timeout is configured
pub const MAX_HEADLESS_TICKS: u64 = 1_000_000;

type RoundOverCallback = Box<dyn FnMut(bool)>;

pub struct Game {
    world: World,
    autopilot: Option<Autopilot>,
    debug_mode: bool,
    updates_per_second: u32,
    frames_per_second: u32,
    on_round_over: Option<RoundOverCallback>,
    /// Whether this round's outcome has been reported
    notified: bool,
}

impl Game {
    /// Build a game and start the first round
    ///
    /// `has_render_surface` tells whether a collaborator will draw the game;
    /// debug mode is rejected without one.
    pub fn new(settings: &Settings, has_render_surface: bool) -> Result<Self, ConfigError> {
        settings.validate()?;
        if settings.debug_mode && !has_render_surface {
            return Err(ConfigError::DebugModeWithoutSurface);
        }

        let autopilot = if settings.human_controlled {
            None
        } else {
            Some(Autopilot::new(settings.autopilot))
        };

        let mut game = Self {
            world: World::from_settings(settings),
            autopilot,
            debug_mode: settings.debug_mode,
            updates_per_second: settings.updates_per_second(),
            frames_per_second: settings.frames_per_second(),
            on_round_over: None,
            notified: false,
        };
        game.restart(settings.arena_width, settings.arena_height);
        Ok(game)
    }

    /// Advance one tick; `input` only matters under human control
    pub fn update(&mut self, input: &TickInput) {
        tick(&mut self.world, input, self.autopilot.as_mut());
        self.notify_round_over();
    }

    /// Start a new round in a `width` × `height` arena
    pub fn restart(&mut self, width: f32, height: f32) {
        restart(&mut self.world, width, height);
        self.notified = false;
    }

    /// Play a fresh round to completion without input
    pub fn play_round(&mut self) -> RoundSummary {
        let (width, height) = (self.world.width, self.world.height);
        self.restart(width, height);

        let idle = TickInput::default();
        while self.world.outcome.is_none() {
            if self.world.time_ticks >= MAX_HEADLESS_TICKS {
                log::warn!("Round hit the {MAX_HEADLESS_TICKS} tick cap; counting it as lost");
                self.world.end_round(RoundOutcome::Lost);
                break;
            }
            self.update(&idle);
        }
        self.notify_round_over();

        RoundSummary {
            won: self.world.outcome.is_some_and(RoundOutcome::won),
            ticks: self.world.time_ticks,
        }
    }

    /// Register the callback told once per round whether it was won
    pub fn on_round_over(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_round_over = Some(Box::new(callback));
    }

    pub fn ignore_collisions_between(&mut self, a: EntityType, b: EntityType) {
        self.world.ignored.ignore(a, b);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.world.entities
    }

    pub fn asteroids(&self) -> impl Iterator<Item = &Entity> {
        self.world.asteroids()
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.world.outcome
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Last autopilot decision, for debug overlays
    pub fn autopilot_debug(&self) -> Option<&AutopilotDebug> {
        self.autopilot.as_ref().map(Autopilot::debug)
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn updates_per_second(&self) -> u32 {
        self.updates_per_second
    }

    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    fn notify_round_over(&mut self) {
        if self.notified {
            return;
        }
        if let Some(outcome) = self.world.outcome {
            self.notified = true;
            if let Some(callback) = self.on_round_over.as_mut() {
                callback(outcome.won());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::autopilot::AutopilotConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_debug_mode_needs_surface() {
        let settings = Settings {
            debug_mode: true,
            ..Default::default()
        };
        assert!(matches!(
            Game::new(&settings, false),
            Err(ConfigError::DebugModeWithoutSurface)
        ));

        let game = Game::new(&settings, true).unwrap();
        assert!(game.debug_mode());
        assert_eq!(game.updates_per_second(), crate::consts::DEBUG_UPDATES_PER_SECOND);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            arena_width: -1.0,
            ..Default::default()
        };
        assert!(Game::new(&settings, false).is_err());
    }

    #[test]
    fn test_new_game_is_ready_to_play() {
        let game = Game::new(&Settings::default(), false).unwrap();
        assert_eq!(game.asteroids().count(), 5);
        assert_eq!(game.entities().len(), 6);
        assert_eq!(game.outcome(), None);
        assert!(game.autopilot_debug().is_some());
    }

    #[test]
    fn test_human_control_has_no_autopilot() {
        let settings = Settings {
            human_controlled: true,
            ..Default::default()
        };
        let game = Game::new(&settings, false).unwrap();
        assert!(game.autopilot_debug().is_none());
    }

    #[test]
    fn test_round_over_reported_once() {
        let settings = Settings {
            asteroid_count: 0,
            round_timeout_ticks: Some(3),
            ..Default::default()
        };
        let mut game = Game::new(&settings, false).unwrap();

        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        game.on_round_over(move |won| sink.borrow_mut().push(won));

        for _ in 0..10 {
            game.update(&TickInput::default());
        }
        assert_eq!(*reports.borrow(), vec![false]);

        game.restart(800.0, 600.0);
        for _ in 0..10 {
            game.update(&TickInput::default());
        }
        assert_eq!(*reports.borrow(), vec![false, false]);
    }

    #[test]
    fn test_play_round_terminates() {
        let settings = Settings {
            seed: 3,
            round_timeout_ticks: Some(2_000),
            autopilot: AutopilotConfig::box_avoidance(),
            ..Default::default()
        };
        let mut game = Game::new(&settings, false).unwrap();

        let summary = game.play_round();
        assert!(summary.ticks >= 1 && summary.ticks <= 2_000);
        assert_eq!(summary.won, game.outcome() == Some(RoundOutcome::Won));
    }

    #[test]
    fn test_ignored_pair_survives_restart() {
        let mut game = Game::new(&Settings::default(), false).unwrap();
        game.ignore_collisions_between(EntityType::Ship, EntityType::Asteroid);
        game.restart(640.0, 480.0);
        assert!(
            game.world()
                .ignored
                .is_ignored(EntityType::Asteroid, EntityType::Ship)
        );
    }
}
