//! Owned game loop tying the world to its systems.

use std::time::Duration;

use alienu_core::{Command, Event};
use alienu_system_bootstrap::Bootstrap;
use alienu_system_city::{CityGeneration, GenerationReport};
use alienu_system_waves::{WaveController, WaveState};
use alienu_world::{self as world, query, World};
use anyhow::{Context, Result};
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::GameConfig;

/// Scripted pilot that circles the arena and shoots the oldest alien.
#[derive(Clone, Debug)]
pub(crate) struct Autopilot {
    shot_interval: Duration,
    shot_damage: f32,
    orbit_radius: f32,
    orbit_speed: f32,
    cooldown: Duration,
    elapsed: Duration,
}

impl Autopilot {
    pub(crate) fn new(shot_interval: Duration, shot_damage: f32) -> Self {
        Self {
            shot_interval,
            shot_damage,
            orbit_radius: 6.0,
            orbit_speed: 0.4,
            cooldown: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    fn plan(&mut self, dt: Duration, world: &World, out: &mut Vec<Command>) {
        if query::outcome(world).is_some() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        let angle = self.elapsed.as_secs_f32() * self.orbit_speed;
        let center = query::arena_center(world);
        let hover = query::player_position(world).y;
        let position = Vec3::new(
            center.x + angle.cos() * self.orbit_radius,
            hover,
            center.z + angle.sin() * self.orbit_radius,
        );
        out.push(Command::MovePlayer { position });

        let enemies = query::enemy_view(world).into_vec();
        out.extend(enemies.iter().map(|enemy| Command::AssignEnemyTarget {
            enemy: enemy.id,
            target: position,
        }));

        self.cooldown = self.cooldown.saturating_sub(dt);
        if !self.cooldown.is_zero() {
            return;
        }
        if let Some(target) = enemies.iter().find(|enemy| enemy.tracked) {
            out.push(Command::DamageEnemy {
                enemy: target.id,
                amount: self.shot_damage,
            });
            self.cooldown = self.shot_interval;
        }
    }
}

/// Everything a running session owns; passed explicitly to the frame loop.
#[derive(Debug)]
pub(crate) struct GameState {
    world: World,
    waves: WaveController,
    autopilot: Option<Autopilot>,
    pending: Vec<Command>,
    events: Vec<Event>,
}

impl GameState {
    /// Generates the arena city and prepares the wave controller.
    pub(crate) fn bootstrap(
        config: &GameConfig,
        autopilot: Option<Autopilot>,
    ) -> Result<(Self, GenerationReport)> {
        let mut world = World::with_ship(config.ship.clone());
        let mut events = Vec::new();
        let mut rng = ChaCha8Rng::seed_from_u64(config.city.seed);
        let generation = CityGeneration::new(config.city.clone());
        let report = Bootstrap
            .build_arena(&mut world, &generation, &config.catalog, &mut rng, &mut events)
            .context("failed to generate the arena city")?;

        let state = Self {
            world,
            waves: WaveController::new(config.waves.clone()),
            autopilot,
            pending: Vec::new(),
            events: Vec::new(),
        };
        Ok((state, report))
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn waves(&self) -> &WaveState {
        self.waves.state()
    }

    /// Queues a command to run at the start of the next tick.
    pub(crate) fn submit(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Runs one frame: queued commands, the clock, the autopilot, then every
    /// command the systems emit in response until the world settles.
    pub(crate) fn tick(&mut self, dt: Duration) {
        self.pending.push(Command::Tick { dt });
        if let Some(autopilot) = self.autopilot.as_mut() {
            autopilot.plan(dt, &self.world, &mut self.pending);
        }

        while !self.pending.is_empty() {
            for command in self.pending.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }

            let center = query::arena_center(&self.world);
            let navigation = query::navigation(&self.world);
            self.waves
                .handle(&self.events, &navigation, center, &mut self.pending);
            self.events.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alienu_core::GameOutcome;
    use alienu_system_waves::WavePhase;

    use crate::hud::HudFrame;

    fn small_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.city.width = 24;
        config.city.height = 24;
        config.city.target_points = 6;
        config.city.depth_max = 2;
        config.reseed(0xfeed);
        config
    }

    fn pilot() -> Option<Autopilot> {
        Some(Autopilot::new(Duration::from_millis(100), 35.0))
    }

    #[test]
    fn bootstrap_installs_city() {
        let (state, report) = GameState::bootstrap(&small_config(), None).expect("valid config");
        assert_eq!(
            query::buildings(state.world()).len() as u32,
            report.buildings_built
        );
        assert!(query::city(state.world()).is_some());
        assert_eq!(state.waves().phase(), WavePhase::Idle);
    }

    #[test]
    fn autopilot_clears_every_wave() {
        let (mut state, _) = GameState::bootstrap(&small_config(), pilot()).expect("valid config");
        for _ in 0..2_000 {
            state.tick(Duration::from_millis(50));
            if query::outcome(state.world()).is_some() {
                break;
            }
        }

        assert_eq!(query::outcome(state.world()), Some(GameOutcome::Victory));
        assert_eq!(state.waves().phase(), WavePhase::Victory);
        assert_eq!(
            HudFrame::capture(state.world(), state.waves()).wave,
            "YOU WIN! YOU DEFEATED ALL ALIENS!"
        );
    }

    #[test]
    fn sessions_with_equal_seeds_replay_identically() {
        let run = || {
            let (mut state, _) =
                GameState::bootstrap(&small_config(), pilot()).expect("valid config");
            let mut frames = Vec::new();
            for _ in 0..400 {
                state.tick(Duration::from_millis(50));
                frames.push(HudFrame::capture(state.world(), state.waves()));
            }
            (frames, query::enemy_view(state.world()).into_vec())
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn player_death_ends_waves_until_restart() {
        let (mut state, _) = GameState::bootstrap(&small_config(), None).expect("valid config");
        for _ in 0..100 {
            state.tick(Duration::from_millis(50));
        }
        assert!(state.waves().live_enemy_count() > 0);

        state.submit(Command::DamagePlayer { amount: 1_000.0 });
        state.tick(Duration::from_millis(50));
        assert_eq!(query::outcome(state.world()), Some(GameOutcome::Defeat));
        assert_eq!(state.waves().phase(), WavePhase::GameOver);
        assert_eq!(
            HudFrame::capture(state.world(), state.waves()).status,
            Some("You Lose! Press R to Restart!")
        );

        state.submit(Command::Restart);
        state.tick(Duration::from_millis(50));
        assert_eq!(query::outcome(state.world()), None);
        assert_eq!(query::enemy_count(state.world()), 0);
        assert_eq!(state.waves().phase(), WavePhase::Idle);
        assert_eq!(state.waves().current_wave(), 1);
        assert!(query::city(state.world()).is_some(), "restart keeps the city");
    }

    #[test]
    fn idle_player_falls_to_alien_fire() {
        let (mut state, _) = GameState::bootstrap(&small_config(), None).expect("valid config");
        for _ in 0..2_400 {
            state.tick(Duration::from_millis(50));
            if query::outcome(state.world()).is_some() {
                break;
            }
        }

        assert_eq!(query::outcome(state.world()), Some(GameOutcome::Defeat));
        assert_eq!(state.waves().phase(), WavePhase::GameOver);
        assert!(query::ship(state.world()).destroyed);
    }

    #[test]
    fn unbounded_ship_delays_from_config_keep_running() {
        let mut config = small_config();
        config.ship = GameConfig::parse(
            "[ship]\nhealth_regen_delay_secs = inf\nboost_regen_delay_secs = 1e30\n",
        )
        .expect("delays parse")
        .ship;
        let (mut state, _) = GameState::bootstrap(&config, None).expect("valid config");

        state.submit(Command::DamagePlayer { amount: 10.0 });
        for _ in 0..200 {
            state.tick(Duration::from_millis(50));
        }
        assert!(query::ship(state.world()).health_target < 100.0);
    }
}
