#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Alienu arena.

use std::time::Duration;

use alienu_core::{CityPlan, Command, Event, GameOutcome, TimerQueue, WELCOME_BANNER};
use glam::Vec3;

mod enemies;
mod navigation;
mod ship;

use enemies::{DamageOutcome, EnemyRegistry};
use ship::{ShipResources, ShipTimer};

pub use navigation::ArenaNavigation;
pub use ship::{ShipConfig, ShipSnapshot};

/// Represents the authoritative arena state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    city: Option<CityPlan>,
    enemies: EnemyRegistry,
    ship: ShipResources,
    ship_timers: TimerQueue<ShipTimer>,
    player_spawn: Vec3,
    player_position: Vec3,
    outcome: Option<GameOutcome>,
    tick_index: u64,
}

impl World {
    /// Creates an empty arena with a default ship.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ship(ShipConfig::default())
    }

    /// Creates an empty arena whose ship uses the provided tuning.
    #[must_use]
    pub fn with_ship(config: ShipConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            city: None,
            enemies: EnemyRegistry::new(),
            ship: ShipResources::new(config),
            ship_timers: TimerQueue::new(),
            player_spawn: Vec3::ZERO,
            player_position: Vec3::ZERO,
            outcome: None,
            tick_index: 0,
        }
    }

    fn end(&mut self, outcome: GameOutcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }

        log::info!("session ended: {outcome:?}");
        self.outcome = Some(outcome);
        out_events.push(Event::GameEnded { outcome });
    }

    fn damage_player(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }

        let destroyed = self.ship.apply_damage(amount, &mut self.ship_timers);
        out_events.push(Event::PlayerDamaged {
            health_target: self.ship.snapshot().health_target,
        });
        if destroyed {
            out_events.push(Event::PlayerDied);
            self.end(GameOutcome::Defeat, out_events);
        }
    }

    fn enemies_fire(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }

        for shot in self.enemies.fire_at(self.player_position, dt) {
            if self.outcome.is_some() {
                break;
            }
            log::trace!("enemy {} hit the ship for {}", shot.enemy.get(), shot.damage);
            self.damage_player(shot.damage, out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::InstallCity { plan } => {
            let buildings = u32::try_from(plan.buildings.len()).unwrap_or(u32::MAX);
            let occupied_cells = u32::try_from(plan.grid.occupied_count()).unwrap_or(u32::MAX);
            let center = plan.arena_center();
            world.player_spawn = Vec3::new(center.x, plan.ground.center.y + 10.0, center.z);
            world.player_position = world.player_spawn;
            world.city = Some(plan);
            out_events.push(Event::CityInstalled {
                buildings,
                occupied_cells,
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            world.ship_timers.advance(dt);
            while let Some(expired) = world.ship_timers.pop_expired() {
                world.ship.on_timer(expired.key);
            }
            world.enemies_fire(dt, out_events);
            world.ship.update(dt, &mut world.ship_timers);
        }
        Command::SpawnEnemy {
            position,
            stats,
            tracked,
        } => {
            if world.outcome.is_some() {
                log::debug!("ignoring spawn at {position} after the session ended");
                return;
            }

            let enemy = world
                .enemies
                .spawn(position, stats, Some(world.player_position), tracked);
            out_events.push(Event::EnemySpawned {
                enemy,
                position,
                stats,
                tracked,
            });
        }
        Command::AssignEnemyTarget { enemy, target } => {
            if !world.enemies.assign_target(enemy, target) {
                log::debug!("enemy {} is gone, target ignored", enemy.get());
            }
        }
        Command::DamageEnemy { enemy, amount } => {
            match world.enemies.apply_damage(enemy, amount) {
                DamageOutcome::Survived { remaining_health } => {
                    out_events.push(Event::EnemyDamaged {
                        enemy,
                        remaining_health,
                    });
                }
                DamageOutcome::Died { tracked } => {
                    out_events.push(Event::EnemyDied { enemy, tracked });
                }
                DamageOutcome::Missing => {}
            }
        }
        Command::MovePlayer { position } => {
            if !world.ship.is_destroyed() {
                world.player_position = position;
            }
        }
        Command::DamagePlayer { amount } => world.damage_player(amount, out_events),
        Command::SetBoosting { active } => {
            world.ship.set_boost_requested(active);
        }
        Command::EndGame { outcome } => {
            world.end(outcome, out_events);
        }
        Command::Restart => {
            world.enemies.clear();
            world.ship = ShipResources::new(world.ship.config().clone());
            world.ship_timers.reset();
            world.player_position = world.player_spawn;
            world.outcome = None;
            out_events.push(Event::Restarted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use alienu_core::{BuildingInstance, CityPlan, EnemyId, GameOutcome, OccupancyGrid};
    use glam::Vec3;

    use super::{ArenaNavigation, ShipSnapshot, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the installed city, if any.
    #[must_use]
    pub fn city(world: &World) -> Option<&CityPlan> {
        world.city.as_ref()
    }

    /// Provides read-only access to the arena's footprint grid.
    #[must_use]
    pub fn occupancy(world: &World) -> Option<&OccupancyGrid> {
        world.city.as_ref().map(|city| &city.grid)
    }

    /// Buildings standing in the arena.
    #[must_use]
    pub fn buildings(world: &World) -> &[BuildingInstance] {
        world
            .city
            .as_ref()
            .map(|city| city.buildings.as_slice())
            .unwrap_or(&[])
    }

    /// Center of the arena at ground level; the origin without a city.
    #[must_use]
    pub fn arena_center(world: &World) -> Vec3 {
        world
            .city
            .as_ref()
            .map_or(Vec3::ZERO, CityPlan::arena_center)
    }

    /// Navigation surface backed by the installed city.
    #[must_use]
    pub fn navigation(world: &World) -> ArenaNavigation<'_> {
        let floor = world.city.as_ref().map_or(0.0, |city| city.ground.center.y);
        ArenaNavigation::new(occupancy(world), floor)
    }

    /// Captures a read-only view of the enemies inside the arena.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                target: enemy.target,
                health: enemy.current_health,
                max_health: enemy.max_health,
                fire_rate: enemy.fire_rate,
                range: enemy.range,
                tracked: enemy.tracked,
            })
            .collect();
        EnemyView { snapshots }
    }

    /// Number of enemies alive in the arena, tracked or not.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Snapshot of the ship's health and boost bars.
    #[must_use]
    pub fn ship(world: &World) -> ShipSnapshot {
        world.ship.snapshot()
    }

    /// Last reported position of the player ship.
    #[must_use]
    pub fn player_position(world: &World) -> Vec3 {
        world.player_position
    }

    /// Terminal outcome of the session, once reached.
    #[must_use]
    pub fn outcome(world: &World) -> Option<GameOutcome> {
        world.outcome
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Read-only snapshot describing all enemies within the arena.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured snapshots ordered by identifier.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier assigned to the enemy.
        pub id: EnemyId,
        /// Position the enemy occupies.
        pub position: Vec3,
        /// Position the enemy pursues.
        pub target: Option<Vec3>,
        /// Health remaining.
        pub health: f32,
        /// Health the enemy spawned with.
        pub max_health: f32,
        /// Shots per second while in range.
        pub fire_rate: f32,
        /// Distance within which the enemy fires at the player.
        pub range: f32,
        /// Whether the enemy counts toward the wave.
        pub tracked: bool,
    }
}
