#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave and spawn controller for the arena.
//!
//! The controller owns the wave counters and drives every delayed step of the
//! wave loop (first wave, spawn cycle, next-wave delay) from a [`TimerQueue`]
//! that advances only when the world reports elapsed time.

use std::time::Duration;

use alienu_core::{
    delay_from_secs, Command, EnemyStats, Event, GameOutcome, NavigationQuery, TimerHandle,
    TimerQueue,
};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, UnitBall};
use serde::Deserialize;

/// Shortest interval between two spawn cycle steps.
const MIN_SPAWN_DELAY: Duration = Duration::from_millis(1);

/// Tuning for waves and enemy spawning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Radius of the ball around the arena center that spawn points are drawn from.
    pub spawn_radius: f32,
    /// Enemies queued per wave are `wave * enemy_count_multiplier / 2`.
    pub enemy_count_multiplier: u32,
    /// Extra health fraction granted per wave after the first.
    pub wave_multiplier: f32,
    /// Seconds between two spawn cycle steps.
    pub spawn_delay_secs: f32,
    /// Enemies allowed alive at once.
    pub alien_spawn_limit: u32,
    /// Seconds between clearing a wave and starting the next.
    pub wave_start_delay_secs: f32,
    /// Final wave; clearing it wins the game.
    pub wave_limit: u32,
    /// Seconds before the first wave is queued.
    pub initial_delay_secs: f32,
    /// Health of a first-wave enemy.
    pub base_health: f32,
    /// Fire rate of an enemy before the per-wave bonus.
    pub base_fire_rate: f32,
    /// Distance within which enemies fire at the player.
    pub enemy_range: f32,
    /// Health removed from the ship by each enemy shot.
    pub projectile_damage: f32,
    /// Extra spawn point draws after the first one misses the navigable surface.
    pub spawn_attempt_limit: u32,
    /// Seed for spawn point selection.
    pub seed: u64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            spawn_radius: 20.0,
            enemy_count_multiplier: 4,
            wave_multiplier: 0.5,
            spawn_delay_secs: 1.0,
            alien_spawn_limit: 20,
            wave_start_delay_secs: 4.0,
            wave_limit: 3,
            initial_delay_secs: 4.5,
            base_health: 100.0,
            base_fire_rate: 12.0,
            enemy_range: 25.0,
            projectile_damage: 0.5,
            spawn_attempt_limit: 25,
            seed: 0,
        }
    }
}

impl WaveConfig {
    fn spawn_delay(&self) -> Duration {
        delay_from_secs(self.spawn_delay_secs).max(MIN_SPAWN_DELAY)
    }
}

/// Coarse position of the controller within the wave loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// Waiting for the first wave.
    Idle,
    /// Enemies of the current wave are still queued.
    Spawning,
    /// Every enemy of the wave spawned; waiting for them to die.
    Draining,
    /// The wave was cleared and the next one is pending.
    WaveComplete,
    /// The final wave was cleared.
    Victory,
    /// The player died.
    GameOver,
}

impl WavePhase {
    /// Reports whether the phase only ends through a restart.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::GameOver)
    }
}

/// Counters describing the wave loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveState {
    current_wave: u32,
    wave_limit: u32,
    enemies_queued: u32,
    live_enemy_count: u32,
    spawning: bool,
    game_over: bool,
    phase: WavePhase,
}

impl WaveState {
    fn new(wave_limit: u32) -> Self {
        Self {
            current_wave: 1,
            wave_limit,
            enemies_queued: 0,
            live_enemy_count: 0,
            spawning: false,
            game_over: false,
            phase: WavePhase::Idle,
        }
    }

    /// Wave currently being fought, starting at one.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Final wave of the session.
    #[must_use]
    pub const fn wave_limit(&self) -> u32 {
        self.wave_limit
    }

    /// Enemies still waiting to spawn.
    #[must_use]
    pub const fn enemies_queued(&self) -> u32 {
        self.enemies_queued
    }

    /// Tracked enemies alive in the arena.
    #[must_use]
    pub const fn live_enemy_count(&self) -> u32 {
        self.live_enemy_count
    }

    /// Whether the spawn cycle is allowed to keep running.
    #[must_use]
    pub const fn spawning(&self) -> bool {
        self.spawning
    }

    /// Whether the session reached a terminal outcome.
    #[must_use]
    pub const fn game_over(&self) -> bool {
        self.game_over
    }

    /// Current phase of the wave loop.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaveTimer {
    FirstWave,
    SpawnCycle,
    WaveAdvance,
}

/// Controller that queues waves, paces spawns and declares victory.
#[derive(Debug)]
pub struct WaveController {
    config: WaveConfig,
    state: WaveState,
    timers: TimerQueue<WaveTimer>,
    spawn_cycle: Option<TimerHandle>,
    wave_advance: Option<TimerHandle>,
    rng: ChaCha8Rng,
}

impl WaveController {
    /// Creates a controller and schedules its first wave.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut controller = Self {
            state: WaveState::new(config.wave_limit),
            timers: TimerQueue::new(),
            spawn_cycle: None,
            wave_advance: None,
            rng,
            config,
        };
        controller.schedule_first_wave();
        controller
    }

    fn schedule_first_wave(&mut self) {
        let _ = self.timers.schedule(
            delay_from_secs(self.config.initial_delay_secs),
            WaveTimer::FirstWave,
        );
    }

    /// Current counters.
    #[must_use]
    pub const fn state(&self) -> &WaveState {
        &self.state
    }

    /// Configuration the controller was created with.
    #[must_use]
    pub const fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Queues the enemies of wave `wave` and starts the spawn cycle if idle.
    ///
    /// Re-queueing replaces the pending count; the wave number only moves
    /// forward. A wave with nothing to spawn and nobody alive is cleared on
    /// the spot.
    pub fn queue_wave(&mut self, wave: u32) {
        if self.state.phase.is_terminal() {
            log::debug!("ignoring wave {wave} after the session ended");
            return;
        }

        let queued = wave.saturating_mul(self.config.enemy_count_multiplier) / 2;
        self.state.current_wave = self.state.current_wave.max(wave);
        if queued == 0 && self.state.live_enemy_count == 0 {
            log::info!("wave {} has no enemies", self.state.current_wave);
            self.state.enemies_queued = 0;
            self.state.spawning = false;
            if let Some(handle) = self.spawn_cycle.take() {
                let _ = self.timers.cancel(handle);
            }
            self.complete_wave();
            return;
        }

        self.state.enemies_queued = queued;
        self.state.spawning = true;
        self.state.phase = WavePhase::Spawning;

        if self.spawn_cycle.is_none() {
            self.spawn_cycle = Some(self.timers.schedule(Duration::ZERO, WaveTimer::SpawnCycle));
        }

        log::info!("wave {}: queued {queued} enemies", self.state.current_wave);
    }

    /// Records the death of a tracked enemy.
    ///
    /// The last death of a wave stops spawning and schedules the next wave.
    pub fn on_enemy_death(&mut self) {
        if self.state.phase.is_terminal() || self.state.live_enemy_count == 0 {
            return;
        }

        self.state.live_enemy_count -= 1;
        if self.state.live_enemy_count > 0 {
            return;
        }

        self.state.spawning = false;
        self.state.enemies_queued = 0;
        if let Some(handle) = self.spawn_cycle.take() {
            let _ = self.timers.cancel(handle);
        }
        self.complete_wave();
    }

    fn complete_wave(&mut self) {
        if self.wave_advance.is_none() {
            self.wave_advance = Some(self.timers.schedule(
                delay_from_secs(self.config.wave_start_delay_secs),
                WaveTimer::WaveAdvance,
            ));
        }
        self.state.phase = WavePhase::WaveComplete;
        log::info!("wave {} cleared", self.state.current_wave);
    }

    /// Ends the wave loop after the player died.
    pub fn on_player_death(&mut self) {
        if self.state.game_over {
            return;
        }

        self.state.spawning = false;
        self.state.game_over = true;
        self.state.phase = WavePhase::GameOver;
        self.spawn_cycle = None;
        self.wave_advance = None;
        self.timers.reset();
        log::info!("player destroyed during wave {}", self.state.current_wave);
    }

    /// Resets every counter and schedules the first wave again.
    pub fn restart(&mut self) {
        self.state = WaveState::new(self.config.wave_limit);
        self.timers.reset();
        self.spawn_cycle = None;
        self.wave_advance = None;
        self.schedule_first_wave();
    }

    /// Advances the wave clock and runs every step that came due.
    pub fn tick<N>(&mut self, dt: Duration, navigation: &N, arena_center: Vec3, out: &mut Vec<Command>)
    where
        N: NavigationQuery + ?Sized,
    {
        self.timers.advance(dt);
        while let Some(expired) = self.timers.pop_expired() {
            match expired.key {
                WaveTimer::FirstWave => self.queue_wave(self.state.current_wave),
                WaveTimer::SpawnCycle => self.run_spawn_cycle(navigation, arena_center, out),
                WaveTimer::WaveAdvance => self.advance_wave(out),
            }
        }
    }

    /// Consumes world events and emits spawn and end-of-game commands.
    pub fn handle<N>(
        &mut self,
        events: &[Event],
        navigation: &N,
        arena_center: Vec3,
        out: &mut Vec<Command>,
    ) where
        N: NavigationQuery + ?Sized,
    {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.tick(*dt, navigation, arena_center, out),
                Event::EnemyDied { tracked: true, .. } => self.on_enemy_death(),
                Event::PlayerDied => self.on_player_death(),
                Event::Restarted => self.restart(),
                _ => {}
            }
        }
    }

    fn run_spawn_cycle<N>(&mut self, navigation: &N, arena_center: Vec3, out: &mut Vec<Command>)
    where
        N: NavigationQuery + ?Sized,
    {
        self.spawn_cycle = None;
        if !self.state.spawning && self.state.enemies_queued == 0 {
            return;
        }

        if self.state.enemies_queued > 0
            && self.state.live_enemy_count < self.config.alien_spawn_limit
        {
            self.state.enemies_queued -= 1;
            self.state.live_enemy_count += 1;
            let position = spawn_position(
                navigation,
                arena_center,
                self.config.spawn_radius,
                self.config.spawn_attempt_limit,
                &mut self.rng,
            );
            out.push(Command::SpawnEnemy {
                position,
                stats: enemy_stats_for_wave(&self.config, self.state.current_wave),
                tracked: true,
            });
        }

        if self.state.enemies_queued == 0 && self.state.phase == WavePhase::Spawning {
            self.state.phase = WavePhase::Draining;
        }

        self.spawn_cycle = Some(
            self.timers
                .schedule(self.config.spawn_delay(), WaveTimer::SpawnCycle),
        );
    }

    fn advance_wave(&mut self, out: &mut Vec<Command>) {
        self.wave_advance = None;
        let next = self.state.current_wave.saturating_add(1);
        if next <= self.state.wave_limit {
            self.queue_wave(next);
            return;
        }

        log::info!("all {} waves cleared", self.state.wave_limit);
        self.state.phase = WavePhase::Victory;
        self.state.game_over = true;
        out.push(Command::EndGame {
            outcome: GameOutcome::Victory,
        });
    }
}

/// Health and fire rate given to enemies spawned during `wave`.
#[must_use]
pub fn enemy_stats_for_wave(config: &WaveConfig, wave: u32) -> EnemyStats {
    let wave = wave as f32;
    EnemyStats {
        max_health: config.base_health
            + config.base_health * config.wave_multiplier * (wave - 1.0),
        fire_rate: config.base_fire_rate + wave * 0.5,
        range: config.enemy_range,
        projectile_damage: config.projectile_damage,
    }
}

/// Picks a navigable point near a random offset inside a ball of `radius`
/// around `center`.
///
/// Draws up to `attempt_limit + 1` candidates and falls back to the origin
/// when none of them reaches the navigable surface.
pub fn spawn_position<N, R>(
    navigation: &N,
    center: Vec3,
    radius: f32,
    attempt_limit: u32,
    rng: &mut R,
) -> Vec3
where
    N: NavigationQuery + ?Sized,
    R: Rng + ?Sized,
{
    for _ in 0..=attempt_limit {
        let offset: [f32; 3] = UnitBall.sample(rng);
        let candidate = center + Vec3::from(offset) * radius;
        if let Some(point) = navigation.sample_navigable_point(candidate, radius) {
            return point;
        }
    }

    log::warn!("no navigable spawn point within {radius} of {center}, using the origin");
    Vec3::ZERO
}
