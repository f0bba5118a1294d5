//! Health and boost bookkeeping for the player ship.

use std::time::Duration;

use alienu_core::{delay_from_secs, TimerHandle, TimerQueue};
use serde::Deserialize;

/// Tuning for the ship's health and boost bars.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Health the ship starts with and regenerates up to.
    pub max_health: f32,
    /// Rate at which displayed health converges on its target, per second.
    pub health_change_rate: f32,
    /// Seconds without damage before health regeneration starts.
    pub health_regen_delay_secs: f32,
    /// Health regained per second once regeneration runs.
    pub health_regen_rate: f32,
    /// Boost capacity.
    pub max_boost: f32,
    /// Boost consumed per second while boosting.
    pub boost_decrease: f32,
    /// Seconds without boosting before boost regeneration starts.
    pub boost_regen_delay_secs: f32,
    /// Boost regained per second once regeneration runs.
    pub boost_regen_rate: f32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            health_change_rate: 10.0,
            health_regen_delay_secs: 4.0,
            health_regen_rate: 5.0,
            max_boost: 100.0,
            boost_decrease: 20.0,
            boost_regen_delay_secs: 2.5,
            boost_regen_rate: 10.0,
        }
    }
}

/// Read-only view of the ship's bars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipSnapshot {
    /// Health currently shown on the bar.
    pub health: f32,
    /// Health the bar is converging toward.
    pub health_target: f32,
    /// Health capacity.
    pub max_health: f32,
    /// Remaining boost.
    pub boost: f32,
    /// Boost capacity.
    pub max_boost: f32,
    /// Whether boost is being consumed.
    pub boosting: bool,
    /// Whether the ship was destroyed.
    pub destroyed: bool,
}

impl ShipSnapshot {
    /// Displayed health as a fraction of capacity.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        ratio(self.health, self.max_health)
    }

    /// Remaining boost as a fraction of capacity.
    #[must_use]
    pub fn boost_ratio(&self) -> f32 {
        ratio(self.boost, self.max_boost)
    }
}

fn ratio(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        0.0
    } else {
        (value / max).clamp(0.0, 1.0)
    }
}

/// Delayed cycles driven by the world's timer queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShipTimer {
    HealthRegen,
    BoostRegen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Regen {
    Idle,
    Pending(TimerHandle),
    Active,
}

impl Regen {
    fn stop(&mut self, timers: &mut TimerQueue<ShipTimer>) {
        if let Regen::Pending(handle) = *self {
            let _ = timers.cancel(handle);
        }
        *self = Regen::Idle;
    }

    fn restart(&mut self, timers: &mut TimerQueue<ShipTimer>, delay: Duration, key: ShipTimer) {
        self.stop(timers);
        *self = Regen::Pending(timers.schedule(delay, key));
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ShipResources {
    config: ShipConfig,
    current_health: f32,
    health_target: f32,
    current_boost: f32,
    boost_requested: bool,
    health_regen: Regen,
    boost_regen: Regen,
    destroyed: bool,
}

impl ShipResources {
    pub(crate) fn new(config: ShipConfig) -> Self {
        Self {
            current_health: config.max_health,
            health_target: config.max_health,
            current_boost: config.max_boost,
            boost_requested: false,
            health_regen: Regen::Idle,
            boost_regen: Regen::Idle,
            destroyed: false,
            config,
        }
    }

    pub(crate) fn config(&self) -> &ShipConfig {
        &self.config
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn set_boost_requested(&mut self, requested: bool) {
        self.boost_requested = requested;
    }

    fn is_boosting(&self) -> bool {
        self.boost_requested && self.current_boost > 0.0 && !self.destroyed
    }

    /// Lowers the health target and restarts the regeneration delay.
    ///
    /// Returns `true` when the hit destroyed the ship.
    pub(crate) fn apply_damage(&mut self, amount: f32, timers: &mut TimerQueue<ShipTimer>) -> bool {
        if self.destroyed {
            return false;
        }

        if self.health_target - amount <= 0.0 {
            self.health_target = 0.0;
            self.destroyed = true;
            self.health_regen.stop(timers);
            self.boost_regen.stop(timers);
            return true;
        }

        self.health_target -= amount;
        self.health_regen.restart(
            timers,
            delay_from_secs(self.config.health_regen_delay_secs),
            ShipTimer::HealthRegen,
        );
        false
    }

    pub(crate) fn on_timer(&mut self, timer: ShipTimer) {
        match timer {
            ShipTimer::HealthRegen => {
                if matches!(self.health_regen, Regen::Pending(_)) {
                    self.health_regen = Regen::Active;
                }
            }
            ShipTimer::BoostRegen => {
                if matches!(self.boost_regen, Regen::Pending(_)) {
                    self.boost_regen = Regen::Active;
                }
            }
        }
    }

    pub(crate) fn update(&mut self, dt: Duration, timers: &mut TimerQueue<ShipTimer>) {
        let seconds = dt.as_secs_f32();
        self.current_health = move_towards(
            self.current_health,
            self.health_target,
            self.config.health_change_rate * seconds,
        );

        if self.is_boosting() {
            self.boost_regen.stop(timers);
            self.current_boost -= self.config.boost_decrease * seconds;
        } else if self.boost_regen == Regen::Idle && !self.destroyed {
            self.boost_regen.restart(
                timers,
                delay_from_secs(self.config.boost_regen_delay_secs),
                ShipTimer::BoostRegen,
            );
        }

        if self.boost_regen == Regen::Active {
            self.current_boost += self.config.boost_regen_rate * seconds;
        }

        if self.health_regen == Regen::Active {
            self.health_target += self.config.health_regen_rate * seconds;
        }

        self.health_target = self.health_target.clamp(0.0, self.config.max_health);
        self.current_boost = self.current_boost.clamp(0.0, self.config.max_boost);
    }

    pub(crate) fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            health: self.current_health,
            health_target: self.health_target,
            max_health: self.config.max_health,
            boost: self.current_boost,
            max_boost: self.config.max_boost,
            boosting: self.is_boosting(),
            destroyed: self.destroyed,
        }
    }
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pump(
        ship: &mut ShipResources,
        timers: &mut TimerQueue<ShipTimer>,
        dt: Duration,
        steps: u32,
    ) {
        for _ in 0..steps {
            timers.advance(dt);
            while let Some(expired) = timers.pop_expired() {
                ship.on_timer(expired.key);
            }
            ship.update(dt, timers);
        }
    }

    #[test]
    fn displayed_health_converges_on_target() {
        let mut timers = TimerQueue::new();
        let mut ship = ShipResources::new(ShipConfig::default());
        assert!(!ship.apply_damage(30.0, &mut timers));

        pump(&mut ship, &mut timers, Duration::from_secs(1), 1);
        let snapshot = ship.snapshot();
        assert!((snapshot.health - 90.0).abs() < 1e-4);
        assert!((snapshot.health_target - 70.0).abs() < 1e-4);

        pump(&mut ship, &mut timers, Duration::from_secs(1), 2);
        assert!((ship.snapshot().health - 70.0).abs() < 1e-4);
    }

    #[test]
    fn damage_restarts_health_regeneration_delay() {
        let mut timers = TimerQueue::new();
        let mut ship = ShipResources::new(ShipConfig::default());
        let step = Duration::from_millis(500);

        assert!(!ship.apply_damage(20.0, &mut timers));
        pump(&mut ship, &mut timers, step, 6);
        assert!(!ship.apply_damage(10.0, &mut timers));
        pump(&mut ship, &mut timers, step, 6);
        assert!(
            (ship.snapshot().health_target - 70.0).abs() < 1e-4,
            "regeneration must wait a full delay after the latest hit",
        );

        pump(&mut ship, &mut timers, step, 4);
        assert!(ship.snapshot().health_target > 70.0);
    }

    #[test]
    fn lethal_damage_destroys_ship_once() {
        let mut timers = TimerQueue::new();
        let mut ship = ShipResources::new(ShipConfig::default());

        assert!(ship.apply_damage(150.0, &mut timers));
        assert!(!ship.apply_damage(10.0, &mut timers));

        pump(&mut ship, &mut timers, Duration::from_secs(1), 10);
        let snapshot = ship.snapshot();
        assert!(snapshot.destroyed);
        assert_eq!(snapshot.health_target, 0.0);
        assert!(timers.is_empty());
    }

    #[test]
    fn boosting_drains_then_regenerates_after_delay() {
        let mut timers = TimerQueue::new();
        let mut ship = ShipResources::new(ShipConfig::default());
        let step = Duration::from_millis(500);

        ship.set_boost_requested(true);
        pump(&mut ship, &mut timers, step, 4);
        assert!((ship.snapshot().boost - 60.0).abs() < 1e-3);
        assert!(ship.snapshot().boosting);

        ship.set_boost_requested(false);
        pump(&mut ship, &mut timers, step, 5);
        assert!((ship.snapshot().boost - 60.0).abs() < 1e-3);

        pump(&mut ship, &mut timers, step, 2);
        assert!(ship.snapshot().boost > 60.0);
    }

    #[test]
    fn unbounded_delays_postpone_regeneration_forever() {
        let mut timers = TimerQueue::new();
        let mut ship = ShipResources::new(ShipConfig {
            health_regen_delay_secs: f32::INFINITY,
            boost_regen_delay_secs: 1e30,
            ..ShipConfig::default()
        });

        assert!(!ship.apply_damage(10.0, &mut timers));
        ship.set_boost_requested(true);
        pump(&mut ship, &mut timers, Duration::from_secs(1), 1);
        ship.set_boost_requested(false);
        pump(&mut ship, &mut timers, Duration::from_secs(60), 10);

        let snapshot = ship.snapshot();
        assert!((snapshot.health_target - 90.0).abs() < 1e-4);
        assert!((snapshot.boost - 80.0).abs() < 1e-3);
    }

    #[test]
    fn boost_cannot_drop_below_zero() {
        let mut timers = TimerQueue::new();
        let mut ship = ShipResources::new(ShipConfig::default());

        ship.set_boost_requested(true);
        pump(&mut ship, &mut timers, Duration::from_secs(1), 8);
        let snapshot = ship.snapshot();
        assert_eq!(snapshot.boost, 0.0);
        assert!(!snapshot.boosting);
        assert_eq!(snapshot.boost_ratio(), 0.0);
    }
}
