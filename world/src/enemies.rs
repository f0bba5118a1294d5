//! Authoritative enemy state management utilities.

use std::{collections::BTreeMap, time::Duration};

use alienu_core::{EnemyId, EnemyStats};
use glam::Vec3;

/// Enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) position: Vec3,
    pub(crate) target: Option<Vec3>,
    pub(crate) max_health: f32,
    pub(crate) current_health: f32,
    pub(crate) fire_rate: f32,
    pub(crate) range: f32,
    pub(crate) projectile_damage: f32,
    /// Seconds until the enemy may fire again.
    reload: f32,
    pub(crate) tracked: bool,
}

/// Hit landed on the player during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Shot {
    pub(crate) enemy: EnemyId,
    pub(crate) damage: f32,
}

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    Survived { remaining_health: f32 },
    Died { tracked: bool },
    Missing,
}

/// Registry that stores live enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn spawn(
        &mut self,
        position: Vec3,
        stats: EnemyStats,
        target: Option<Vec3>,
        tracked: bool,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let enemy = Enemy {
            id,
            position,
            target,
            max_health: stats.max_health,
            current_health: stats.max_health,
            fire_rate: stats.fire_rate,
            range: stats.range,
            projectile_damage: stats.projectile_damage,
            reload: 0.0,
            tracked,
        };
        let _ = self.entries.insert(id, enemy);
        id
    }

    pub(crate) fn assign_target(&mut self, enemy: EnemyId, target: Vec3) -> bool {
        match self.entries.get_mut(&enemy) {
            Some(entry) => {
                entry.target = Some(target);
                true
            }
            None => false,
        }
    }

    /// Removes health from the enemy, despawning it when health runs out.
    pub(crate) fn apply_damage(&mut self, enemy: EnemyId, amount: f32) -> DamageOutcome {
        let Some(entry) = self.entries.get_mut(&enemy) else {
            return DamageOutcome::Missing;
        };

        if entry.current_health - amount <= 0.0 {
            let tracked = entry.tracked;
            let _ = self.entries.remove(&enemy);
            return DamageOutcome::Died { tracked };
        }

        entry.current_health -= amount;
        DamageOutcome::Survived {
            remaining_health: entry.current_health,
        }
    }

    /// Counts down every reload and lets enemies within range of `target`
    /// fire once, in identifier order.
    pub(crate) fn fire_at(&mut self, target: Vec3, dt: Duration) -> Vec<Shot> {
        let seconds = dt.as_secs_f32();
        let mut shots = Vec::new();
        for enemy in self.entries.values_mut() {
            enemy.reload = (enemy.reload - seconds).max(0.0);
            if !(enemy.fire_rate.is_finite() && enemy.fire_rate > 0.0) {
                continue;
            }
            if enemy.reload > 0.0 || enemy.position.distance(target) > enemy.range {
                continue;
            }

            enemy.reload = enemy.fire_rate.recip();
            shots.push(Shot {
                enemy: enemy.id,
                damage: enemy.projectile_damage,
            });
        }
        shots
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
