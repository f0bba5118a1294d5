use std::time::Duration;

use alienu_core::{
    AssetKey, BuildingInstance, BuildingSegment, CellCoord, CityPlan, Command, Event, GameOutcome,
    Ground, NavigationQuery, OccupancyGrid, Tier,
};
use alienu_system_waves::{WaveConfig, WaveController, WavePhase};
use alienu_world::{self as world, query, World};
use glam::Vec3;

struct OpenField;

impl NavigationQuery for OpenField {
    fn sample_navigable_point(&self, near: Vec3, _radius: f32) -> Option<Vec3> {
        Some(Vec3::new(near.x, 0.0, near.z))
    }
}

fn quiet_config() -> WaveConfig {
    WaveConfig {
        initial_delay_secs: 1_000.0,
        ..WaveConfig::default()
    }
}

fn spawn_count(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, Command::SpawnEnemy { .. }))
        .count()
}

#[test]
fn third_wave_queues_six_enemies() {
    let mut controller = WaveController::new(quiet_config());
    controller.queue_wave(3);

    let state = controller.state();
    assert_eq!(state.enemies_queued(), 6);
    assert_eq!(state.current_wave(), 3);
    assert!(state.spawning());
    assert_eq!(state.phase(), WavePhase::Spawning);
}

#[test]
fn live_enemies_never_exceed_spawn_limit() {
    let mut controller = WaveController::new(WaveConfig {
        enemy_count_multiplier: 2,
        alien_spawn_limit: 2,
        ..quiet_config()
    });
    controller.queue_wave(5);
    assert_eq!(controller.state().enemies_queued(), 5);

    let mut out = Vec::new();
    for _ in 0..20 {
        controller.tick(Duration::from_secs(1), &OpenField, Vec3::ZERO, &mut out);
        assert!(controller.state().live_enemy_count() <= 2);
    }

    assert_eq!(spawn_count(&out), 2);
    assert_eq!(controller.state().enemies_queued(), 3);

    controller.on_enemy_death();
    assert_eq!(controller.state().live_enemy_count(), 1);
    controller.tick(Duration::from_secs(1), &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(spawn_count(&out), 3, "a freed slot is refilled");
    assert_eq!(controller.state().live_enemy_count(), 2);
    assert_eq!(controller.state().enemies_queued(), 2);
}

#[test]
fn wave_without_enemies_advances_instead_of_stalling() {
    let mut controller = WaveController::new(WaveConfig {
        enemy_count_multiplier: 1,
        initial_delay_secs: 0.0,
        ..WaveConfig::default()
    });

    let mut out = Vec::new();
    controller.tick(Duration::ZERO, &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(controller.state().phase(), WavePhase::WaveComplete);
    assert!(!controller.state().spawning());
    assert!(out.is_empty());

    controller.tick(Duration::from_secs(4), &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(controller.state().current_wave(), 2);
    assert_eq!(controller.state().phase(), WavePhase::Draining);
    assert_eq!(controller.state().live_enemy_count(), 1);
    assert_eq!(spawn_count(&out), 1);
}

#[test]
fn empty_waves_run_straight_to_victory() {
    let mut controller = WaveController::new(WaveConfig {
        enemy_count_multiplier: 0,
        initial_delay_secs: 0.0,
        ..WaveConfig::default()
    });

    let mut out = Vec::new();
    for _ in 0..20 {
        controller.tick(Duration::from_secs(1), &OpenField, Vec3::ZERO, &mut out);
    }

    assert_eq!(controller.state().phase(), WavePhase::Victory);
    assert_eq!(controller.state().current_wave(), 3);
    assert_eq!(
        out,
        vec![Command::EndGame {
            outcome: GameOutcome::Victory
        }]
    );
}

#[test]
fn requeueing_does_not_start_a_second_spawn_cycle() {
    let mut controller = WaveController::new(quiet_config());
    controller.queue_wave(2);
    controller.queue_wave(2);

    let mut out = Vec::new();
    controller.tick(Duration::ZERO, &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(spawn_count(&out), 1);

    controller.tick(Duration::from_millis(999), &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(spawn_count(&out), 1);

    controller.tick(Duration::from_millis(1), &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(spawn_count(&out), 2);
}

#[test]
fn clearing_a_wave_advances_exactly_once() {
    let mut controller = WaveController::new(WaveConfig {
        enemy_count_multiplier: 2,
        ..quiet_config()
    });
    controller.queue_wave(1);

    let mut out = Vec::new();
    controller.tick(Duration::ZERO, &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(controller.state().live_enemy_count(), 1);
    assert_eq!(controller.state().phase(), WavePhase::Draining);

    controller.on_enemy_death();
    controller.on_enemy_death();
    controller.on_enemy_death();
    assert_eq!(controller.state().phase(), WavePhase::WaveComplete);
    assert!(!controller.state().spawning());
    assert_eq!(controller.state().enemies_queued(), 0);

    controller.tick(Duration::from_secs(3), &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(controller.state().current_wave(), 1);

    controller.tick(Duration::from_secs(1), &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(controller.state().current_wave(), 2);
    assert_eq!(controller.state().phase(), WavePhase::Spawning);

    controller.tick(Duration::from_secs(30), &OpenField, Vec3::ZERO, &mut out);
    assert_eq!(controller.state().current_wave(), 2, "no second advance is pending");
}

#[test]
fn clearing_the_final_wave_declares_victory() {
    let mut controller = WaveController::new(WaveConfig {
        enemy_count_multiplier: 2,
        wave_limit: 1,
        ..quiet_config()
    });
    controller.queue_wave(1);

    let mut out = Vec::new();
    controller.tick(Duration::ZERO, &OpenField, Vec3::ZERO, &mut out);
    controller.on_enemy_death();
    out.clear();
    controller.tick(Duration::from_secs(5), &OpenField, Vec3::ZERO, &mut out);

    assert_eq!(
        out,
        vec![Command::EndGame {
            outcome: GameOutcome::Victory
        }]
    );
    assert_eq!(controller.state().phase(), WavePhase::Victory);
    assert_eq!(controller.state().current_wave(), 1);
    assert!(controller.state().game_over());
}

fn open_plan() -> CityPlan {
    let mut grid = OccupancyGrid::new(24, 24);
    let _ = grid.set(12, 12).expect("in bounds");
    CityPlan {
        grid,
        buildings: vec![BuildingInstance {
            cell: CellCoord::new(12, 12),
            style: "pillar".to_owned(),
            height_limit: 0,
            segments: vec![BuildingSegment {
                level: 0,
                tier: Tier::Top,
                mesh: AssetKey::new("pillar_mesh"),
                material: AssetKey::new("pillar_material"),
                tint: None,
                position: Vec3::new(12.0, 0.0, 12.0),
                parent: None,
            }],
        }],
        ground: Ground {
            center: Vec3::new(11.5, 0.0, 11.5),
            size: Vec3::new(24.0, 0.05, 24.0),
        },
    }
}

/// Drives a whole session where every live enemy takes a fixed hit each frame.
fn replay(seed: u64, frames: u32) -> (Vec<Event>, World) {
    let mut world = World::new();
    let mut controller = WaveController::new(WaveConfig {
        seed,
        spawn_radius: 8.0,
        ..WaveConfig::default()
    });
    let mut log = Vec::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::InstallCity { plan: open_plan() }, &mut events);
    log.append(&mut events);

    for _ in 0..frames {
        let mut pending = vec![Command::Tick {
            dt: Duration::from_millis(100),
        }];
        pending.extend(query::enemy_view(&world).iter().map(|enemy| Command::DamageEnemy {
            enemy: enemy.id,
            amount: 40.0,
        }));

        while !pending.is_empty() {
            for command in pending.drain(..) {
                world::apply(&mut world, command, &mut events);
            }
            let center = query::arena_center(&world);
            controller.handle(&events, &query::navigation(&world), center, &mut pending);
            log.append(&mut events);
        }
    }

    (log, world)
}

#[test]
fn seeded_session_replays_identically_and_reaches_victory() {
    let (first, world) = replay(0xa11e, 600);
    let (second, _) = replay(0xa11e, 600);

    assert_eq!(first, second);
    assert_eq!(query::outcome(&world), Some(GameOutcome::Victory));

    let mut healths: Vec<f32> = first
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { stats, .. } => Some(stats.max_health),
            _ => None,
        })
        .collect();
    healths.dedup();
    assert_eq!(healths, vec![100.0, 150.0, 200.0], "one health tier per wave");
    assert_eq!(
        first
            .iter()
            .filter(|event| matches!(event, Event::GameEnded { .. }))
            .count(),
        1
    );

    for event in &first {
        if let Event::EnemySpawned { position, .. } = event {
            assert!(
                position.distance(Vec3::new(12.0, 0.0, 12.0)) <= 16.0 + 1e-3,
                "spawn {position} strayed from the arena center"
            );
        }
    }
}
