use std::time::Duration;

use village_defence_core::{
    Command, Direction, EnemyKind, Event, SpawnEvent, SpawnPointId, Tile, TileMap, TileMarker,
    WaveDefinition,
};
use village_defence_system_wave_scheduler::{Config, WavePhase, WaveScheduler};
use village_defence_world::{self as world, query, MatchConfig, World};

fn two_lane_map() -> TileMap {
    let spawn = |id| Tile {
        direction: Some(Direction::East),
        marker: TileMarker::SpawnPoint(SpawnPointId::new(id)),
        ..Tile::default()
    };
    let east = Tile {
        direction: Some(Direction::East),
        ..Tile::default()
    };
    let south = Tile {
        direction: Some(Direction::South),
        ..Tile::default()
    };
    let goal = Tile {
        marker: TileMarker::Goal,
        ..Tile::default()
    };
    TileMap::from_rows(vec![
        vec![spawn(1), east, south],
        vec![spawn(2), east, goal],
    ])
}

fn wave(reward: u32, spawns: &[(u32, EnemyKind)]) -> WaveDefinition {
    WaveDefinition {
        reward,
        delay: Duration::from_millis(500),
        spawns: spawns
            .iter()
            .map(|(spawn_point, enemy)| SpawnEvent {
                delay: Duration::from_millis(250),
                spawn_point: SpawnPointId::new(*spawn_point),
                enemy: *enemy,
            })
            .collect(),
    }
}

/// Drives the scheduler against a live world. Enemies advance one waypoint per
/// tick and are charged to the base on arrival, so every wave clears.
fn play(waves: Vec<WaveDefinition>, ticks: usize) -> (World, WaveScheduler, Vec<Event>) {
    let mut world = World::new(&MatchConfig::new(two_lane_map(), Vec::new()));
    let mut scheduler = WaveScheduler::new(Config::new(waves));
    let mut log = Vec::new();

    for _ in 0..ticks {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        scheduler.handle(
            &events,
            query::match_status(&world),
            query::enemy_count(&world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        world::apply(
            &mut world,
            Command::AdvanceEnemies {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );
        world::apply(&mut world, Command::ResolveGoalContacts, &mut events);
        world::apply(&mut world, Command::PruneInvalid, &mut events);
        log.extend(events);
    }

    (world, scheduler, log)
}

#[test]
fn waves_spawn_in_order_across_spawn_points() {
    let (world, scheduler, events) = play(
        vec![
            wave(4, &[(1, EnemyKind::Goblin), (2, EnemyKind::Skeleton)]),
            wave(6, &[(2, EnemyKind::KingSlim)]),
        ],
        40,
    );

    let spawned: Vec<(SpawnPointId, EnemyKind)> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned {
                spawn_point, kind, ..
            } => Some((*spawn_point, *kind)),
            _ => None,
        })
        .collect();
    assert_eq!(
        spawned,
        vec![
            (SpawnPointId::new(1), EnemyKind::Goblin),
            (SpawnPointId::new(2), EnemyKind::Skeleton),
            (SpawnPointId::new(2), EnemyKind::KingSlim),
        ]
    );

    let cleared: Vec<(u32, u32)> = events
        .iter()
        .filter_map(|event| match event {
            Event::WaveCleared { wave, reward } => Some((*wave, *reward)),
            _ => None,
        })
        .collect();
    assert_eq!(cleared, vec![(0, 4), (1, 6)]);
    assert_eq!(scheduler.phase(), WavePhase::Finished);
    assert_eq!(query::coins(&world), 110);
    assert!(query::match_status(&world).is_over());
}

#[test]
fn each_wave_clears_before_the_next_starts() {
    let (_, _, events) = play(
        vec![
            wave(1, &[(1, EnemyKind::Slim)]),
            wave(1, &[(1, EnemyKind::Slim)]),
        ],
        40,
    );

    let order: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { .. } => Some("spawn"),
            Event::EnemyRemoved { .. } => Some("removed"),
            Event::WaveCleared { .. } => Some("cleared"),
            Event::MatchWon => Some("won"),
            _ => None,
        })
        .collect();
    assert_eq!(
        order,
        vec!["spawn", "removed", "cleared", "spawn", "removed", "cleared", "won"]
    );
}

#[test]
fn spawn_points_missing_from_the_map_are_skipped() {
    let (world, _, events) = play(vec![wave(3, &[(9, EnemyKind::Slim)])], 10);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::SpawnIgnored { .. })));
    assert!(events.contains(&Event::WaveCleared { wave: 0, reward: 3 }));
    assert_eq!(query::enemy_count(&world), 0);
}
