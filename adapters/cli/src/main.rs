#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Village Defence level headlessly.

mod headless;
mod level;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;
use village_defence_core::{Command, Event, TileCoord, TowerKind};
use village_defence_rendering::{
    tile_layer, Color, FrameControl, Hud, Presentation, RenderingBackend, Scene,
    TileGridPresentation,
};
use village_defence_system_simulation::Simulation;
use village_defence_world::{query, MatchConfig};

use headless::HeadlessBackend;

/// Extra simulated time granted after the last scripted spawn when no
/// explicit run length is given.
const DEFAULT_GRACE: Duration = Duration::from_secs(120);

/// Plays a level without a window and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "village-defence", version, about)]
struct Args {
    /// Level file describing the map, waves and attribute overrides.
    #[arg(short, long, value_name = "PATH")]
    level: PathBuf,

    /// Simulated seconds to run before giving up on the match.
    #[arg(short, long)]
    seconds: Option<f32>,

    /// Frames per simulated second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Overrides the level's random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Tower to place before the first tick, as `kind@column,row`.
    #[arg(short, long = "tower", value_name = "KIND@COLUMN,ROW", value_parser = parse_placement)]
    towers: Vec<Placement>,

    /// Tower kind to upgrade before the first tick; repeat to upgrade again.
    #[arg(short, long = "upgrade", value_name = "KIND", value_parser = parse_tower_kind)]
    upgrades: Vec<TowerKind>,

    /// Collect every coin on the frame its enemy drops it.
    #[arg(long)]
    collect_coins: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Placement {
    kind: TowerKind,
    tile: TileCoord,
}

fn parse_tower_kind(value: &str) -> Result<TowerKind, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "archer" => Ok(TowerKind::Archer),
        "axeman" => Ok(TowerKind::Axeman),
        "gunner" => Ok(TowerKind::Gunner),
        other => Err(format!(
            "unknown tower kind `{other}` (expected archer, axeman or gunner)"
        )),
    }
}

fn parse_placement(value: &str) -> Result<Placement, String> {
    let (kind, tile) = value
        .split_once('@')
        .ok_or_else(|| format!("expected KIND@COLUMN,ROW, got `{value}`"))?;
    let (column, row) = tile
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW after `@`, got `{tile}`"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;

    Ok(Placement {
        kind: parse_tower_kind(kind)?,
        tile: TileCoord::new(column, row),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the Village Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = level::load(&args.level)
        .with_context(|| format!("failed to load level {}", args.level.display()))?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    let limit = match args.seconds {
        Some(seconds) => village_defence_core::seconds(seconds),
        None => level::scripted_duration(&config).saturating_add(DEFAULT_GRACE),
    };

    let mut simulation = Simulation::new(&config);
    prepare(&mut simulation, &args);

    let presentation = presentation(&config, &simulation)?;
    let backend = HeadlessBackend::new(args.fps);
    let collect_coins = args.collect_coins;
    let mut elapsed = Duration::ZERO;
    let mut events = Vec::new();

    backend.run(presentation, move |dt, scene| {
        events.clear();
        simulation.step(dt, &mut events);
        elapsed = elapsed.saturating_add(dt);

        events.iter().for_each(report);
        if collect_coins {
            collect_dropped_coins(&mut simulation, &events)
                .iter()
                .for_each(report);
        }

        let world = simulation.world();
        scene.refresh(
            &query::enemy_view(world),
            &query::towers(world),
            &query::projectiles(world),
            &query::pickups(world),
            hud(&simulation),
        );

        if scene.hud.status.is_over() {
            println!("{}", scene.hud.summary());
            FrameControl::Exit
        } else if elapsed >= limit {
            warn!(elapsed = ?elapsed, "time limit reached before the match ended");
            println!("{}", scene.hud.summary());
            FrameControl::Exit
        } else {
            FrameControl::Continue
        }
    })
}

fn prepare(simulation: &mut Simulation, args: &Args) {
    let mut events = Vec::new();
    for placement in &args.towers {
        simulation.submit(
            Command::PlaceTower {
                kind: placement.kind,
                tile: placement.tile,
            },
            &mut events,
        );
    }
    for kind in &args.upgrades {
        simulation.submit(Command::UpgradeTower { kind: *kind }, &mut events);
    }
    events.iter().for_each(report);
}

/// Collects every coin dropped in `events` before the next frame.
fn collect_dropped_coins(simulation: &mut Simulation, events: &[Event]) -> Vec<Event> {
    let mut collected = Vec::new();
    for event in events {
        if let Event::PickupDropped { pickup, .. } = event {
            simulation.submit(Command::CollectPickup { pickup: *pickup }, &mut collected);
        }
    }
    collected
}

fn presentation(config: &MatchConfig, simulation: &Simulation) -> Result<Presentation> {
    let world = simulation.world();
    let grid = TileGridPresentation::from_grid(
        query::tile_grid(world),
        Color::from_rgb_u8(0x30, 0x30, 0x30),
    )
    .context("level tile size cannot be presented")?;
    let scene = Scene::new(grid, tile_layer(&config.map), hud(simulation));
    Ok(Presentation::new(
        "Village Defence",
        Color::from_rgb_u8(0x1b, 0x1b, 0x1b),
        scene,
    ))
}

fn hud(simulation: &Simulation) -> Hud {
    let world = simulation.world();
    let scheduler = simulation.scheduler();
    Hud {
        coins: query::coins(world),
        base_health: query::base_health(world),
        wave: scheduler.wave_index() + 1,
        wave_count: scheduler.wave_count(),
        status: query::match_status(world),
    }
}

fn report(event: &Event) {
    match event {
        Event::TowerPlaced { kind, tile, cost, .. } => {
            info!(?kind, column = tile.column(), row = tile.row(), cost, "tower placed");
        }
        Event::TowerPlacementRejected { kind, tile, reason } => {
            warn!(?kind, column = tile.column(), row = tile.row(), ?reason, "placement rejected");
        }
        Event::TowerUpgraded { kind, level, .. } => {
            info!(?kind, level = level.get(), "tower upgraded");
        }
        Event::TowerUpgradeRejected { kind, reason } => {
            warn!(?kind, ?reason, "upgrade rejected");
        }
        Event::WaveCleared { wave, reward } => info!(wave, reward, "wave cleared"),
        Event::BaseDamaged { amount, remaining } => info!(amount, remaining, "base damaged"),
        Event::MatchWon => info!("victory"),
        Event::MatchLost => info!("defeat"),
        Event::Audio { cue } => trace!(?cue, "audio cue"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_definitions_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn placements_parse_kind_and_tile() {
        assert_eq!(
            parse_placement("Gunner@3,4"),
            Ok(Placement {
                kind: TowerKind::Gunner,
                tile: TileCoord::new(3, 4),
            })
        );
        assert!(parse_placement("gunner").is_err());
        assert!(parse_placement("wizard@1,1").is_err());
        assert!(parse_placement("archer@1,-1").is_err());
    }

    #[test]
    fn arguments_collect_repeated_towers_and_upgrades() {
        let args = Args::try_parse_from([
            "village-defence",
            "--level",
            "level.toml",
            "--tower",
            "archer@1,1",
            "--tower",
            "axeman@2,1",
            "--upgrade",
            "archer",
            "--seconds",
            "30",
        ])
        .expect("arguments parse");

        assert_eq!(args.towers.len(), 2);
        assert_eq!(args.upgrades, vec![TowerKind::Archer]);
        assert_eq!(args.seconds, Some(30.0));
        assert_eq!(args.fps, 60);
        assert!(!args.collect_coins);
    }

    #[test]
    fn prepared_towers_spend_coins() {
        let config = level::parse(
            r#"
map = '''
0\0\4\1, 0\0\4, 0\0\0\0
0, 0, 0
'''
[[waves]]
interval = 1.0
[[waves.spawn_list]]
point = 1
enemy = "Slim"
"#,
        )
        .expect("level parses");
        let args = Args::try_parse_from([
            "village-defence",
            "--level",
            "unused.toml",
            "--tower",
            "archer@0,1",
        ])
        .expect("arguments parse");
        let mut simulation = Simulation::new(&config);

        prepare(&mut simulation, &args);

        assert_eq!(query::coins(simulation.world()), 50);
        let hud = hud(&simulation);
        assert_eq!(hud.wave, 1);
        assert_eq!(hud.wave_count, 1);
        assert!(presentation(&config, &simulation).is_ok());
    }

    #[test]
    fn dropped_coins_are_collected_on_the_drop_frame() {
        let config = level::parse(
            r#"
map = '''
0\0\4\1, 0\0\4, 0\0\4, 0\0\0\0
0, 0, 0, 0
'''
[[waves]]
interval = 0.1
[[waves.spawn_list]]
interval = 0.1
point = 1
enemy = "Slim"

[tower.archer]
damage = [1000]

[enemy.slim]
hp = 1
reward_ratio = 1.0
"#,
        )
        .expect("level parses");
        let args = Args::try_parse_from([
            "village-defence",
            "--level",
            "unused.toml",
            "--tower",
            "archer@1,1",
        ])
        .expect("arguments parse");
        let mut simulation = Simulation::new(&config);
        prepare(&mut simulation, &args);

        let mut events = Vec::new();
        for _ in 0..300 {
            events.clear();
            simulation.step(Duration::from_millis(16), &mut events);
            if events
                .iter()
                .any(|event| matches!(event, Event::PickupDropped { .. }))
            {
                break;
            }
        }
        let dropped = events
            .iter()
            .filter(|event| matches!(event, Event::PickupDropped { .. }))
            .count();
        assert_eq!(dropped, 1);

        let before = query::coins(simulation.world());
        let collected = collect_dropped_coins(&mut simulation, &events);

        assert!(collected
            .iter()
            .any(|event| matches!(event, Event::PickupCollected { coins: 10, .. })));
        assert_eq!(query::coins(simulation.world()), before + 10);
        assert!(query::pickups(simulation.world()).is_empty());
    }
}
