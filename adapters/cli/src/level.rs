//! Level file loading.
//!
//! A level is a TOML document holding the tile map, the wave list and optional
//! attribute overrides:
//!
//! ```toml
//! map = '''
//! 0\0\4\1, 0\0\4, 0\0\0\0
//! 0, 0, 0
//! '''
//!
//! [[waves]]
//! rewards = 30
//! interval = 2.0
//! [[waves.spawn_list]]
//! interval = 1.0
//! point = 1
//! enemy = "Slim"
//!
//! [tower.archer]
//! damage = [30, 35, 40]
//!
//! [enemy.goblin]
//! speed = 2.5
//! ```
//!
//! Each map tile is `terrain\decoration\direction\flag`. Direction 1 to 4
//! points up, down, left or right; flag 0 marks the goal and any positive flag
//! names a spawn point.

use std::{fs, io, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use village_defence_core::{
    seconds, Direction, EnemyKind, EnemyTemplate, SpawnEvent, SpawnPointId, Tile, TileMap,
    TileMarker, TowerKind, TowerTemplate, WaveDefinition,
};
use village_defence_world::MatchConfig;

/// Reasons a level file cannot be turned into a match.
#[derive(Debug, Error)]
pub(crate) enum LevelError {
    /// The file could not be read.
    #[error("failed to read level file {}", path.display())]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The document is not valid TOML or has mistyped fields.
    #[error("level file is not valid TOML")]
    Syntax(#[from] toml::de::Error),
    /// The map string holds no tiles.
    #[error("level map contains no tiles")]
    EmptyMap,
    /// Every wave was empty.
    #[error("level declares no wave with spawn events")]
    NoPlayableWaves,
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    map: String,
    #[serde(default)]
    waves: Vec<WaveFile>,
    #[serde(default)]
    player: PlayerFile,
    #[serde(default)]
    tower: TowerOverrides,
    #[serde(default)]
    enemy: EnemyOverrides,
}

#[derive(Debug, Deserialize)]
struct WaveFile {
    #[serde(default)]
    rewards: u32,
    #[serde(default)]
    interval: f32,
    #[serde(default)]
    spawn_list: Vec<SpawnFile>,
}

#[derive(Debug, Deserialize)]
struct SpawnFile {
    #[serde(default)]
    interval: f32,
    #[serde(default)]
    point: u32,
    #[serde(default)]
    enemy: String,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerFile {
    base_health: Option<f32>,
    coins: Option<u32>,
    coins_per_pickup: Option<u32>,
    tile_size: Option<f32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TowerOverrides {
    archer: Option<TowerFile>,
    axeman: Option<TowerFile>,
    gunner: Option<TowerFile>,
}

#[derive(Debug, Default, Deserialize)]
struct TowerFile {
    #[serde(default)]
    interval: Vec<f32>,
    #[serde(default)]
    damage: Vec<f32>,
    #[serde(default)]
    view_range: Vec<f32>,
    #[serde(default)]
    cost: Vec<u32>,
    #[serde(default)]
    upgrade_cost: Vec<u32>,
}

impl TowerFile {
    fn apply(&self, template: &mut TowerTemplate) {
        template.interval = template.interval.overlay(&self.interval);
        template.damage = template.damage.overlay(&self.damage);
        template.view_range = template.view_range.overlay(&self.view_range);
        template.cost = template.cost.overlay(&self.cost);
        template.upgrade_cost = template.upgrade_cost.overlay(&self.upgrade_cost);
    }
}

#[derive(Debug, Default, Deserialize)]
struct EnemyOverrides {
    slim: Option<EnemyFile>,
    king_slim: Option<EnemyFile>,
    skeleton: Option<EnemyFile>,
    goblin: Option<EnemyFile>,
    goblin_priest: Option<EnemyFile>,
}

#[derive(Debug, Default, Deserialize)]
struct EnemyFile {
    hp: Option<f32>,
    speed: Option<f32>,
    damage: Option<f32>,
    reward_ratio: Option<f32>,
    recover_interval: Option<f32>,
    recover_range: Option<f32>,
    recover_intensity: Option<f32>,
}

impl EnemyFile {
    fn apply(&self, template: &mut EnemyTemplate) {
        let fields = [
            (self.hp, &mut template.hp),
            (self.speed, &mut template.speed),
            (self.damage, &mut template.damage),
            (self.reward_ratio, &mut template.reward_ratio),
            (self.recover_interval, &mut template.recover_interval),
            (self.recover_range, &mut template.recover_range),
            (self.recover_intensity, &mut template.recover_intensity),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// Reads and parses the level stored at `path`.
pub(crate) fn load(path: &Path) -> Result<MatchConfig, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parses a level document into match parameters.
pub(crate) fn parse(text: &str) -> Result<MatchConfig, LevelError> {
    let file: LevelFile = toml::from_str(text)?;

    let map = parse_map(&file.map)?;
    let waves = convert_waves(&file.waves);
    if waves.is_empty() {
        return Err(LevelError::NoPlayableWaves);
    }

    let mut config = MatchConfig::new(map, waves);
    let player = &file.player;
    if let Some(base_health) = player.base_health {
        config.base_health = base_health;
    }
    if let Some(coins) = player.coins {
        config.initial_coins = coins;
    }
    if let Some(coins_per_pickup) = player.coins_per_pickup {
        config.coins_per_pickup = coins_per_pickup;
    }
    if let Some(tile_size) = player.tile_size.filter(|size| *size > 0.0) {
        config.tile_size = tile_size;
    }
    if let Some(seed) = player.seed {
        config.rng_seed = seed;
    }

    let towers = [
        (TowerKind::Archer, &file.tower.archer),
        (TowerKind::Axeman, &file.tower.axeman),
        (TowerKind::Gunner, &file.tower.gunner),
    ];
    for (kind, overrides) in towers {
        if let Some(overrides) = overrides {
            overrides.apply(config.towers.get_mut(kind));
        }
    }

    let enemies = [
        (EnemyKind::Slim, &file.enemy.slim),
        (EnemyKind::KingSlim, &file.enemy.king_slim),
        (EnemyKind::Skeleton, &file.enemy.skeleton),
        (EnemyKind::Goblin, &file.enemy.goblin),
        (EnemyKind::GoblinPriest, &file.enemy.goblin_priest),
    ];
    for (kind, overrides) in enemies {
        if let Some(overrides) = overrides {
            overrides.apply(config.enemies.get_mut(kind));
        }
    }

    debug!(
        columns = config.map.columns(),
        rows = config.map.rows(),
        waves = config.waves.len(),
        "level parsed"
    );
    Ok(config)
}

fn convert_waves(waves: &[WaveFile]) -> Vec<WaveDefinition> {
    waves
        .iter()
        .filter(|wave| !wave.spawn_list.is_empty())
        .map(|wave| WaveDefinition {
            reward: wave.rewards,
            delay: seconds(wave.interval),
            spawns: wave
                .spawn_list
                .iter()
                .map(|spawn| SpawnEvent {
                    delay: seconds(spawn.interval),
                    spawn_point: SpawnPointId::new(spawn.point),
                    enemy: enemy_kind(&spawn.enemy),
                })
                .collect(),
        })
        .collect()
}

fn enemy_kind(name: &str) -> EnemyKind {
    EnemyKind::from_name(name).unwrap_or_else(|| {
        warn!(name, "unknown enemy name, spawning a Slim instead");
        EnemyKind::Slim
    })
}

fn parse_map(text: &str) -> Result<TileMap, LevelError> {
    let rows: Vec<Vec<Tile>> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').map(parse_tile).collect())
        .collect();

    if rows.first().map_or(true, Vec::is_empty) {
        return Err(LevelError::EmptyMap);
    }
    Ok(TileMap::from_rows(rows))
}

fn parse_tile(text: &str) -> Tile {
    let values: Vec<i64> = text
        .trim()
        .split('\\')
        .map(|value| value.trim().parse().unwrap_or(-1))
        .collect();
    let field = |index: usize| values.get(index).copied();

    let marker = match field(3) {
        Some(0) => TileMarker::Goal,
        Some(flag) if flag > 0 => u32::try_from(flag)
            .map_or(TileMarker::None, |id| TileMarker::SpawnPoint(SpawnPointId::new(id))),
        _ => TileMarker::None,
    };

    Tile {
        terrain: field(0)
            .and_then(|terrain| u32::try_from(terrain).ok())
            .unwrap_or(0),
        decoration: field(1).and_then(|decoration| u32::try_from(decoration).ok()),
        direction: match field(2) {
            Some(1) => Some(Direction::North),
            Some(2) => Some(Direction::South),
            Some(3) => Some(Direction::West),
            Some(4) => Some(Direction::East),
            _ => None,
        },
        marker,
    }
}

/// Total start delay of every wave, used to size default run lengths.
pub(crate) fn scripted_duration(config: &MatchConfig) -> Duration {
    config
        .waves
        .iter()
        .flat_map(|wave| {
            std::iter::once(wave.delay).chain(wave.spawns.iter().map(|spawn| spawn.delay))
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}
