#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Village Defence adapters.
//!
//! Backends never read the world directly. Adapters gather snapshots through
//! the world queries, fold them into a [`Scene`] and hand it to a
//! [`RenderingBackend`] once per frame.

use anyhow::Result as AnyResult;
use glam::Vec2;
use village_defence_core::{
    Direction, EnemyId, EnemyKind, EnemySnapshot, EnemyView, MatchStatus, PickupId,
    PickupSnapshot, ProjectileId, ProjectileKind, ProjectilePhase, ProjectileSnapshot, TileCoord,
    TileGrid, TileMap, TileMarker, TowerId, TowerKind, TowerLevel, TowerSnapshot, TowerStance,
    TowerView,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// How far a hit-flashing enemy is pushed towards white.
pub const HIT_FLASH_LIGHTEN: f32 = 0.7;

/// Base color used to tint an enemy kind.
#[must_use]
pub const fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Slim => Color::from_rgb_u8(0x4c, 0xaf, 0x50),
        EnemyKind::KingSlim => Color::from_rgb_u8(0x2e, 0x7d, 0x32),
        EnemyKind::Skeleton => Color::from_rgb_u8(0xe0, 0xe0, 0xe0),
        EnemyKind::Goblin => Color::from_rgb_u8(0x8d, 0x6e, 0x63),
        EnemyKind::GoblinPriest => Color::from_rgb_u8(0x7e, 0x57, 0xc2),
    }
}

/// Base color used to tint a tower kind.
#[must_use]
pub const fn tower_color(kind: TowerKind) -> Color {
    match kind {
        TowerKind::Archer => Color::from_rgb_u8(0x42, 0xa5, 0xf5),
        TowerKind::Axeman => Color::from_rgb_u8(0xef, 0x53, 0x50),
        TowerKind::Gunner => Color::from_rgb_u8(0xff, 0xb3, 0x00),
    }
}

/// Geometry of the tile grid drawn beneath every entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Color used for grid lines.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Creates a grid presentation, rejecting tiles without a positive size.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_size: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if !(tile_size > 0.0 && tile_size.is_finite()) {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
            line_color,
        })
    }

    /// Mirrors the world's pixel grid.
    pub fn from_grid(grid: TileGrid, line_color: Color) -> Result<Self, RenderingError> {
        Self::new(grid.columns(), grid.rows(), grid.tile_size(), line_color)
    }

    /// Width of the grid in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the grid in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Tile under a world-space position, if any.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let column = (position.x / self.tile_size).floor() as u32;
        let row = (position.y / self.tile_size).floor() as u32;
        (column < self.columns && row < self.rows).then(|| TileCoord::new(column, row))
    }
}

/// Gameplay role of a tile, used to pick a layer and tint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileRole {
    /// Buildable ground.
    Ground,
    /// Walkable path carrying a direction arrow.
    Path(Direction),
    /// Tile the base sits on.
    Goal,
    /// Tile enemies enter from.
    Spawn,
}

/// Single tile of the background layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePresentation {
    /// Grid coordinate of the tile.
    pub coord: TileCoord,
    /// Terrain sprite identifier.
    pub terrain: u32,
    /// Decoration sprite identifier drawn over the terrain.
    pub decoration: Option<u32>,
    /// Gameplay role.
    pub role: TileRole,
}

/// Collects the background layer of a map.
#[must_use]
pub fn tile_layer(map: &TileMap) -> Vec<TilePresentation> {
    map.iter()
        .map(|(coord, tile)| {
            let role = match (tile.marker, tile.direction) {
                (TileMarker::Goal, _) => TileRole::Goal,
                (TileMarker::SpawnPoint(_), _) => TileRole::Spawn,
                (TileMarker::None, Some(direction)) => TileRole::Path(direction),
                (TileMarker::None, None) => TileRole::Ground,
            };
            TilePresentation {
                coord,
                terrain: tile.terrain,
                decoration: tile.decoration,
                role,
            }
        })
        .collect()
}

/// Enemy drawn at its world position with a health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Kind of enemy.
    pub kind: EnemyKind,
    /// Center of the sprite.
    pub position: Vec2,
    /// Remaining health in `0.0..=1.0`.
    pub health_fraction: f32,
    /// Tint, lightened while the hit flash runs.
    pub color: Color,
    /// Whether a slow effect overlay should be drawn.
    pub slowed: bool,
}

impl EnemyPresentation {
    /// Builds the presentation of a single enemy snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &EnemySnapshot) -> Self {
        let base = enemy_color(snapshot.kind);
        let health_fraction = if snapshot.max_hp > 0.0 {
            (snapshot.hp / snapshot.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            position: snapshot.position,
            health_fraction,
            color: if snapshot.flashing {
                base.lighten(HIT_FLASH_LIGHTEN)
            } else {
                base
            },
            slowed: snapshot.slowed,
        }
    }
}

/// Tower drawn on its tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPresentation {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Center of the tower's tile.
    pub position: Vec2,
    /// Level shared by every tower of the kind.
    pub level: TowerLevel,
    /// Direction the sprite faces.
    pub facing: Direction,
    /// Animation currently playing.
    pub stance: TowerStance,
    /// Tint.
    pub color: Color,
}

impl TowerPresentation {
    /// Builds the presentation of a single tower snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &TowerSnapshot) -> Self {
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            position: snapshot.position,
            level: snapshot.level,
            facing: snapshot.facing,
            stance: snapshot.stance,
            color: tower_color(snapshot.kind),
        }
    }
}

/// Projectile in flight or exploding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectilePresentation {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Kind of projectile.
    pub kind: ProjectileKind,
    /// Center of the sprite.
    pub position: Vec2,
    /// Sprite rotation; zero for kinds that never rotate.
    pub rotation_degrees: f32,
    /// Whether the explosion sprite replaces the projectile.
    pub exploding: bool,
}

impl ProjectilePresentation {
    /// Builds the presentation of a single projectile snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &ProjectileSnapshot) -> Self {
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            position: snapshot.position,
            rotation_degrees: snapshot.rotation_degrees.unwrap_or(0.0),
            exploding: snapshot.phase == ProjectilePhase::Aftermath,
        }
    }
}

/// Coin waiting to be collected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupPresentation {
    /// Identifier allocated by the world.
    pub id: PickupId,
    /// Center of the sprite.
    pub position: Vec2,
}

/// Status panel values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// Coin balance.
    pub coins: u32,
    /// Remaining base health.
    pub base_health: f32,
    /// One-based number of the wave being played.
    pub wave: usize,
    /// Number of playable waves.
    pub wave_count: usize,
    /// Outcome of the match so far.
    pub status: MatchStatus,
}

impl Hud {
    /// Single-line summary suitable for a title bar or log line.
    #[must_use]
    pub fn summary(&self) -> String {
        let outcome = match self.status {
            MatchStatus::InProgress => "in progress",
            MatchStatus::Won => "won",
            MatchStatus::Lost => "lost",
        };
        format!(
            "wave {}/{} | coins {} | base {:.1} | {}",
            self.wave.min(self.wave_count),
            self.wave_count,
            self.coins,
            self.base_health,
            outcome
        )
    }
}

/// Describes the scene that should be rendered for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid geometry.
    pub tile_grid: TileGridPresentation,
    /// Background tiles in row-major order.
    pub tiles: Vec<TilePresentation>,
    /// Enemies in identifier order.
    pub enemies: Vec<EnemyPresentation>,
    /// Towers in identifier order.
    pub towers: Vec<TowerPresentation>,
    /// Projectiles in identifier order.
    pub projectiles: Vec<ProjectilePresentation>,
    /// Coins in identifier order.
    pub pickups: Vec<PickupPresentation>,
    /// Status panel.
    pub hud: Hud,
}

impl Scene {
    /// Creates a scene with the static layer only.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation, tiles: Vec<TilePresentation>, hud: Hud) -> Self {
        Self {
            tile_grid,
            tiles,
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            hud,
        }
    }

    /// Replaces every dynamic layer with the supplied snapshots.
    pub fn refresh(
        &mut self,
        enemies: &EnemyView,
        towers: &TowerView,
        projectiles: &[ProjectileSnapshot],
        pickups: &[PickupSnapshot],
        hud: Hud,
    ) {
        self.enemies.clear();
        self.enemies
            .extend(enemies.iter().map(EnemyPresentation::from_snapshot));
        self.towers.clear();
        self.towers
            .extend(towers.iter().map(TowerPresentation::from_snapshot));
        self.projectiles.clear();
        self.projectiles
            .extend(projectiles.iter().map(ProjectilePresentation::from_snapshot));
        self.pickups.clear();
        self.pickups
            .extend(pickups.iter().map(|pickup| PickupPresentation {
                id: pickup.id,
                position: pickup.position,
            }));
        self.hud = hud;
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Decision returned by the per-frame update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Stop after the current frame.
    Exit,
}

/// Rendering backend capable of presenting Village Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure requests an exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and refreshes the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive, finite size.
    InvalidTileSize {
        /// Provided size that failed validation.
        tile_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile_size must be positive (received {tile_size})")
            }
        }
    }
}

impl Error for RenderingError {}
