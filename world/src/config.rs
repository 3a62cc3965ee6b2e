//! Match parameters the world is built from.

use village_defence_core::{EnemyTables, TileMap, TowerTables, WaveDefinition};

/// Parsed content and tuning for a single match.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Tile grid with direction markers, goal and spawn points.
    pub map: TileMap,
    /// Waves in play order.
    pub waves: Vec<WaveDefinition>,
    /// Tower attribute tables.
    pub towers: TowerTables,
    /// Enemy attribute tables.
    pub enemies: EnemyTables,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Starting base health.
    pub base_health: f32,
    /// Starting coin balance.
    pub initial_coins: u32,
    /// Coins credited per collected pickup.
    pub coins_per_pickup: u32,
    /// Seed for coin drop rolls and toss directions.
    pub rng_seed: u64,
}

impl MatchConfig {
    /// Default tile side length.
    pub const DEFAULT_TILE_SIZE: f32 = 48.0;
    /// Default starting base health.
    pub const DEFAULT_BASE_HEALTH: f32 = 10.0;
    /// Default starting coin balance.
    pub const DEFAULT_INITIAL_COINS: u32 = 100;
    /// Default coins credited per pickup.
    pub const DEFAULT_COINS_PER_PICKUP: u32 = 10;

    /// Creates a configuration with stock tables and default tuning.
    #[must_use]
    pub fn new(map: TileMap, waves: Vec<WaveDefinition>) -> Self {
        Self {
            map,
            waves,
            towers: TowerTables::default(),
            enemies: EnemyTables::default(),
            tile_size: Self::DEFAULT_TILE_SIZE,
            base_health: Self::DEFAULT_BASE_HEALTH,
            initial_coins: Self::DEFAULT_INITIAL_COINS,
            coins_per_pickup: Self::DEFAULT_COINS_PER_PICKUP,
            rng_seed: 0,
        }
    }

    /// Replaces the random seed.
    #[must_use]
    pub fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }
}
