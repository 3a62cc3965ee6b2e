#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Village Defence combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems and presentation layers react to. Systems read immutable
//! snapshots and respond exclusively with new command batches.

mod countdown;
mod map;
mod tables;
mod wave;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use countdown::{seconds, Countdown, CountdownMode};
pub use map::{Direction, Tile, TileCoord, TileGrid, TileMap, TileMarker};
pub use tables::{
    EnemyKind, EnemyTables, EnemyTemplate, LevelTable, ProjectileKind, Recovery, SlowEffect,
    TowerKind, TowerLevel, TowerTables, TowerTemplate, UpgradeCosts, LEVEL_COUNT,
};
pub use wave::{SpawnEvent, WaveDefinition};

/// Overall outcome of the match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Waves are still being played.
    #[default]
    InProgress,
    /// Every wave was cleared.
    Won,
    /// Base health reached zero.
    Lost,
}

impl MatchStatus {
    /// Reports whether the match has reached a final outcome.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates an enemy at the start of the spawn point's route.
    SpawnEnemy {
        /// Spawn point whose route the enemy follows.
        spawn_point: SpawnPointId,
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Runs enemy status effects, recovery casts and movement.
    AdvanceEnemies {
        /// Simulated time to advance by.
        dt: Duration,
    },
    /// Runs tower cooldowns and fire animations.
    AdvanceTowers {
        /// Simulated time to advance by.
        dt: Duration,
    },
    /// Requests that a ready tower launch a projectile at the enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy aimed at.
        target: EnemyId,
    },
    /// Moves projectiles and plays their impact aftermath.
    AdvanceProjectiles {
        /// Simulated time to advance by.
        dt: Duration,
    },
    /// Moves coin pickups and expires old ones.
    AdvancePickups {
        /// Simulated time to advance by.
        dt: Duration,
    },
    /// Matches collidable projectiles against live enemies and applies damage.
    ResolveCollisions,
    /// Retires enemies standing on the goal tile and damages the base.
    ResolveGoalContacts,
    /// Removes every entity whose validity flag is cleared.
    PruneInvalid,
    /// Credits the reward of a cleared wave.
    CompleteWave {
        /// Zero-based wave index.
        wave: u32,
        /// Coins credited for the wave.
        reward: u32,
    },
    /// Marks the match as won.
    DeclareVictory,
    /// Requests a new tower on the provided tile.
    PlaceTower {
        /// Kind of tower to build.
        kind: TowerKind,
        /// Tile to build on.
        tile: TileCoord,
    },
    /// Requests that a tower kind advance one level.
    UpgradeTower {
        /// Tower kind to upgrade.
        kind: TowerKind,
    },
    /// Collects a coin pickup into the ledger.
    CollectPickup {
        /// Pickup being collected.
        pickup: PickupId,
    },
}

/// Events broadcast by the world after executing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that simulation time advanced by the provided delta.
    TimeAdvanced {
        /// Duration of simulated time that elapsed.
        dt: Duration,
    },
    /// An enemy entered the map.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Kind of the new enemy.
        kind: EnemyKind,
        /// Spawn point it entered from.
        spawn_point: SpawnPointId,
    },
    /// A spawn referenced a spawn point the map does not define.
    SpawnIgnored {
        /// Unknown spawn point.
        spawn_point: SpawnPointId,
        /// Kind that would have been spawned.
        kind: EnemyKind,
    },
    /// An enemy lost hit points.
    EnemyDamaged {
        /// Damaged enemy.
        enemy: EnemyId,
        /// Hit points after the damage was applied.
        hp: f32,
    },
    /// An enemy regained hit points from a recovery cast.
    EnemyHealed {
        /// Healed enemy.
        enemy: EnemyId,
        /// Enemy that cast the recovery.
        caster: EnemyId,
        /// Hit points after healing.
        hp: f32,
    },
    /// An enemy's hit points reached zero.
    EnemyKilled {
        /// Killed enemy.
        enemy: EnemyId,
        /// Where it died.
        position: Vec2,
    },
    /// An enemy stepped onto the goal tile.
    EnemyReachedGoal {
        /// Enemy that reached the goal.
        enemy: EnemyId,
        /// Base damage it dealt.
        damage: f32,
    },
    /// An enemy left its registry.
    EnemyRemoved {
        /// Removed enemy.
        enemy: EnemyId,
    },
    /// A tower launched a projectile.
    ProjectileFired {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Firing tower.
        tower: TowerId,
        /// Enemy aimed at.
        target: EnemyId,
        /// Payload kind.
        kind: ProjectileKind,
    },
    /// A projectile struck an enemy.
    ProjectileImpacted {
        /// Striking projectile.
        projectile: ProjectileId,
        /// Enemy struck first.
        enemy: EnemyId,
        /// Impact position.
        position: Vec2,
    },
    /// A projectile left the map without hitting anything.
    ProjectileExpired {
        /// Expired projectile.
        projectile: ProjectileId,
    },
    /// A coin dropped from a killed enemy.
    PickupDropped {
        /// Identifier allocated to the pickup.
        pickup: PickupId,
        /// Drop position.
        position: Vec2,
    },
    /// A coin pickup was collected.
    PickupCollected {
        /// Collected pickup.
        pickup: PickupId,
        /// Coins credited.
        coins: u32,
    },
    /// A coin pickup vanished uncollected.
    PickupExpired {
        /// Expired pickup.
        pickup: PickupId,
    },
    /// A tower was built.
    TowerPlaced {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Kind of tower built.
        kind: TowerKind,
        /// Tile it occupies.
        tile: TileCoord,
        /// Coins spent.
        cost: u32,
    },
    /// A placement request was refused.
    TowerPlacementRejected {
        /// Requested kind.
        kind: TowerKind,
        /// Requested tile.
        tile: TileCoord,
        /// Why the request failed.
        reason: PlacementError,
    },
    /// A tower kind advanced one level.
    TowerUpgraded {
        /// Upgraded kind.
        kind: TowerKind,
        /// New level.
        level: TowerLevel,
        /// Coins spent.
        cost: u32,
    },
    /// An upgrade request was refused.
    TowerUpgradeRejected {
        /// Requested kind.
        kind: TowerKind,
        /// Why the request failed.
        reason: UpgradeError,
    },
    /// The coin balance changed.
    CoinsChanged {
        /// Balance after the change.
        balance: u32,
    },
    /// The base lost health.
    BaseDamaged {
        /// Damage requested.
        amount: f32,
        /// Health left.
        remaining: f32,
    },
    /// A wave was cleared and its reward credited.
    WaveCleared {
        /// Zero-based wave index.
        wave: u32,
        /// Coins credited.
        reward: u32,
    },
    /// The final wave was cleared.
    MatchWon,
    /// Base health reached zero.
    MatchLost,
    /// One-shot sound notification for the audio collaborator.
    Audio {
        /// Sound to play.
        cue: AudioCue,
    },
}

/// Sounds the core asks the audio layer to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// A tower fired.
    Fire,
    /// A single-target projectile struck.
    Hit,
    /// A shell exploded.
    Explosion,
    /// A coin was collected.
    Pickup,
    /// An enemy reached the base.
    BaseHurt,
    /// A wave was cleared.
    WaveClear,
    /// A tower was built.
    Placement,
    /// A tower kind was upgraded.
    Upgrade,
}

/// Reasons a placement request can be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The tile lies outside the map.
    OutOfBounds,
    /// A tower already stands on the tile.
    Occupied,
    /// Enemies walk across the tile.
    OnPath,
    /// The balance does not cover the cost.
    InsufficientFunds {
        /// Coins required.
        cost: u32,
        /// Coins available.
        balance: u32,
    },
}

/// Reasons an upgrade request can be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// The kind is already at the top level.
    MaxLevel,
    /// The balance does not cover the cost.
    InsufficientFunds {
        /// Coins required.
        cost: u32,
        /// Coins available.
        balance: u32,
    },
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to an enemy.
    EnemyId
);
identifier!(
    /// Unique identifier assigned to a tower.
    TowerId
);
identifier!(
    /// Unique identifier assigned to a projectile.
    ProjectileId
);
identifier!(
    /// Unique identifier assigned to a coin pickup.
    PickupId
);
identifier!(
    /// Spawn point number carried by map tiles.
    SpawnPointId
);

/// Pose a tower is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerStance {
    /// Waiting for a target or for the cooldown.
    Idle,
    /// Playing the fire animation.
    Firing,
}

/// Read-only description of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Enemy identifier.
    pub id: EnemyId,
    /// Enemy kind.
    pub kind: EnemyKind,
    /// World-space center.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: f32,
    /// Fraction of the route completed.
    pub progress: f32,
    /// Whether the hit flash is showing.
    pub flashing: bool,
    /// Whether a slow is active.
    pub slowed: bool,
}

/// Enemies captured in identifier order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a view, sorting the snapshots by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only description of a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Tower identifier.
    pub id: TowerId,
    /// Tower kind.
    pub kind: TowerKind,
    /// Tile it occupies.
    pub tile: TileCoord,
    /// World-space center.
    pub position: Vec2,
    /// Level of the tower's kind.
    pub level: TowerLevel,
    /// Targeting radius in world units.
    pub range: f32,
    /// Direction the tower faces.
    pub facing: Direction,
    /// Current pose.
    pub stance: TowerStance,
}

/// Towers captured in identifier order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a view, sorting the snapshots by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }
}

/// Remaining cooldown of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower identifier.
    pub tower: TowerId,
    /// Time until the tower may fire; zero when ready.
    pub ready_in: Duration,
}

/// Tower cooldowns captured in identifier order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a view, sorting the snapshots by tower identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }
}

/// Target chosen for a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that aims.
    pub tower: TowerId,
    /// Enemy aimed at.
    pub enemy: EnemyId,
}

/// Whether a projectile is still flying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectilePhase {
    /// Moving and able to collide.
    Flight,
    /// Playing its post-impact effect.
    Aftermath,
}

/// Read-only description of a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Projectile identifier.
    pub id: ProjectileId,
    /// Payload kind.
    pub kind: ProjectileKind,
    /// World-space center.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Sprite rotation for projectiles drawn along their velocity.
    pub rotation_degrees: Option<f32>,
    /// Flight or aftermath.
    pub phase: ProjectilePhase,
}

/// Read-only description of a coin pickup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupSnapshot {
    /// Pickup identifier.
    pub id: PickupId,
    /// World-space center.
    pub position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&EnemyId::new(7));
        assert_round_trip(&SpawnPointId::new(2));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::InsufficientFunds {
            cost: 50,
            balance: 20,
        });
    }

    #[test]
    fn wave_definition_round_trips_through_bincode() {
        let wave = WaveDefinition {
            reward: 30,
            delay: Duration::from_secs(2),
            spawns: vec![SpawnEvent {
                delay: Duration::from_millis(1500),
                spawn_point: SpawnPointId::new(1),
                enemy: EnemyKind::GoblinPriest,
            }],
        };
        assert_round_trip(&wave);
    }

    #[test]
    fn tower_tables_round_trip_through_bincode() {
        assert_round_trip(&TowerTables::default());
    }

    #[test]
    fn enemy_view_orders_snapshots_by_identifier() {
        let snapshot = |id| EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Slim,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            hp: 1.0,
            max_hp: 1.0,
            progress: 0.0,
            flashing: false,
            slowed: false,
        };
        let view = EnemyView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(3)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();

        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn only_in_progress_matches_are_open() {
        assert!(!MatchStatus::InProgress.is_over());
        assert!(MatchStatus::Won.is_over());
        assert!(MatchStatus::Lost.is_over());
    }
}
