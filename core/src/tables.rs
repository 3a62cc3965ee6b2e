//! Per-kind attribute tables and the level lookups that index them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::countdown::seconds;

/// Number of upgrade levels a tower kind can reach.
pub const LEVEL_COUNT: usize = 10;

/// Kinds of towers that may be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Fast single-target shooter.
    Archer,
    /// Single-target thrower whose hits slow enemies down.
    Axeman,
    /// Artillery whose shells damage everything near the impact.
    Gunner,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 3] = [TowerKind::Archer, TowerKind::Axeman, TowerKind::Gunner];

    /// Projectile speed in tiles per second.
    #[must_use]
    pub const fn fire_speed(self) -> f32 {
        match self {
            Self::Archer | Self::Gunner => 6.0,
            Self::Axeman => 5.0,
        }
    }

    /// Payload launched by the tower.
    #[must_use]
    pub const fn projectile(self) -> ProjectileKind {
        match self {
            Self::Archer => ProjectileKind::Arrow,
            Self::Axeman => ProjectileKind::Axe,
            Self::Gunner => ProjectileKind::Shell,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Archer => 0,
            Self::Axeman => 1,
            Self::Gunner => 2,
        }
    }
}

/// Temporary speed reduction applied by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Tiles per second subtracted from the maximum speed.
    pub amount: f32,
    /// How long the reduction lasts.
    pub duration: Duration,
}

/// Payloads launched by towers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Single target, drawn rotated along its velocity.
    Arrow,
    /// Single target, slows the struck enemy.
    Axe,
    /// Area damage followed by an explosion.
    Shell,
}

impl ProjectileKind {
    /// Radius of the area damage in tiles; `None` means single target.
    #[must_use]
    pub const fn damage_radius_tiles(self) -> Option<f32> {
        match self {
            Self::Shell => Some(2.0),
            Self::Arrow | Self::Axe => None,
        }
    }

    /// Reports whether the projectile is drawn rotated along its velocity.
    #[must_use]
    pub const fn rotates(self) -> bool {
        matches!(self, Self::Arrow)
    }

    /// Slow applied to the struck enemy, if any.
    #[must_use]
    pub const fn slow(self) -> Option<SlowEffect> {
        match self {
            Self::Axe => Some(SlowEffect {
                amount: 0.5,
                duration: Duration::from_secs(1),
            }),
            Self::Arrow | Self::Shell => None,
        }
    }

    /// Visual phase played after impact before the projectile is removed.
    #[must_use]
    pub const fn aftermath(self) -> Option<Duration> {
        match self {
            // five frames of 0.1 s
            Self::Shell => Some(Duration::from_millis(500)),
            Self::Arrow | Self::Axe => None,
        }
    }
}

/// Kinds of enemies that waves may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline enemy.
    Slim,
    /// Tough slime that periodically heals the pack around it.
    KingSlim,
    /// Faster, frail walker.
    Skeleton,
    /// Fastest and frailest walker.
    Goblin,
    /// Slow healer with a wide recovery radius.
    GoblinPriest,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Slim,
        EnemyKind::KingSlim,
        EnemyKind::Skeleton,
        EnemyKind::Goblin,
        EnemyKind::GoblinPriest,
    ];

    /// Content name used by level files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slim => "Slim",
            Self::KingSlim => "KingSlim",
            Self::Skeleton => "Skeleton",
            Self::Goblin => "Goblin",
            Self::GoblinPriest => "GoblinPriest",
        }
    }

    /// Resolves a content name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    const fn index(self) -> usize {
        match self {
            Self::Slim => 0,
            Self::KingSlim => 1,
            Self::Skeleton => 2,
            Self::Goblin => 3,
            Self::GoblinPriest => 4,
        }
    }
}

/// Upgrade level of a tower kind, bounded to `0..=9`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerLevel(u8);

impl TowerLevel {
    /// Level every tower kind starts at.
    pub const MIN: Self = Self(0);
    /// Highest reachable level.
    pub const MAX: Self = Self(LEVEL_COUNT as u8 - 1);

    /// Creates a level, saturating at [`TowerLevel::MAX`].
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Numeric level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Following level, or `None` at the cap.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 >= Self::MAX.0 {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One value per tower level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelTable<T>([T; LEVEL_COUNT]);

impl<T: Copy> LevelTable<T> {
    /// Creates a table from explicit per-level values.
    #[must_use]
    pub const fn new(values: [T; LEVEL_COUNT]) -> Self {
        Self(values)
    }

    /// Creates a table that holds the same value at every level.
    #[must_use]
    pub const fn uniform(value: T) -> Self {
        Self([value; LEVEL_COUNT])
    }

    /// Value at `level`.
    #[must_use]
    pub const fn get(&self, level: TowerLevel) -> T {
        self.0[level.index()]
    }

    /// Replaces the leading levels with `values`; surplus entries are ignored.
    #[must_use]
    pub fn overlay(mut self, values: &[T]) -> Self {
        for (slot, value) in self.0.iter_mut().zip(values) {
            *slot = *value;
        }
        self
    }
}

/// Cost to move from each level to the next; the top level has no entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCosts([u32; LEVEL_COUNT - 1]);

impl UpgradeCosts {
    /// Creates the upgrade cost table.
    #[must_use]
    pub const fn new(values: [u32; LEVEL_COUNT - 1]) -> Self {
        Self(values)
    }

    /// Same cost for every upgrade.
    #[must_use]
    pub const fn uniform(value: u32) -> Self {
        Self([value; LEVEL_COUNT - 1])
    }

    /// Cost of upgrading from `level`, or `None` once the cap is reached.
    #[must_use]
    pub fn from_level(&self, level: TowerLevel) -> Option<u32> {
        self.0.get(level.index()).copied()
    }

    /// Replaces the leading upgrade costs with `values`.
    #[must_use]
    pub fn overlay(mut self, values: &[u32]) -> Self {
        for (slot, value) in self.0.iter_mut().zip(values) {
            *slot = *value;
        }
        self
    }
}

/// Attribute arrays for a single tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTemplate {
    /// Seconds between shots.
    pub interval: LevelTable<f32>,
    /// Damage carried by each projectile.
    pub damage: LevelTable<f32>,
    /// Targeting radius in tiles.
    pub view_range: LevelTable<f32>,
    /// Coins required to place the tower.
    pub cost: LevelTable<u32>,
    /// Coins required to reach the next level.
    pub upgrade_cost: UpgradeCosts,
}

impl TowerTemplate {
    /// Fire interval at `level` as a duration.
    #[must_use]
    pub fn interval_at(&self, level: TowerLevel) -> Duration {
        seconds(self.interval.get(level))
    }
}

impl Default for TowerTemplate {
    fn default() -> Self {
        Self {
            interval: LevelTable::uniform(1.0),
            damage: LevelTable::uniform(25.0),
            view_range: LevelTable::uniform(5.0),
            cost: LevelTable::uniform(50),
            upgrade_cost: UpgradeCosts::uniform(75),
        }
    }
}

/// Templates for every tower kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TowerTables([TowerTemplate; 3]);

impl TowerTables {
    /// Template for `kind`.
    #[must_use]
    pub const fn get(&self, kind: TowerKind) -> &TowerTemplate {
        &self.0[kind.index()]
    }

    /// Mutable template for `kind`.
    pub fn get_mut(&mut self, kind: TowerKind) -> &mut TowerTemplate {
        &mut self.0[kind.index()]
    }
}

/// Periodic heal cast by an enemy on itself and its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    /// Time between casts.
    pub interval: Duration,
    /// Heal radius in tiles.
    pub range: f32,
    /// Hit points restored per cast.
    pub intensity: f32,
}

/// Attributes for a single enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Maximum hit points.
    pub hp: f32,
    /// Walking speed in tiles per second.
    pub speed: f32,
    /// Base health removed on reaching the goal.
    pub damage: f32,
    /// Probability of dropping a coin on death.
    pub reward_ratio: f32,
    /// Seconds between recovery casts.
    pub recover_interval: f32,
    /// Recovery radius in tiles; negative disables the skill.
    pub recover_range: f32,
    /// Hit points restored per recovery cast.
    pub recover_intensity: f32,
}

impl EnemyTemplate {
    /// Stock attributes shipped with the game for `kind`.
    #[must_use]
    pub fn stock(kind: EnemyKind) -> Self {
        let base = Self::default();
        match kind {
            EnemyKind::Slim => base,
            EnemyKind::KingSlim => Self {
                hp: 200.0,
                speed: 1.2,
                damage: 2.0,
                recover_interval: 10.0,
                recover_range: 3.0,
                recover_intensity: 25.0,
                ..base
            },
            EnemyKind::Skeleton => Self {
                hp: 80.0,
                speed: 1.5,
                damage: 1.5,
                reward_ratio: 0.7,
                ..base
            },
            EnemyKind::Goblin => Self {
                hp: 60.0,
                speed: 2.0,
                reward_ratio: 0.8,
                ..base
            },
            EnemyKind::GoblinPriest => Self {
                hp: 120.0,
                speed: 0.8,
                damage: 0.5,
                recover_interval: 5.0,
                recover_range: 5.0,
                recover_intensity: 40.0,
                ..base
            },
        }
    }

    /// Recovery skill, or `None` when the range is negative or the interval is not positive.
    #[must_use]
    pub fn recovery(&self) -> Option<Recovery> {
        if self.recover_range < 0.0 || self.recover_interval.is_nan() || self.recover_interval <= 0.0
        {
            return None;
        }
        Some(Recovery {
            interval: seconds(self.recover_interval),
            range: self.recover_range,
            intensity: self.recover_intensity,
        })
    }
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            hp: 100.0,
            speed: 1.0,
            damage: 1.0,
            reward_ratio: 0.5,
            recover_interval: 10.0,
            recover_range: -1.0,
            recover_intensity: 25.0,
        }
    }
}

/// Templates for every enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTables([EnemyTemplate; 5]);

impl EnemyTables {
    /// Template for `kind`.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> &EnemyTemplate {
        &self.0[kind.index()]
    }

    /// Mutable template for `kind`.
    pub fn get_mut(&mut self, kind: EnemyKind) -> &mut EnemyTemplate {
        &mut self.0[kind.index()]
    }
}

impl Default for EnemyTables {
    fn default() -> Self {
        Self(EnemyKind::ALL.map(EnemyTemplate::stock))
    }
}
