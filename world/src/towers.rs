//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use village_defence_core::{
    Countdown, Direction, TileCoord, TowerCooldownSnapshot, TowerId, TowerKind, TowerLevel,
    TowerStance,
};

use crate::registry::Registry;

/// Three frames of 0.2 s.
const FIRE_ANIMATION: Duration = Duration::from_millis(600);

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Tile the tower stands on.
    pub(crate) tile: TileCoord,
    /// World-space center of the tile.
    pub(crate) position: Vec2,
    pub(crate) facing: Direction,
    pub(crate) stance: TowerStance,
    cooldown: Countdown,
    ready: bool,
    animation: Countdown,
}

impl TowerState {
    /// Builds a tower that may fire immediately.
    pub(crate) fn new(id: TowerId, kind: TowerKind, tile: TileCoord, position: Vec2) -> Self {
        Self {
            id,
            kind,
            tile,
            position,
            facing: Direction::East,
            stance: TowerStance::Idle,
            cooldown: Countdown::one_shot(Duration::ZERO),
            ready: true,
            animation: Countdown::one_shot(FIRE_ANIMATION),
        }
    }

    pub(crate) const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Runs the cooldown and the fire animation.
    pub(crate) fn advance(&mut self, dt: Duration) {
        if !self.ready && self.cooldown.on_update(dt) {
            self.ready = true;
        }
        if self.stance == TowerStance::Firing && self.animation.on_update(dt) {
            self.stance = TowerStance::Idle;
        }
    }

    /// Restarts the cooldown with `interval` and turns toward `aim`.
    pub(crate) fn fire(&mut self, aim: Vec2, interval: Duration) {
        self.cooldown.restart_with(interval);
        self.ready = false;
        self.facing = facing_for(aim);
        self.stance = TowerStance::Firing;
        self.animation.restart();
    }

    pub(crate) fn cooldown_snapshot(&self) -> TowerCooldownSnapshot {
        let ready_in = if self.ready {
            Duration::ZERO
        } else {
            self.cooldown.remaining()
        };
        TowerCooldownSnapshot {
            tower: self.id,
            ready_in,
        }
    }
}

/// Dominant axis of the aim vector; horizontal wins ties.
pub(crate) fn facing_for(aim: Vec2) -> Direction {
    if aim.x.abs() >= aim.y.abs() {
        if aim.x < 0.0 {
            Direction::West
        } else {
            Direction::East
        }
    } else if aim.y < 0.0 {
        Direction::North
    } else {
        Direction::South
    }
}

/// Registry that stores towers, their tiles and the per-kind upgrade levels.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    towers: Registry<TowerId, TowerState>,
    occupancy: BTreeMap<TileCoord, TowerId>,
    levels: BTreeMap<TowerKind, TowerLevel>,
}

impl TowerRegistry {
    /// Creates an empty tower registry with every kind at level zero.
    pub(crate) fn new() -> Self {
        Self {
            towers: Registry::new(),
            occupancy: BTreeMap::new(),
            levels: BTreeMap::new(),
        }
    }

    pub(crate) fn is_occupied(&self, tile: TileCoord) -> bool {
        self.occupancy.contains_key(&tile)
    }

    pub(crate) fn level(&self, kind: TowerKind) -> TowerLevel {
        self.levels.get(&kind).copied().unwrap_or(TowerLevel::MIN)
    }

    pub(crate) fn set_level(&mut self, kind: TowerKind, level: TowerLevel) {
        let _ = self.levels.insert(kind, level);
    }

    /// Stores a new tower on `tile`, or returns `None` once identifiers run out.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        tile: TileCoord,
        position: Vec2,
    ) -> Option<TowerId> {
        let id = self
            .towers
            .insert_with(|id| TowerState::new(id, kind, tile, position))?;
        let _ = self.occupancy.insert(tile, id);
        Some(id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.towers.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.towers.get_mut(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.towers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.towers.iter_mut()
    }
}
