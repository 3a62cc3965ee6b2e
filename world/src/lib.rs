#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Village Defence.
//!
//! The world owns every entity registry together with the coin ledger and the
//! base. It is only ever mutated through [`apply`], which executes one
//! [`Command`] and appends the resulting [`Event`] values. Read-only access
//! goes through the [`query`] module.

mod combat;
mod config;
mod economy;
mod enemies;
mod navigation;
mod projectiles;
mod registry;
mod towers;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use village_defence_core::{
    AudioCue, Command, EnemyId, EnemyKind, EnemyTables, Event, MatchStatus, PickupId,
    PlacementError, ProjectileId, SpawnPointId, TileCoord, TileGrid, TileMap, TowerId, TowerKind,
    TowerTables, UpgradeError,
};

pub use config::MatchConfig;

use economy::{BaseDefense, CoinPickup, Ledger};
use enemies::{Enemy, RecoveryCast};
use navigation::{build_routes, Route};
use projectiles::{Projectile, ProjectileStep};
use registry::Registry;
use towers::TowerRegistry;

/// Represents the authoritative Village Defence match state.
#[derive(Debug)]
pub struct World {
    map: TileMap,
    grid: TileGrid,
    goal: Option<TileCoord>,
    routes: BTreeMap<SpawnPointId, Arc<Route>>,
    tower_tables: TowerTables,
    enemy_tables: EnemyTables,
    enemies: Registry<EnemyId, Enemy>,
    towers: TowerRegistry,
    projectiles: Registry<ProjectileId, Projectile>,
    pickups: Registry<PickupId, CoinPickup>,
    ledger: Ledger,
    base: BaseDefense,
    coins_per_pickup: u32,
    status: MatchStatus,
    rng: ChaCha8Rng,
    tick_index: u64,
    elapsed: Duration,
}

impl World {
    /// Creates a world ready to play the configured match.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        let map = config.map.clone();
        let grid = TileGrid::new(map.columns(), map.rows(), config.tile_size);
        let routes = build_routes(&map, &grid);
        let goal = map.goal();
        info!(
            columns = map.columns(),
            rows = map.rows(),
            spawn_points = routes.len(),
            "world created"
        );

        Self {
            goal,
            routes,
            grid,
            map,
            tower_tables: config.towers,
            enemy_tables: config.enemies,
            enemies: Registry::new(),
            towers: TowerRegistry::new(),
            projectiles: Registry::new(),
            pickups: Registry::new(),
            ledger: Ledger::new(config.initial_coins),
            base: BaseDefense::new(config.base_health),
            coins_per_pickup: config.coins_per_pickup,
            status: MatchStatus::InProgress,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            tick_index: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn spawn_enemy(
        &mut self,
        spawn_point: SpawnPointId,
        kind: EnemyKind,
        out_events: &mut Vec<Event>,
    ) {
        let Some(route) = self.routes.get(&spawn_point).cloned() else {
            warn!(
                spawn_point = spawn_point.get(),
                ?kind,
                "spawn ignored: unknown spawn point"
            );
            out_events.push(Event::SpawnIgnored { spawn_point, kind });
            return;
        };

        let template = *self.enemy_tables.get(kind);
        let tile_size = self.grid.tile_size();
        let Some(enemy) = self
            .enemies
            .insert_with(|id| Enemy::spawn(id, kind, &template, route, tile_size))
        else {
            warn!(
                spawn_point = spawn_point.get(),
                ?kind,
                "spawn ignored: enemy identifiers exhausted"
            );
            out_events.push(Event::SpawnIgnored { spawn_point, kind });
            return;
        };
        debug!(enemy = enemy.get(), ?kind, spawn_point = spawn_point.get(), "enemy spawned");
        out_events.push(Event::EnemySpawned {
            enemy,
            kind,
            spawn_point,
        });
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let tile_size = self.grid.tile_size();
        let mut casts: Vec<RecoveryCast> = Vec::new();

        for enemy in self.enemies.iter_mut() {
            if !enemy.valid {
                continue;
            }
            if let Some(cast) = enemy.advance_effects(dt) {
                casts.push(cast);
            }
            enemy.advance_movement(dt, tile_size);
        }

        for cast in casts {
            for enemy in self.enemies.iter_mut() {
                if !enemy.valid || enemy.position.distance(cast.center) > cast.radius {
                    continue;
                }
                enemy.increase_health(cast.intensity);
                out_events.push(Event::EnemyHealed {
                    enemy: enemy.id,
                    caster: cast.caster,
                    hp: enemy.hp(),
                });
            }
        }
    }

    fn fire_projectile(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.get(tower_id) else {
            return;
        };
        if !tower.is_ready() {
            return;
        }
        let Some(enemy) = self.enemies.get(target).filter(|enemy| enemy.valid) else {
            return;
        };

        let kind = tower.kind;
        let origin = tower.position;
        let aim = enemy.position - origin;
        let level = self.towers.level(kind);
        let template = self.tower_tables.get(kind);
        let interval = template.interval_at(level);
        let damage = template.damage.get(level);
        let tile_size = self.grid.tile_size();
        let velocity = aim.normalize_or_zero() * kind.fire_speed() * tile_size;
        let projectile_kind = kind.projectile();

        let Some(projectile) = self.projectiles.insert_with(|id| {
            Projectile::launch(id, projectile_kind, origin, velocity, damage, tile_size)
        }) else {
            return;
        };
        if let Some(tower) = self.towers.get_mut(tower_id) {
            tower.fire(aim, interval);
        }
        out_events.push(Event::ProjectileFired {
            projectile,
            tower: tower_id,
            target,
            kind: projectile_kind,
        });
        out_events.push(Event::Audio {
            cue: AudioCue::Fire,
        });
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for projectile in self.projectiles.iter_mut() {
            if projectile.advance(dt, &self.grid) == ProjectileStep::LeftMap {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
            }
        }
    }

    fn advance_pickups(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for pickup in self.pickups.iter_mut() {
            if pickup.advance(dt) {
                out_events.push(Event::PickupExpired { pickup: pickup.id });
            }
        }
    }

    fn prune_invalid(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.prune(|enemy| enemy.valid) {
            out_events.push(Event::EnemyRemoved { enemy });
        }
        let _ = self.projectiles.prune(|projectile| projectile.valid);
        let _ = self.pickups.prune(|pickup| pickup.valid);
    }

    fn complete_wave(&mut self, wave: u32, reward: u32, out_events: &mut Vec<Event>) {
        self.ledger.increase(reward);
        info!(wave, reward, balance = self.ledger.balance(), "wave cleared");
        out_events.push(Event::WaveCleared { wave, reward });
        out_events.push(Event::CoinsChanged {
            balance: self.ledger.balance(),
        });
        out_events.push(Event::Audio {
            cue: AudioCue::WaveClear,
        });
    }

    fn place_tower(&mut self, kind: TowerKind, tile: TileCoord, out_events: &mut Vec<Event>) {
        match self.placement_check(kind, tile) {
            Ok(cost) => {
                let position = self.grid.tile_center(tile);
                let Some(tower) = self.towers.insert(kind, tile, position) else {
                    warn!(?kind, ?tile, "placement ignored: tower identifiers exhausted");
                    return;
                };
                self.ledger.decrease(cost);
                info!(tower = tower.get(), ?kind, ?tile, cost, "tower placed");
                out_events.push(Event::TowerPlaced {
                    tower,
                    kind,
                    tile,
                    cost,
                });
                out_events.push(Event::CoinsChanged {
                    balance: self.ledger.balance(),
                });
                out_events.push(Event::Audio {
                    cue: AudioCue::Placement,
                });
            }
            Err(reason) => {
                debug!(?kind, ?tile, ?reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, tile, reason });
            }
        }
    }

    fn placement_check(&self, kind: TowerKind, tile: TileCoord) -> Result<u32, PlacementError> {
        let Some(map_tile) = self.map.tile(tile) else {
            return Err(PlacementError::OutOfBounds);
        };
        if self.towers.is_occupied(tile) {
            return Err(PlacementError::Occupied);
        }
        if map_tile.is_path() {
            return Err(PlacementError::OnPath);
        }
        let cost = query::placement_cost(self, kind);
        let balance = self.ledger.balance();
        if cost > balance {
            return Err(PlacementError::InsufficientFunds { cost, balance });
        }
        Ok(cost)
    }

    fn upgrade_tower(&mut self, kind: TowerKind, out_events: &mut Vec<Event>) {
        let level = self.towers.level(kind);
        let outcome = match (query::upgrade_cost(self, kind), level.next()) {
            (Some(cost), Some(next)) if cost <= self.ledger.balance() => Ok((cost, next)),
            (Some(cost), Some(_)) => Err(UpgradeError::InsufficientFunds {
                cost,
                balance: self.ledger.balance(),
            }),
            _ => Err(UpgradeError::MaxLevel),
        };

        match outcome {
            Ok((cost, next)) => {
                self.ledger.decrease(cost);
                self.towers.set_level(kind, next);
                info!(?kind, level = next.get(), cost, "tower kind upgraded");
                out_events.push(Event::TowerUpgraded {
                    kind,
                    level: next,
                    cost,
                });
                out_events.push(Event::CoinsChanged {
                    balance: self.ledger.balance(),
                });
                out_events.push(Event::Audio {
                    cue: AudioCue::Upgrade,
                });
            }
            Err(reason) => {
                debug!(?kind, ?reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected { kind, reason });
            }
        }
    }

    fn collect_pickup(&mut self, pickup_id: PickupId, out_events: &mut Vec<Event>) {
        let Some(pickup) = self.pickups.get_mut(pickup_id) else {
            return;
        };
        if !pickup.valid {
            return;
        }
        pickup.valid = false;
        let coins = self.coins_per_pickup;
        self.ledger.increase(coins);
        out_events.push(Event::PickupCollected {
            pickup: pickup_id,
            coins,
        });
        out_events.push(Event::CoinsChanged {
            balance: self.ledger.balance(),
        });
        out_events.push(Event::Audio {
            cue: AudioCue::Pickup,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { spawn_point, kind } => {
            world.spawn_enemy(spawn_point, kind, out_events);
        }
        Command::AdvanceEnemies { dt } => world.advance_enemies(dt, out_events),
        Command::AdvanceTowers { dt } => {
            for tower in world.towers.iter_mut() {
                tower.advance(dt);
            }
        }
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::AdvanceProjectiles { dt } => world.advance_projectiles(dt, out_events),
        Command::AdvancePickups { dt } => world.advance_pickups(dt, out_events),
        Command::ResolveCollisions => world.resolve_collisions(out_events),
        Command::ResolveGoalContacts => world.resolve_goal_contacts(out_events),
        Command::PruneInvalid => world.prune_invalid(out_events),
        Command::CompleteWave { wave, reward } => world.complete_wave(wave, reward, out_events),
        Command::DeclareVictory => {
            if world.status == MatchStatus::InProgress {
                world.status = MatchStatus::Won;
                info!("all waves cleared, match won");
                out_events.push(Event::MatchWon);
            }
        }
        Command::PlaceTower { kind, tile } => world.place_tower(kind, tile, out_events),
        Command::UpgradeTower { kind } => world.upgrade_tower(kind, out_events),
        Command::CollectPickup { pickup } => world.collect_pickup(pickup, out_events),
    }
}

/// Read-only queries over the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use village_defence_core::{
        EnemyView, MatchStatus, PickupSnapshot, ProjectileSnapshot, SpawnPointId, TileCoord,
        TileGrid, TileMap, TowerCooldownView, TowerKind, TowerLevel, TowerSnapshot, TowerView,
    };

    use super::World;

    /// Provides read-only access to the parsed map.
    #[must_use]
    pub fn map(world: &World) -> &TileMap {
        &world.map
    }

    /// Pixel-space geometry of the map.
    #[must_use]
    pub fn tile_grid(world: &World) -> TileGrid {
        world.grid
    }

    /// Goal tile, if the map declares one.
    #[must_use]
    pub fn goal(world: &World) -> Option<TileCoord> {
        world.goal
    }

    /// Waypoints of the route baked for a spawn point.
    #[must_use]
    pub fn route(world: &World, spawn_point: SpawnPointId) -> Option<&[Vec2]> {
        world.routes.get(&spawn_point).map(|route| route.points())
    }

    /// Tiles of the route baked for a spawn point.
    #[must_use]
    pub fn route_tiles(world: &World, spawn_point: SpawnPointId) -> Option<&[TileCoord]> {
        world.routes.get(&spawn_point).map(|route| route.tiles())
    }

    /// Current match outcome.
    #[must_use]
    pub fn match_status(world: &World) -> MatchStatus {
        world.status
    }

    /// Coin balance.
    #[must_use]
    pub fn coins(world: &World) -> u32 {
        world.ledger.balance()
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(world: &World) -> f32 {
        world.base.health()
    }

    /// Number of enemies in the registry, including ones awaiting pruning.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Total simulated time.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.valid)
                .map(|enemy| enemy.snapshot())
                .collect(),
        )
    }

    /// Captures every tower with its kind's current level and range.
    #[must_use]
    pub fn towers(world: &World) -> TowerView {
        let tile_size = world.grid.tile_size();
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| {
                    let level = world.towers.level(tower.kind);
                    let range = world.tower_tables.get(tower.kind).view_range.get(level);
                    TowerSnapshot {
                        id: tower.id,
                        kind: tower.kind,
                        tile: tower.tile,
                        position: tower.position,
                        level,
                        range: range * tile_size,
                        facing: tower.facing,
                        stance: tower.stance,
                    }
                })
                .collect(),
        )
    }

    /// Captures the remaining cooldown of every tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.cooldown_snapshot())
                .collect(),
        )
    }

    /// Captures projectiles still on screen.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .filter(|projectile| projectile.valid)
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Captures coin pickups still on screen.
    #[must_use]
    pub fn pickups(world: &World) -> Vec<PickupSnapshot> {
        world
            .pickups
            .iter()
            .filter(|pickup| pickup.valid)
            .map(|pickup| pickup.snapshot())
            .collect()
    }

    /// Current level of a tower kind.
    #[must_use]
    pub fn tower_level(world: &World, kind: TowerKind) -> TowerLevel {
        world.towers.level(kind)
    }

    /// Coins required to place a tower of `kind` at its current level.
    #[must_use]
    pub fn placement_cost(world: &World, kind: TowerKind) -> u32 {
        world
            .tower_tables
            .get(kind)
            .cost
            .get(world.towers.level(kind))
    }

    /// Coins required to upgrade `kind`, or `None` at the top level.
    #[must_use]
    pub fn upgrade_cost(world: &World, kind: TowerKind) -> Option<u32> {
        world
            .tower_tables
            .get(kind)
            .upgrade_cost
            .from_level(world.towers.level(kind))
    }
}
