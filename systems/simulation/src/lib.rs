#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation context that owns the world and drives every system once per
//! frame in a fixed order.
//!
//! Within a tick the wave scheduler spawns first, then enemies move, towers
//! fire, projectiles advance, collisions resolve, goal contacts are charged
//! and finally invalid entities are pruned.

use std::time::Duration;

use tracing::{trace, trace_span};
use village_defence_core::{Command, Event, TowerTarget};
use village_defence_system_tower_combat::TowerCombat;
use village_defence_system_tower_targeting::TowerTargeting;
use village_defence_system_wave_scheduler::{self as wave_scheduler, WaveScheduler};
use village_defence_world::{self as world, query, MatchConfig, World};

/// Owns the match state and the pure systems that act on it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    combat: TowerCombat,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    tick_events: Vec<Event>,
}

impl Simulation {
    /// Builds a fresh match from the provided configuration.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            world: World::new(config),
            scheduler: WaveScheduler::new(wave_scheduler::Config::new(config.waves.clone())),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            targets: Vec::new(),
            commands: Vec::new(),
            tick_events: Vec::new(),
        }
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the wave scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    /// Applies a command coming from outside the tick loop, such as a
    /// placement, upgrade or pickup collection.
    pub fn submit(&mut self, command: Command, out_events: &mut Vec<Event>) {
        world::apply(&mut self.world, command, out_events);
    }

    /// Advances the match by `dt`. Finished matches are left untouched.
    pub fn step(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if query::match_status(&self.world).is_over() {
            return;
        }
        let _span = trace_span!("tick", index = query::tick_index(&self.world)).entered();

        self.tick_events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.tick_events);

        self.commands.clear();
        self.scheduler.handle(
            &self.tick_events,
            query::match_status(&self.world),
            query::enemy_count(&self.world),
            &mut self.commands,
        );
        out_events.append(&mut self.tick_events);
        self.flush_commands(out_events);

        world::apply(&mut self.world, Command::AdvanceEnemies { dt }, out_events);
        world::apply(&mut self.world, Command::AdvanceTowers { dt }, out_events);

        let status = query::match_status(&self.world);
        self.targeting.handle(
            status,
            &query::towers(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        self.combat.handle(
            status,
            &query::tower_cooldowns(&self.world),
            &self.targets,
            &mut self.commands,
        );
        for change in self.combat.changes() {
            trace!(
                tower = change.tower.get(),
                from = ?change.from,
                to = ?change.to,
                "tower firing phase changed"
            );
        }
        self.flush_commands(out_events);

        for command in [
            Command::AdvanceProjectiles { dt },
            Command::AdvancePickups { dt },
            Command::ResolveCollisions,
            Command::ResolveGoalContacts,
            Command::PruneInvalid,
        ] {
            world::apply(&mut self.world, command, out_events);
        }
    }

    fn flush_commands(&mut self, out_events: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, out_events);
        }
    }
}
