//! Scripted wave content.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{tables::EnemyKind, SpawnPointId};

/// Single enemy spawn within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Delay since the previous spawn of the wave (or since the wave started).
    pub delay: Duration,
    /// Spawn point whose route the enemy follows.
    pub spawn_point: SpawnPointId,
    /// Kind of enemy to create.
    pub enemy: EnemyKind,
}

/// Scripted batch of spawns with its reward and start delay.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Coins credited once the wave is cleared.
    pub reward: u32,
    /// Delay before the first spawn event starts counting.
    pub delay: Duration,
    /// Ordered spawn events.
    pub spawns: Vec<SpawnEvent>,
}

impl WaveDefinition {
    /// Reports whether the wave would spawn anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}
