#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave state machine that emits spawn, wave-complete and
//! victory commands.

use std::time::Duration;

use village_defence_core::{Command, Countdown, Event, MatchStatus, WaveDefinition};

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug, Default)]
pub struct Config {
    waves: Vec<WaveDefinition>,
}

impl Config {
    /// Creates a new configuration from waves in play order.
    #[must_use]
    pub fn new(waves: Vec<WaveDefinition>) -> Self {
        Self { waves }
    }
}

/// Stage of the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// Counting down the wave's start delay.
    WaitingToStart,
    /// Issuing spawn events one delay at a time.
    Spawning,
    /// Every spawn was issued; waiting for the enemy registry to empty.
    WaitingForClear,
    /// No waves remain and victory was declared.
    Finished,
}

/// Pure system that walks the wave list one tick at a time.
#[derive(Debug)]
pub struct WaveScheduler {
    waves: Vec<WaveDefinition>,
    wave_index: usize,
    spawn_cursor: usize,
    phase: WavePhase,
    countdown: Countdown,
}

impl WaveScheduler {
    /// Creates a scheduler, dropping waves that contain no spawn events.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let waves: Vec<WaveDefinition> = config
            .waves
            .into_iter()
            .filter(|wave| !wave.is_empty())
            .collect();
        let first_delay = waves.first().map_or(Duration::ZERO, |wave| wave.delay);

        Self {
            waves,
            wave_index: 0,
            spawn_cursor: 0,
            phase: WavePhase::WaitingToStart,
            countdown: Countdown::one_shot(first_delay),
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Zero-based index of the wave being played.
    #[must_use]
    pub const fn wave_index(&self) -> usize {
        self.wave_index
    }

    /// Number of playable waves.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Consumes the tick's events and the live enemy count to emit commands.
    ///
    /// A wave only clears once its last spawn was issued and the registry is
    /// empty at the start of a tick. Nothing is evaluated once the match is over.
    pub fn handle(
        &mut self,
        events: &[Event],
        status: MatchStatus,
        active_enemies: usize,
        out: &mut Vec<Command>,
    ) {
        if status.is_over() || self.phase == WavePhase::Finished {
            return;
        }

        let Some(wave) = self.waves.get(self.wave_index) else {
            self.phase = WavePhase::Finished;
            out.push(Command::DeclareVictory);
            return;
        };

        let dt = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);

        match self.phase {
            WavePhase::WaitingToStart => {
                if self.countdown.on_update(dt) {
                    self.spawn_cursor = 0;
                    self.phase = WavePhase::Spawning;
                    let first = wave.spawns.first().map_or(Duration::ZERO, |spawn| spawn.delay);
                    self.countdown.restart_with(first);
                }
            }
            WavePhase::Spawning => {
                if !self.countdown.on_update(dt) {
                    return;
                }
                if let Some(spawn) = wave.spawns.get(self.spawn_cursor) {
                    out.push(Command::SpawnEnemy {
                        spawn_point: spawn.spawn_point,
                        kind: spawn.enemy,
                    });
                }
                self.spawn_cursor += 1;
                match wave.spawns.get(self.spawn_cursor) {
                    Some(next) => self.countdown.restart_with(next.delay),
                    None => self.phase = WavePhase::WaitingForClear,
                }
            }
            WavePhase::WaitingForClear => {
                if active_enemies == 0 {
                    self.clear_wave(out);
                }
            }
            WavePhase::Finished => {}
        }
    }

    fn clear_wave(&mut self, out: &mut Vec<Command>) {
        let Some(wave) = self.waves.get(self.wave_index) else {
            return;
        };
        out.push(Command::CompleteWave {
            wave: u32::try_from(self.wave_index).unwrap_or(u32::MAX),
            reward: wave.reward,
        });

        self.wave_index += 1;
        self.spawn_cursor = 0;
        match self.waves.get(self.wave_index) {
            Some(next) => {
                self.phase = WavePhase::WaitingToStart;
                self.countdown.restart_with(next.delay);
            }
            None => {
                self.phase = WavePhase::Finished;
                out.push(Command::DeclareVictory);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_defence_core::{EnemyKind, SpawnEvent, SpawnPointId};

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    fn wave(reward: u32, delay: u64, spawns: &[u64]) -> WaveDefinition {
        WaveDefinition {
            reward,
            delay: secs(delay),
            spawns: spawns
                .iter()
                .map(|delay| SpawnEvent {
                    delay: secs(*delay),
                    spawn_point: SpawnPointId::new(1),
                    enemy: EnemyKind::Slim,
                })
                .collect(),
        }
    }

    fn tick(
        scheduler: &mut WaveScheduler,
        dt: Duration,
        active_enemies: usize,
    ) -> Vec<Command> {
        let mut out = Vec::new();
        scheduler.handle(
            &[Event::TimeAdvanced { dt }],
            MatchStatus::InProgress,
            active_enemies,
            &mut out,
        );
        out
    }

    fn spawn_command() -> Command {
        Command::SpawnEnemy {
            spawn_point: SpawnPointId::new(1),
            kind: EnemyKind::Slim,
        }
    }

    #[test]
    fn empty_waves_are_dropped() {
        let scheduler = WaveScheduler::new(Config::new(vec![
            wave(10, 1, &[]),
            wave(20, 1, &[1]),
        ]));

        assert_eq!(scheduler.wave_count(), 1);
    }

    #[test]
    fn no_playable_waves_declares_victory_once() {
        let mut scheduler = WaveScheduler::new(Config::new(vec![wave(10, 1, &[])]));

        assert_eq!(tick(&mut scheduler, secs(1), 0), vec![Command::DeclareVictory]);
        assert!(tick(&mut scheduler, secs(1), 0).is_empty());
        assert_eq!(scheduler.phase(), WavePhase::Finished);
    }

    #[test]
    fn spawns_follow_the_start_delay_then_each_spawn_delay() {
        let mut scheduler = WaveScheduler::new(Config::new(vec![wave(5, 2, &[1, 1])]));

        assert!(tick(&mut scheduler, secs(1), 0).is_empty());
        assert!(tick(&mut scheduler, secs(1), 0).is_empty());
        assert_eq!(scheduler.phase(), WavePhase::Spawning);
        assert_eq!(tick(&mut scheduler, secs(1), 0), vec![spawn_command()]);
        assert_eq!(tick(&mut scheduler, secs(1), 1), vec![spawn_command()]);
        assert_eq!(scheduler.phase(), WavePhase::WaitingForClear);
    }

    #[test]
    fn wave_index_holds_until_enemies_are_gone() {
        let mut scheduler = WaveScheduler::new(Config::new(vec![
            wave(5, 0, &[0]),
            wave(7, 3, &[1]),
        ]));

        let _ = tick(&mut scheduler, Duration::ZERO, 0);
        assert_eq!(tick(&mut scheduler, Duration::ZERO, 0), vec![spawn_command()]);
        assert!(tick(&mut scheduler, secs(5), 1).is_empty());
        assert!(tick(&mut scheduler, secs(5), 2).is_empty());
        assert_eq!(scheduler.wave_index(), 0);

        assert_eq!(
            tick(&mut scheduler, secs(1), 0),
            vec![Command::CompleteWave { wave: 0, reward: 5 }]
        );
        assert_eq!(scheduler.wave_index(), 1);
        assert_eq!(scheduler.phase(), WavePhase::WaitingToStart);
    }

    #[test]
    fn final_clear_completes_the_wave_and_declares_victory() {
        let mut scheduler = WaveScheduler::new(Config::new(vec![wave(9, 0, &[0])]));
        let _ = tick(&mut scheduler, Duration::ZERO, 0);
        let _ = tick(&mut scheduler, Duration::ZERO, 0);

        assert_eq!(
            tick(&mut scheduler, Duration::ZERO, 0),
            vec![
                Command::CompleteWave { wave: 0, reward: 9 },
                Command::DeclareVictory,
            ]
        );
        assert!(tick(&mut scheduler, secs(1), 0).is_empty());
    }

    #[test]
    fn finished_match_skips_evaluation() {
        let mut scheduler = WaveScheduler::new(Config::new(vec![wave(9, 0, &[0])]));
        let mut out = Vec::new();

        scheduler.handle(
            &[Event::TimeAdvanced { dt: secs(10) }],
            MatchStatus::Lost,
            0,
            &mut out,
        );

        assert!(out.is_empty());
        assert_eq!(scheduler.phase(), WavePhase::WaitingToStart);
    }
}
