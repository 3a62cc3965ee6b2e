#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that runs every tower's firing cycle.
//!
//! A tower whose cooldown is still running is [`FiringPhase::Idle`]. Once the
//! cooldown expires it is [`FiringPhase::Scanning`] until targeting hands it an
//! enemy, at which point it enters [`FiringPhase::Fire`] and a
//! `Command::FireProjectile` is queued. The world restarts the cooldown when it
//! launches the projectile, so the next evaluation drops the tower back to
//! idle. Scanning never consumes the cooldown.

use std::collections::BTreeMap;

use village_defence_core::{
    Command, EnemyId, MatchStatus, TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerTarget,
};

/// Position of a tower in its firing cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FiringPhase {
    /// Cooldown still running.
    Idle,
    /// Ready to fire with no enemy in range.
    Scanning,
    /// Launching a projectile this tick.
    Fire,
}

impl FiringPhase {
    fn evaluate(cooldown: &TowerCooldownSnapshot, target: Option<EnemyId>) -> Self {
        if !cooldown.ready_in.is_zero() {
            Self::Idle
        } else if target.is_some() {
            Self::Fire
        } else {
            Self::Scanning
        }
    }
}

/// Phase transition observed during the latest evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    /// Tower that changed phase.
    pub tower: TowerId,
    /// Previous phase, or `None` for a tower seen for the first time.
    pub from: Option<FiringPhase>,
    /// Phase entered.
    pub to: FiringPhase,
}

/// Tower combat system tracking each tower's firing phase between ticks.
#[derive(Debug, Default)]
pub struct TowerCombat {
    phases: BTreeMap<TowerId, FiringPhase>,
    targets: BTreeMap<TowerId, EnemyId>,
    changes: Vec<PhaseChange>,
}

impl TowerCombat {
    /// Creates a combat system that has not seen any tower yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase the tower entered during the latest evaluation.
    #[must_use]
    pub fn phase(&self, tower: TowerId) -> Option<FiringPhase> {
        self.phases.get(&tower).copied()
    }

    /// Transitions recorded by the latest evaluation, in tower order.
    #[must_use]
    pub fn changes(&self) -> &[PhaseChange] {
        &self.changes
    }

    /// Advances every tower's firing cycle and queues a
    /// `Command::FireProjectile` for each tower entering [`FiringPhase::Fire`].
    ///
    /// A tower fires at most once per evaluation, at the first target listed
    /// for it. Targets naming towers absent from `cooldowns` are ignored, and
    /// towers missing from `cooldowns` are forgotten. A finished match forgets
    /// every tower and queues nothing.
    pub fn handle(
        &mut self,
        status: MatchStatus,
        cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        self.changes.clear();
        if status.is_over() {
            self.phases.clear();
            return;
        }

        self.targets.clear();
        for target in tower_targets {
            let _ = self.targets.entry(target.tower).or_insert(target.enemy);
        }

        let previous = std::mem::take(&mut self.phases);
        for cooldown in cooldowns.iter() {
            let tower = cooldown.tower;
            let target = self.targets.get(&tower).copied();
            let phase = FiringPhase::evaluate(cooldown, target);

            if let (FiringPhase::Fire, Some(enemy)) = (phase, target) {
                out.push(Command::FireProjectile {
                    tower,
                    target: enemy,
                });
            }

            let from = previous.get(&tower).copied();
            if from != Some(phase) {
                self.changes.push(PhaseChange {
                    tower,
                    from,
                    to: phase,
                });
            }
            let _ = self.phases.insert(tower, phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cooldowns(entries: &[(u32, u64)]) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            entries
                .iter()
                .map(|(tower, millis)| TowerCooldownSnapshot {
                    tower: TowerId::new(*tower),
                    ready_in: Duration::from_millis(*millis),
                })
                .collect(),
        )
    }

    fn target(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
        }
    }

    fn fire(tower: u32, enemy: u32) -> Command {
        Command::FireProjectile {
            tower: TowerId::new(tower),
            target: EnemyId::new(enemy),
        }
    }

    #[test]
    fn ready_tower_with_a_target_fires() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();

        combat.handle(
            MatchStatus::InProgress,
            &cooldowns(&[(2, 0), (5, 0)]),
            &[target(5, 1), target(2, 4)],
            &mut out,
        );

        assert_eq!(out, vec![fire(2, 4), fire(5, 1)]);
        assert_eq!(combat.phase(TowerId::new(2)), Some(FiringPhase::Fire));
        assert_eq!(combat.phase(TowerId::new(5)), Some(FiringPhase::Fire));
    }

    #[test]
    fn cooling_tower_stays_idle_even_with_a_target() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();

        combat.handle(
            MatchStatus::InProgress,
            &cooldowns(&[(3, 250)]),
            &[target(3, 9)],
            &mut out,
        );

        assert!(out.is_empty());
        assert_eq!(combat.phase(TowerId::new(3)), Some(FiringPhase::Idle));
    }

    #[test]
    fn ready_tower_without_a_target_keeps_scanning() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();
        let ready = cooldowns(&[(1, 0)]);

        combat.handle(MatchStatus::InProgress, &ready, &[], &mut out);
        assert_eq!(combat.phase(TowerId::new(1)), Some(FiringPhase::Scanning));
        assert_eq!(combat.changes().len(), 1);

        combat.handle(MatchStatus::InProgress, &ready, &[], &mut out);
        assert!(out.is_empty());
        assert_eq!(combat.phase(TowerId::new(1)), Some(FiringPhase::Scanning));
        assert!(combat.changes().is_empty());
    }

    #[test]
    fn each_tower_fires_once_at_its_first_target() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();

        combat.handle(
            MatchStatus::InProgress,
            &cooldowns(&[(1, 0)]),
            &[target(1, 6), target(1, 2), target(42, 3)],
            &mut out,
        );

        assert_eq!(out, vec![fire(1, 6)]);
        assert_eq!(combat.phase(TowerId::new(42)), None);
    }

    #[test]
    fn full_cycle_records_every_transition() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();
        let tower = TowerId::new(7);

        combat.handle(MatchStatus::InProgress, &cooldowns(&[(7, 0)]), &[], &mut out);
        combat.handle(
            MatchStatus::InProgress,
            &cooldowns(&[(7, 0)]),
            &[target(7, 1)],
            &mut out,
        );
        combat.handle(
            MatchStatus::InProgress,
            &cooldowns(&[(7, 1000)]),
            &[target(7, 1)],
            &mut out,
        );

        assert_eq!(
            combat.changes(),
            &[PhaseChange {
                tower,
                from: Some(FiringPhase::Fire),
                to: FiringPhase::Idle,
            }]
        );
        assert_eq!(out, vec![fire(7, 1)]);
    }

    #[test]
    fn finished_match_forgets_towers_and_stays_silent() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();
        let ready = cooldowns(&[(1, 0)]);

        combat.handle(MatchStatus::InProgress, &ready, &[], &mut out);
        combat.handle(MatchStatus::Won, &ready, &[target(1, 7)], &mut out);

        assert!(out.is_empty());
        assert_eq!(combat.phase(TowerId::new(1)), None);
        assert!(combat.changes().is_empty());
    }
}
