#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks a target for every tower from world snapshots.

use village_defence_core::{EnemySnapshot, EnemyView, MatchStatus, TowerTarget, TowerView};

/// Tower targeting system that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemySnapshot>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Every tower aims at the enemy within its range that has travelled
    /// furthest along its route. Ties go to the enemy encountered first in
    /// identifier order. The output buffer is cleared before populating it.
    pub fn handle(
        &mut self,
        status: MatchStatus,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if status.is_over() {
            return;
        }

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.enemy_workspace.clear();
        self.enemy_workspace.extend(enemies.iter().copied());

        for tower in towers.iter() {
            let mut best: Option<&EnemySnapshot> = None;
            let mut best_progress = -1.0_f32;

            for candidate in &self.enemy_workspace {
                if tower.position.distance(candidate.position) > tower.range {
                    continue;
                }
                if candidate.progress > best_progress {
                    best_progress = candidate.progress;
                    best = Some(candidate);
                }
            }

            if let Some(enemy) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: enemy.id,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use village_defence_core::{
        Direction, EnemyId, EnemyKind, TileCoord, TowerId, TowerKind, TowerLevel, TowerSnapshot,
        TowerStance,
    };

    const TILE: f32 = 48.0;

    fn tower(id: u32, position: Vec2, range_tiles: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Archer,
            tile: TileCoord::new(0, 0),
            position,
            level: TowerLevel::MIN,
            range: range_tiles * TILE,
            facing: Direction::South,
            stance: TowerStance::Idle,
        }
    }

    fn enemy(id: u32, position: Vec2, progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Slim,
            position,
            velocity: Vec2::ZERO,
            hp: 100.0,
            max_hp: 100.0,
            progress,
            flashing: false,
            slowed: false,
        }
    }

    fn run(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            MatchStatus::InProgress,
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn furthest_along_enemy_in_range_is_chosen() {
        let targets = run(
            vec![tower(1, Vec2::new(240.0, 240.0), 5.0)],
            vec![
                enemy(1, Vec2::new(200.0, 240.0), 0.2),
                enemy(2, Vec2::new(280.0, 240.0), 0.8),
            ],
        );

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].enemy, EnemyId::new(2));
        assert_eq!(targets[0].tower, TowerId::new(1));
    }

    #[test]
    fn enemies_beyond_range_are_ignored() {
        let targets = run(
            vec![tower(1, Vec2::ZERO, 5.0)],
            vec![
                enemy(1, Vec2::new(241.0, 0.0), 0.9),
                enemy(2, Vec2::new(240.0, 0.0), 0.1),
            ],
        );

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn equal_progress_prefers_first_identifier() {
        let targets = run(
            vec![tower(1, Vec2::ZERO, 5.0)],
            vec![
                enemy(7, Vec2::new(10.0, 0.0), 0.5),
                enemy(3, Vec2::new(100.0, 0.0), 0.5),
            ],
        );

        assert_eq!(targets[0].enemy, EnemyId::new(3));
    }

    #[test]
    fn towers_without_candidates_produce_no_target() {
        let targets = run(
            vec![
                tower(1, Vec2::ZERO, 1.0),
                tower(2, Vec2::new(500.0, 0.0), 1.0),
            ],
            vec![enemy(1, Vec2::new(510.0, 0.0), 0.0)],
        );

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].tower, TowerId::new(2));
    }

    #[test]
    fn finished_match_clears_output() {
        let mut system = TowerTargeting::new();
        let mut out = vec![TowerTarget {
            tower: TowerId::new(9),
            enemy: EnemyId::new(9),
        }];

        system.handle(
            MatchStatus::Lost,
            &TowerView::from_snapshots(vec![tower(1, Vec2::ZERO, 5.0)]),
            &EnemyView::from_snapshots(vec![enemy(1, Vec2::ZERO, 0.0)]),
            &mut out,
        );

        assert!(out.is_empty());
    }
}
