//! Enemy state, status effects and the movement controller.

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use village_defence_core::{
    Countdown, EnemyId, EnemyKind, EnemySnapshot, EnemyTemplate, SlowEffect,
};

use crate::navigation::Route;

const FLASH_DURATION: Duration = Duration::from_millis(75);
const ARRIVAL_EPSILON: f32 = 1e-3;

/// Heal pulse emitted by a recovery cast, resolved after every enemy moved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RecoveryCast {
    pub(crate) caster: EnemyId,
    pub(crate) center: Vec2,
    pub(crate) radius: f32,
    pub(crate) intensity: f32,
}

#[derive(Clone, Copy, Debug)]
struct RecoverySkill {
    countdown: Countdown,
    radius: f32,
    intensity: f32,
}

/// Live enemy walking a shared route.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    velocity: Vec2,
    direction: Vec2,
    hp: f32,
    max_hp: f32,
    speed: f32,
    max_speed: f32,
    pub(crate) damage: f32,
    pub(crate) reward_ratio: f32,
    route: Arc<Route>,
    waypoint: usize,
    pub(crate) valid: bool,
    flash: Countdown,
    flashing: bool,
    slow: Countdown,
    slowed: bool,
    recovery: Option<RecoverySkill>,
}

impl Enemy {
    /// Places a new enemy on the first waypoint of `route`.
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        template: &EnemyTemplate,
        route: Arc<Route>,
        tile_size: f32,
    ) -> Self {
        let position = route.points().first().copied().unwrap_or(Vec2::ZERO);
        let max_hp = template.hp.max(0.0);
        let max_speed = template.speed.max(0.0);
        let recovery = template.recovery().map(|recovery| RecoverySkill {
            countdown: Countdown::repeating(recovery.interval),
            radius: recovery.range * tile_size,
            intensity: recovery.intensity,
        });

        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            direction: Vec2::ZERO,
            hp: max_hp,
            max_hp,
            speed: max_speed,
            max_speed,
            damage: template.damage,
            reward_ratio: template.reward_ratio,
            route,
            waypoint: 0,
            valid: true,
            flash: Countdown::one_shot(FLASH_DURATION),
            flashing: false,
            slow: Countdown::one_shot(Duration::ZERO),
            slowed: false,
            recovery,
        }
    }

    pub(crate) fn hp(&self) -> f32 {
        self.hp
    }

    /// Removes hit points and returns `true` when this call killed the enemy.
    pub(crate) fn decrease_health(&mut self, amount: f32) -> bool {
        if !self.valid {
            return false;
        }
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        self.flashing = true;
        self.flash.restart();
        if self.hp <= 0.0 {
            self.valid = false;
            return true;
        }
        false
    }

    /// Restores hit points up to the maximum.
    pub(crate) fn increase_health(&mut self, amount: f32) {
        self.hp = (self.hp + amount).clamp(0.0, self.max_hp);
    }

    /// Reduces the current speed for the effect's duration.
    pub(crate) fn slow_down(&mut self, effect: SlowEffect) {
        self.speed = (self.max_speed - effect.amount).max(0.0);
        self.slowed = true;
        self.slow.restart_with(effect.duration);
    }

    /// Fraction of the route completed.
    pub(crate) fn route_progress(&self) -> f32 {
        let len = self.route.len();
        if len <= 1 {
            return 1.0;
        }
        (self.waypoint as f32 / (len - 1) as f32).min(1.0)
    }

    /// Reports whether `point` lies inside the enemy's tile-sized bounding box.
    pub(crate) fn bounds_contain(&self, point: Vec2, tile_size: f32) -> bool {
        let half = tile_size / 2.0;
        let offset = (point - self.position).abs();
        offset.x <= half && offset.y <= half
    }

    /// Runs hit flash, slow and recovery countdowns.
    pub(crate) fn advance_effects(&mut self, dt: Duration) -> Option<RecoveryCast> {
        if self.flashing && self.flash.on_update(dt) {
            self.flashing = false;
        }
        if self.slowed && self.slow.on_update(dt) {
            self.speed = self.max_speed;
            self.slowed = false;
        }

        let skill = self.recovery.as_mut()?;
        if !skill.countdown.on_update(dt) {
            return None;
        }
        Some(RecoveryCast {
            caster: self.id,
            center: self.position,
            radius: skill.radius,
            intensity: skill.intensity,
        })
    }

    /// Moves toward the current waypoint without overshooting it.
    pub(crate) fn advance_movement(&mut self, dt: Duration, tile_size: f32) {
        let points = self.route.points();
        let Some(mut target) = points.get(self.waypoint).copied() else {
            self.velocity = Vec2::ZERO;
            return;
        };

        if self.position.distance(target) <= ARRIVAL_EPSILON {
            self.position = target;
            self.waypoint += 1;
            match points.get(self.waypoint) {
                Some(next) => {
                    target = *next;
                    self.direction = (target - self.position).normalize_or_zero();
                }
                None => {
                    self.waypoint = points.len().saturating_sub(1);
                    self.direction = Vec2::ZERO;
                    self.velocity = Vec2::ZERO;
                    return;
                }
            }
        }

        self.velocity = self.direction * self.speed * tile_size;
        let remaining = self.position.distance(target);
        let step = (self.velocity.length() * dt.as_secs_f32()).min(remaining);
        self.position += self.direction * step;
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            velocity: self.velocity,
            hp: self.hp,
            max_hp: self.max_hp,
            progress: self.route_progress(),
            flashing: self.flashing,
            slowed: self.slowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_defence_core::{Direction, Tile, TileCoord, TileGrid, TileMap, TileMarker};

    fn straight_route(length: usize) -> Arc<Route> {
        let mut row = vec![
            Tile {
                direction: Some(Direction::East),
                ..Tile::default()
            };
            length
        ];
        if let Some(last) = row.last_mut() {
            *last = Tile {
                marker: TileMarker::Goal,
                ..Tile::default()
            };
        }
        let map = TileMap::from_rows(vec![row]);
        let grid = TileGrid::new(map.columns(), map.rows(), 48.0);
        Arc::new(Route::follow(&map, &grid, TileCoord::new(0, 0)))
    }

    fn slim(route: Arc<Route>) -> Enemy {
        Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Slim,
            &EnemyTemplate::stock(EnemyKind::Slim),
            route,
            48.0,
        )
    }

    #[test]
    fn health_stays_within_bounds() {
        let mut enemy = slim(straight_route(3));

        enemy.increase_health(500.0);
        assert_eq!(enemy.hp(), 100.0);
        assert!(!enemy.decrease_health(40.0));
        enemy.increase_health(-200.0);
        assert_eq!(enemy.hp(), 0.0);
    }

    #[test]
    fn killing_blow_reports_death_exactly_once() {
        let mut enemy = slim(straight_route(3));

        assert!(enemy.decrease_health(150.0));
        assert_eq!(enemy.hp(), 0.0);
        assert!(!enemy.valid);
        assert!(!enemy.decrease_health(10.0));
    }

    #[test]
    fn movement_never_overshoots_the_waypoint() {
        let mut enemy = slim(straight_route(3));

        enemy.advance_movement(Duration::from_secs(10), 48.0);

        assert_eq!(enemy.position, Vec2::new(72.0, 24.0));
        assert_eq!(enemy.velocity, Vec2::new(48.0, 0.0));
    }

    #[test]
    fn progress_advances_with_the_waypoint_cursor() {
        let mut enemy = slim(straight_route(3));
        assert_eq!(enemy.route_progress(), 0.0);

        enemy.advance_movement(Duration::from_secs(1), 48.0);
        assert_eq!(enemy.route_progress(), 0.5);

        enemy.advance_movement(Duration::from_secs(1), 48.0);
        assert_eq!(enemy.route_progress(), 1.0);
        assert_eq!(enemy.position, Vec2::new(120.0, 24.0));
    }

    #[test]
    fn single_waypoint_route_reports_full_progress() {
        let enemy = slim(straight_route(1));
        assert_eq!(enemy.route_progress(), 1.0);
    }

    #[test]
    fn slow_expires_and_restores_speed() {
        let mut enemy = slim(straight_route(4));
        enemy.slow_down(SlowEffect {
            amount: 0.5,
            duration: Duration::from_secs(1),
        });
        enemy.advance_movement(Duration::from_millis(500), 48.0);
        assert_eq!(enemy.velocity.x, 24.0);

        let _ = enemy.advance_effects(Duration::from_secs(1));
        enemy.advance_movement(Duration::from_millis(100), 48.0);
        assert_eq!(enemy.velocity.x, 48.0);
        assert!(!enemy.snapshot().slowed);
    }

    #[test]
    fn hit_flash_clears_after_its_duration() {
        let mut enemy = slim(straight_route(2));
        let _ = enemy.decrease_health(1.0);
        assert!(enemy.snapshot().flashing);

        let _ = enemy.advance_effects(Duration::from_millis(50));
        assert!(enemy.snapshot().flashing);
        let _ = enemy.advance_effects(Duration::from_millis(50));
        assert!(!enemy.snapshot().flashing);
    }

    #[test]
    fn recovery_casts_on_each_interval() {
        let mut enemy = Enemy::spawn(
            EnemyId::new(3),
            EnemyKind::KingSlim,
            &EnemyTemplate::stock(EnemyKind::KingSlim),
            straight_route(2),
            48.0,
        );

        assert!(enemy.advance_effects(Duration::from_secs(9)).is_none());
        let cast = enemy
            .advance_effects(Duration::from_secs(1))
            .expect("king slim recovers every ten seconds");

        assert_eq!(cast.caster, EnemyId::new(3));
        assert_eq!(cast.radius, 144.0);
        assert_eq!(cast.intensity, 25.0);
        assert!(enemy.advance_effects(Duration::from_secs(10)).is_some());
    }
}
