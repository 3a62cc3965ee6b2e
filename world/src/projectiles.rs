//! Projectile motion and impact phases.

use std::time::Duration;

use glam::Vec2;
use village_defence_core::{
    Countdown, ProjectileId, ProjectileKind, ProjectilePhase, ProjectileSnapshot, TileGrid,
};

/// What happened to a projectile while advancing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProjectileStep {
    /// Still flying or still playing its aftermath.
    Active,
    /// Left the map before striking anything.
    LeftMap,
    /// Finished its post-impact phase.
    Finished,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) kind: ProjectileKind,
    pub(crate) position: Vec2,
    velocity: Vec2,
    pub(crate) damage: f32,
    /// Area radius in world units; `None` means single target.
    pub(crate) damage_radius: Option<f32>,
    pub(crate) collidable: bool,
    pub(crate) valid: bool,
    phase: ProjectilePhase,
    aftermath: Countdown,
}

impl Projectile {
    pub(crate) fn launch(
        id: ProjectileId,
        kind: ProjectileKind,
        position: Vec2,
        velocity: Vec2,
        damage: f32,
        tile_size: f32,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            velocity,
            damage,
            damage_radius: kind.damage_radius_tiles().map(|radius| radius * tile_size),
            collidable: true,
            valid: true,
            phase: ProjectilePhase::Flight,
            aftermath: Countdown::one_shot(kind.aftermath().unwrap_or(Duration::ZERO)),
        }
    }

    /// Moves the projectile or plays its aftermath.
    pub(crate) fn advance(&mut self, dt: Duration, grid: &TileGrid) -> ProjectileStep {
        if !self.valid {
            return ProjectileStep::Active;
        }

        match self.phase {
            ProjectilePhase::Flight => {
                self.position += self.velocity * dt.as_secs_f32();
                if !grid.contains_point(self.position) {
                    self.valid = false;
                    self.collidable = false;
                    return ProjectileStep::LeftMap;
                }
                ProjectileStep::Active
            }
            ProjectilePhase::Aftermath => {
                if self.aftermath.on_update(dt) {
                    self.valid = false;
                    return ProjectileStep::Finished;
                }
                ProjectileStep::Active
            }
        }
    }

    /// Stops the projectile after it struck an enemy.
    pub(crate) fn on_collide(&mut self) {
        self.collidable = false;
        self.velocity = Vec2::ZERO;
        if self.kind.aftermath().is_some() {
            self.phase = ProjectilePhase::Aftermath;
            self.aftermath.restart();
        } else {
            self.valid = false;
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        let rotation_degrees = self
            .kind
            .rotates()
            .then(|| self.velocity.y.atan2(self.velocity.x).to_degrees());
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            velocity: self.velocity,
            rotation_degrees,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::new(4, 4, 48.0)
    }

    fn launch(kind: ProjectileKind, velocity: Vec2) -> Projectile {
        Projectile::launch(
            ProjectileId::new(0),
            kind,
            Vec2::new(96.0, 96.0),
            velocity,
            25.0,
            48.0,
        )
    }

    #[test]
    fn leaving_the_map_invalidates_in_flight_projectiles() {
        let mut arrow = launch(ProjectileKind::Arrow, Vec2::new(288.0, 0.0));

        assert_eq!(arrow.advance(Duration::from_millis(250), &grid()), ProjectileStep::Active);
        assert_eq!(arrow.advance(Duration::from_millis(250), &grid()), ProjectileStep::LeftMap);
        assert!(!arrow.valid);
    }

    #[test]
    fn arrows_vanish_on_impact() {
        let mut arrow = launch(ProjectileKind::Arrow, Vec2::new(0.0, 288.0));
        arrow.on_collide();

        assert!(!arrow.collidable);
        assert!(!arrow.valid);
    }

    #[test]
    fn shells_play_an_aftermath_before_retiring() {
        let mut shell = launch(ProjectileKind::Shell, Vec2::new(288.0, 0.0));
        shell.on_collide();

        assert!(!shell.collidable);
        assert!(shell.valid);
        assert_eq!(shell.snapshot().phase, ProjectilePhase::Aftermath);
        assert_eq!(shell.advance(Duration::from_millis(300), &grid()), ProjectileStep::Active);
        assert_eq!(shell.position, Vec2::new(96.0, 96.0));
        assert_eq!(shell.advance(Duration::from_millis(200), &grid()), ProjectileStep::Finished);
        assert!(!shell.valid);
    }

    #[test]
    fn shells_cover_two_tiles() {
        let shell = launch(ProjectileKind::Shell, Vec2::ZERO);
        assert_eq!(shell.damage_radius, Some(96.0));
    }

    #[test]
    fn only_arrows_report_rotation() {
        let arrow = launch(ProjectileKind::Arrow, Vec2::new(0.0, 10.0));
        let axe = launch(ProjectileKind::Axe, Vec2::new(0.0, 10.0));

        let rotation = arrow.snapshot().rotation_degrees.expect("arrows rotate");
        assert!((rotation - 90.0).abs() < 1e-3);
        assert_eq!(axe.snapshot().rotation_degrees, None);
    }
}
