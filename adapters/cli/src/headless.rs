//! Backend that presents frames to the log instead of a window.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};
use village_defence_rendering::{FrameControl, Presentation, RenderingBackend, Scene};

/// Drives the update closure at a fixed frame pacing without sleeping.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeadlessBackend {
    frame: Duration,
    report_every: u64,
}

impl HeadlessBackend {
    /// Creates a backend stepping `fps` frames per simulated second.
    pub(crate) fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            frame: Duration::from_secs(1) / fps,
            report_every: u64::from(fps),
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl + 'static,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        info!(
            title = %window_title,
            width = scene.tile_grid.width(),
            height = scene.tile_grid.height(),
            tiles = scene.tiles.len(),
            "headless presentation started"
        );

        let mut frames: u64 = 0;
        loop {
            let control = update_scene(self.frame, &mut scene);
            frames += 1;
            if frames % self.report_every == 0 {
                debug!(
                    frame = frames,
                    enemies = scene.enemies.len(),
                    projectiles = scene.projectiles.len(),
                    pickups = scene.pickups.len(),
                    hud = %scene.hud.summary(),
                    "frame presented"
                );
            }
            if control == FrameControl::Exit {
                break;
            }
        }

        info!(frames, hud = %scene.hud.summary(), "headless presentation finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_defence_core::MatchStatus;
    use village_defence_rendering::{Color, Hud, TileGridPresentation};

    #[test]
    fn runs_until_the_closure_exits() {
        let grid = TileGridPresentation::new(1, 1, 48.0, Color::from_rgb_u8(0, 0, 0))
            .expect("valid grid");
        let hud = Hud {
            coins: 0,
            base_health: 10.0,
            wave: 1,
            wave_count: 1,
            status: MatchStatus::InProgress,
        };
        let scene = Scene::new(grid, Vec::new(), hud);
        let presentation = Presentation::new("test", Color::new(0.0, 0.0, 0.0, 1.0), scene);
        let mut calls = 0;

        HeadlessBackend::new(50)
            .run(presentation, move |dt, scene| {
                assert_eq!(dt, Duration::from_millis(20));
                calls += 1;
                scene.hud.coins = calls;
                if calls == 3 {
                    FrameControl::Exit
                } else {
                    FrameControl::Continue
                }
            })
            .expect("headless run succeeds");
    }

    #[test]
    fn zero_fps_is_clamped_to_one() {
        assert_eq!(HeadlessBackend::new(0).frame, Duration::from_secs(1));
    }
}
