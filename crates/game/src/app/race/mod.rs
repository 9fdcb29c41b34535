mod camera;
mod render;
mod simulation;
mod skins;
mod track;
mod vehicle;

use std::path::PathBuf;

use racecar_engine::{AssetLoader, DrawSurface, FrameContext, Scene};
use tracing::info;

pub(crate) use render::VehicleGeometry;
pub(crate) use simulation::{Phase, SimulationLoop};
pub(crate) use skins::SkinCatalog;
pub(crate) use track::{default_tracks, TrackCatalog, TrackDefinition};
pub(crate) use vehicle::{DriveTuning, TurnScaling};

/// Files the scene requests once the host is up.
#[derive(Debug, Clone)]
pub(crate) struct AssetManifest {
    pub(crate) atlas: (String, PathBuf),
    pub(crate) skins: Vec<(String, PathBuf)>,
}

/// Adapts [`SimulationLoop`] to the engine's frame callback.
pub(crate) struct RaceScene {
    simulation: SimulationLoop,
    manifest: AssetManifest,
}

impl RaceScene {
    pub(crate) fn new(simulation: SimulationLoop, manifest: AssetManifest) -> Self {
        Self {
            simulation,
            manifest,
        }
    }

    #[cfg(test)]
    pub(crate) fn simulation(&self) -> &SimulationLoop {
        &self.simulation
    }
}

impl Scene for RaceScene {
    fn load(&mut self, loader: &AssetLoader) {
        let (atlas_key, atlas_path) = &self.manifest.atlas;
        let track_image = loader.load_image(atlas_key, atlas_path.clone());
        let skins = SkinCatalog::new(loader.load_images(self.manifest.skins.iter().cloned()));
        info!(
            atlas = %atlas_key,
            skin_count = self.manifest.skins.len(),
            "assets_requested"
        );
        self.simulation.attach_assets(track_image, skins);
    }

    fn frame(&mut self, context: FrameContext<'_>, surface: &mut dyn DrawSurface) {
        self.simulation.frame(
            context.timestamp_ms,
            context.now,
            context.input,
            context.viewport,
            surface,
        );
    }

    fn shutdown(&mut self) {
        let pose = self.simulation.vehicle().pose;
        info!(
            assets_settled = self.simulation.phase() == Phase::Running,
            track = self.simulation.selection().active_index,
            x = pose.x,
            y = pose.y,
            "race_shutdown"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use racecar_engine::{CommandRecorder, DrawCommand, InputState, Viewport};
    use tempfile::TempDir;

    fn write_png(path: &std::path::Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 200, 10, 255]))
            .save(path)
            .expect("write png");
    }

    #[test]
    fn scene_loads_real_files_and_reaches_running() {
        let temp = TempDir::new().expect("temp");
        let atlas_path = temp.path().join("track-maps.png");
        let skin_path = temp.path().join("red_car.png");
        write_png(&atlas_path, 16, 16);
        write_png(&skin_path, 4, 8);

        let catalog = TrackCatalog::new(default_tracks()).expect("tracks");
        let simulation = SimulationLoop::new(
            catalog,
            DriveTuning::default(),
            VehicleGeometry::default(),
            10.0,
            0,
        );
        let mut scene = RaceScene::new(
            simulation,
            AssetManifest {
                atlas: ("track-maps".to_string(), atlas_path),
                skins: vec![("red_car".to_string(), skin_path)],
            },
        );
        scene.load(&AssetLoader::new(Some(Duration::from_secs(5))));

        let viewport = Viewport {
            width: 320,
            height: 240,
        };
        let input = InputState::default();
        let mut recorder = CommandRecorder::new(viewport);
        for frame in 0..500 {
            recorder.take_commands();
            scene.frame(
                FrameContext {
                    timestamp_ms: frame as f64 * 16.0,
                    now: Instant::now(),
                    input: &input,
                    viewport,
                },
                &mut recorder,
            );
            if scene.simulation.phase() == Phase::Running {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }

        assert_eq!(scene.simulation.phase(), Phase::Running);
        assert!(recorder
            .commands()
            .iter()
            .any(|command| matches!(command, DrawCommand::BlitTransformed { image_size: (4, 8), .. })));
    }
}
