use std::time::Instant;

use racecar_engine::{
    AssetHandle, AssetStatus, Clock, DrawSurface, InputState, Sprite, Viewport,
};
use tracing::info;

use super::camera::compute_offset;
use super::render::{asset_status_line, draw_frame, FrameView, VehicleGeometry};
use super::skins::SkinCatalog;
use super::track::{TrackCatalog, TrackSelection};
use super::vehicle::{DriveTuning, Pose, VehicleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// At least one asset group is still in flight.
    Loading,
    /// Every asset group has settled, successfully or not.
    Running,
}

/// Owns all per-frame state and runs clock, input, vehicle, camera and draw
/// in that order on each call to [`SimulationLoop::frame`].
#[derive(Debug)]
pub(crate) struct SimulationLoop {
    clock: Clock,
    vehicle: VehicleState,
    tuning: DriveTuning,
    geometry: VehicleGeometry,
    catalog: TrackCatalog,
    selection: TrackSelection,
    track_image: Option<AssetHandle<Sprite>>,
    skins: SkinCatalog,
    phase: Phase,
}

impl SimulationLoop {
    pub(crate) fn new(
        catalog: TrackCatalog,
        tuning: DriveTuning,
        geometry: VehicleGeometry,
        velocity: f32,
        initial_track: i64,
    ) -> Self {
        let mut simulation = Self {
            clock: Clock::default(),
            vehicle: VehicleState::new(Pose::default(), velocity),
            tuning,
            geometry,
            catalog,
            selection: TrackSelection::default(),
            track_image: None,
            skins: SkinCatalog::default(),
            phase: Phase::Loading,
        };
        simulation.select_track(initial_track);
        simulation
    }

    pub(crate) fn attach_assets(&mut self, track_image: AssetHandle<Sprite>, skins: SkinCatalog) {
        self.track_image = Some(track_image);
        self.skins = skins;
    }

    pub(crate) fn select_track(&mut self, index: i64) {
        self.selection.select(&self.catalog, &mut self.vehicle, index);
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub(crate) fn selection(&self) -> &TrackSelection {
        &self.selection
    }

    fn track_status(&self) -> AssetStatus {
        self.track_image
            .as_ref()
            .map_or(AssetStatus::Pending, AssetHandle::status)
    }

    pub(crate) fn frame(
        &mut self,
        timestamp_ms: f64,
        now: Instant,
        input: &InputState,
        viewport: Viewport,
        surface: &mut dyn DrawSurface,
    ) {
        if let Some(track_image) = self.track_image.as_mut() {
            track_image.poll(now);
        }
        self.skins.poll(now);

        let timing = self.clock.tick(timestamp_ms);

        self.vehicle.update(input, &self.tuning, timing.delta_ms);
        self.update_skin_selection(input.select_counter());
        self.selection.camera_offset = compute_offset(&self.vehicle.pose, viewport);

        let track = self
            .track_image
            .as_ref()
            .and_then(AssetHandle::get)
            .zip(self.selection.active(&self.catalog));
        let vehicle = self
            .vehicle
            .selected_skin
            .and_then(|index| self.skins.get(index))
            .map(|skin| (skin, self.vehicle.pose.heading));
        let view = FrameView {
            camera_offset: self.selection.camera_offset,
            track,
            vehicle,
            geometry: self.geometry,
            fps: timing.instantaneous_fps,
            signals: input.active_labels(),
            status_line: asset_status_line(self.track_status(), self.skins.status()),
        };
        draw_frame(surface, &view);

        self.update_phase();
    }

    fn update_skin_selection(&mut self, select_counter: u64) {
        let selected = self.skins.select(select_counter);
        if selected != self.vehicle.selected_skin {
            self.vehicle.selected_skin = selected;
            if let Some(index) = selected {
                info!(
                    skin = index,
                    key = self.skins.key(index).unwrap_or_default(),
                    select_counter,
                    "skin_selected"
                );
            }
        }
    }

    fn update_phase(&mut self) {
        if self.phase == Phase::Running {
            return;
        }
        let track = self.track_status();
        let skins = self.skins.status();
        if track.is_settled() && skins.is_settled() {
            self.phase = Phase::Running;
            info!(
                track = track.label(),
                skins = skins.label(),
                "simulation_running"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::race::track::default_tracks;
    use racecar_engine::{
        AssetBatch, AssetError, CommandRecorder, DrawCommand, InputSignal, Rect,
    };

    const VIEWPORT: Viewport = Viewport {
        width: 640,
        height: 480,
    };

    fn simulation(initial_track: i64) -> SimulationLoop {
        let mut tracks = default_tracks();
        tracks[1].spawn = Pose::new(800.0, 1000.0, 0.0);
        let catalog = TrackCatalog::new(tracks).expect("tracks");
        SimulationLoop::new(
            catalog,
            DriveTuning::default(),
            VehicleGeometry::default(),
            10.0,
            initial_track,
        )
    }

    fn ready_skins(count: usize) -> SkinCatalog {
        SkinCatalog::new(AssetBatch::new(
            (0..count)
                .map(|index| {
                    AssetHandle::resolved(format!("car_{index}"), Sprite::solid(4, 8, [0; 4]))
                })
                .collect(),
        ))
    }

    fn ready_atlas() -> AssetHandle<Sprite> {
        AssetHandle::resolved("track-maps", Sprite::solid(8, 8, [0, 128, 0, 255]))
    }

    fn run_frame(
        simulation: &mut SimulationLoop,
        timestamp_ms: f64,
        input: &InputState,
    ) -> Vec<DrawCommand> {
        let mut recorder = CommandRecorder::new(VIEWPORT);
        simulation.frame(timestamp_ms, Instant::now(), input, VIEWPORT, &mut recorder);
        recorder.take_commands()
    }

    fn count_blits(commands: &[DrawCommand]) -> (usize, usize) {
        let regions = commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::BlitRegion { .. }))
            .count();
        let transformed = commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::BlitTransformed { .. }))
            .count();
        (regions, transformed)
    }

    #[test]
    fn initial_selection_spawns_on_track() {
        let simulation = simulation(3);
        assert_eq!(simulation.selection().active_index, 1);
        assert_eq!(simulation.vehicle().pose, Pose::new(800.0, 1000.0, 0.0));
    }

    #[test]
    fn reselecting_teleports_regardless_of_motion() {
        let mut simulation = simulation(1);
        let input = InputState::default()
            .with_signal(InputSignal::Accelerate)
            .with_signal(InputSignal::TurnLeft);
        for frame in 1..=5 {
            run_frame(&mut simulation, frame as f64 * 16.0, &input);
        }
        assert_ne!(simulation.vehicle().pose, Pose::new(800.0, 1000.0, 0.0));

        simulation.select_track(1);
        assert_eq!(simulation.vehicle().pose, Pose::new(800.0, 1000.0, 0.0));
    }

    #[test]
    fn clock_reports_fps_from_consecutive_frames() {
        let mut simulation = simulation(0);
        let input = InputState::default();
        run_frame(&mut simulation, 0.0, &input);
        let commands = run_frame(&mut simulation, 16.0, &input);

        assert!(commands
            .iter()
            .any(|command| matches!(command, DrawCommand::Text { text, .. } if text == "FPS: 62")));
    }

    #[test]
    fn loading_frames_draw_neither_track_nor_vehicle() {
        let mut simulation = simulation(0);
        let commands = run_frame(&mut simulation, 16.0, &InputState::default());

        assert_eq!(count_blits(&commands), (0, 0));
        assert_eq!(simulation.phase(), Phase::Loading);
        assert_eq!(
            commands[0],
            DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 640.0, 480.0),
                color: crate::app::race::render::BACKGROUND_COLOR,
            }
        );
    }

    #[test]
    fn track_draws_before_skins_finish_loading() {
        let mut simulation = simulation(0);
        let (_sender, pending) = AssetHandle::<Sprite>::pending("blue_car", None, Instant::now());
        simulation.attach_assets(ready_atlas(), SkinCatalog::new(AssetBatch::new(vec![pending])));

        let commands = run_frame(&mut simulation, 16.0, &InputState::default());
        assert_eq!(count_blits(&commands), (1, 0));
        assert_eq!(simulation.phase(), Phase::Loading);
    }

    #[test]
    fn ready_assets_enter_running_and_draw_everything() {
        let mut simulation = simulation(0);
        simulation.attach_assets(ready_atlas(), ready_skins(3));

        let commands = run_frame(&mut simulation, 16.0, &InputState::default());
        assert_eq!(count_blits(&commands), (1, 1));
        assert_eq!(simulation.phase(), Phase::Running);
        assert_eq!(simulation.vehicle().selected_skin, Some(0));
    }

    #[test]
    fn select_counter_cycles_skins() {
        let mut simulation = simulation(0);
        simulation.attach_assets(ready_atlas(), ready_skins(3));
        let mut input = InputState::default();
        let mut picks = Vec::new();
        for frame in 0..4 {
            run_frame(&mut simulation, frame as f64 * 16.0, &input);
            picks.push(simulation.vehicle().selected_skin);
            input.notify_select();
        }
        assert_eq!(picks, vec![Some(0), Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn timed_out_track_runs_without_track_and_reports_it() {
        let mut simulation = simulation(0);
        let failed = AssetHandle::failed(
            "track-maps",
            AssetError::Timeout {
                key: "track-maps".to_string(),
                waited_ms: 10_000,
            },
        );
        simulation.attach_assets(failed, ready_skins(1));

        let commands = run_frame(&mut simulation, 16.0, &InputState::default());
        assert_eq!(count_blits(&commands), (0, 1));
        assert_eq!(simulation.phase(), Phase::Running);
        assert!(commands.iter().any(
            |command| matches!(command, DrawCommand::Text { text, .. } if text == "TRACK: TIMED OUT")
        ));
    }

    #[test]
    fn camera_tracks_vehicle_every_frame() {
        let mut simulation = simulation(0);
        let input = InputState::default().with_signal(InputSignal::Accelerate);
        run_frame(&mut simulation, 16.0, &input);

        let pose = simulation.vehicle().pose;
        let offset = simulation.selection().camera_offset;
        assert_eq!(pose.x - offset.x, 320.0);
        assert_eq!(pose.y - offset.y, 240.0);
        assert_eq!(pose.x, 210.0);
    }

    #[test]
    fn held_signals_show_in_overlay() {
        let mut simulation = simulation(0);
        let input = InputState::default()
            .with_signal(InputSignal::TurnRight)
            .with_signal(InputSignal::Accelerate);
        let commands = run_frame(&mut simulation, 16.0, &input);
        assert!(commands
            .iter()
            .any(|command| matches!(command, DrawCommand::Text { text, .. } if text == "Up, Right")));
    }
}
