use racecar_engine::{PixelRect, Vec2};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::vehicle::{Pose, VehicleState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TrackDefinition {
    #[serde(default)]
    pub(crate) name: String,
    pub(crate) atlas_region: PixelRect,
    pub(crate) spawn: Pose,
    #[serde(default = "default_zoom")]
    pub(crate) zoom: f32,
}

fn default_zoom() -> f32 {
    1.0
}

/// The two tracks packed side by side in `track-maps.png`.
pub(crate) fn default_tracks() -> Vec<TrackDefinition> {
    vec![
        TrackDefinition {
            name: "oval".to_string(),
            atlas_region: PixelRect {
                x: 100,
                y: 0,
                width: 1150,
                height: 1600,
            },
            spawn: Pose::new(200.0, 200.0, 0.0),
            zoom: 1.0,
        },
        TrackDefinition {
            name: "circuit".to_string(),
            atlas_region: PixelRect {
                x: 1300,
                y: 0,
                width: 1400,
                height: 1600,
            },
            spawn: Pose::new(200.0, 200.0, 0.0),
            zoom: 1.0,
        },
    ]
}

/// Non-empty, immutable table of tracks.
#[derive(Debug, Clone)]
pub(crate) struct TrackCatalog {
    tracks: Vec<TrackDefinition>,
}

impl TrackCatalog {
    pub(crate) fn new(tracks: Vec<TrackDefinition>) -> Option<Self> {
        (!tracks.is_empty()).then_some(Self { tracks })
    }

    pub(crate) fn len(&self) -> usize {
        self.tracks.len()
    }

    /// `index mod len`, always in range, negatives included.
    pub(crate) fn wrap_index(&self, index: i64) -> usize {
        index.rem_euclid(self.tracks.len() as i64) as usize
    }

    pub(crate) fn get(&self, index: usize) -> Option<&TrackDefinition> {
        self.tracks.get(index)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TrackSelection {
    pub(crate) active_index: usize,
    pub(crate) camera_offset: Vec2,
}

impl TrackSelection {
    /// Activates `index mod len` and teleports the vehicle to that track's
    /// spawn pose. Never fails.
    pub(crate) fn select(
        &mut self,
        catalog: &TrackCatalog,
        vehicle: &mut VehicleState,
        index: i64,
    ) {
        self.active_index = catalog.wrap_index(index);
        if let Some(track) = catalog.get(self.active_index) {
            vehicle.reset_to(track.spawn);
            info!(
                requested = index,
                track = self.active_index,
                name = %track.name,
                spawn_x = track.spawn.x,
                spawn_y = track.spawn.y,
                "track_selected"
            );
        }
    }

    pub(crate) fn active<'a>(&self, catalog: &'a TrackCatalog) -> Option<&'a TrackDefinition> {
        catalog.get(self.active_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_track_catalog() -> TrackCatalog {
        let mut tracks = default_tracks();
        tracks[1].spawn = Pose::new(800.0, 1000.0, 0.0);
        TrackCatalog::new(tracks).expect("non-empty")
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(TrackCatalog::new(Vec::new()).is_none());
    }

    #[test]
    fn selection_wraps_any_index() {
        let catalog = two_track_catalog();
        let mut selection = TrackSelection::default();
        let mut vehicle = VehicleState::new(Pose::default(), 10.0);
        for (requested, expected) in [(0, 0), (1, 1), (2, 0), (7, 1), (-1, 1), (-4, 0)] {
            selection.select(&catalog, &mut vehicle, requested);
            assert_eq!(selection.active_index, expected, "index {requested}");
        }
        assert_eq!(catalog.wrap_index(i64::MIN), 0);
        assert_eq!(catalog.wrap_index(i64::MAX), 1);
    }

    #[test]
    fn selecting_track_one_teleports_to_its_spawn() {
        let catalog = two_track_catalog();
        let mut selection = TrackSelection::default();
        let mut vehicle = VehicleState::new(Pose::new(-12.0, 55.5, 9.4), 10.0);

        selection.select(&catalog, &mut vehicle, 1);

        assert_eq!(vehicle.pose, Pose::new(800.0, 1000.0, 0.0));
        assert_eq!(
            selection.active(&catalog).map(|track| track.name.as_str()),
            Some("circuit")
        );
    }

    #[test]
    fn default_tracks_slice_the_atlas() {
        let tracks = default_tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].atlas_region.x + tracks[0].atlas_region.width, 1250);
        assert_eq!(tracks[1].atlas_region.x + tracks[1].atlas_region.width, 2700);
    }

    #[test]
    fn track_json_defaults_zoom() {
        let track: TrackDefinition = serde_json::from_str(
            r#"{"atlas_region":{"x":0,"y":0,"width":10,"height":20},
                "spawn":{"x":1.0,"y":2.0,"heading":0.0}}"#,
        )
        .expect("parse");
        assert_eq!(track.zoom, 1.0);
        assert!(track.name.is_empty());
    }
}
