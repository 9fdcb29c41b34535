use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use racecar_engine::{validate_asset_key, AssetKeyError, LoopConfig};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::race::{default_tracks, DriveTuning, TrackDefinition, TurnScaling, VehicleGeometry};

pub(crate) const CONFIG_ENV_VAR: &str = "RACECAR_CONFIG";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "racecar.json";

const DEFAULT_SKINS: [&str; 7] = [
    "blue_car",
    "green_car",
    "orange_car",
    "pink_car",
    "red_car",
    "white_car",
    "yellow_car",
];

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse config json{location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {field}: {message}")]
    Invalid { field: String, message: String },
    #[error("validation failed at {field}: {source}")]
    AssetKey {
        field: String,
        #[source]
        source: AssetKeyError,
    },
}

/// Tunables read from `racecar.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RaceConfig {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) velocity: f32,
    pub(crate) turn_step_degrees: f32,
    pub(crate) reverse_drag: f32,
    pub(crate) turn_scaling: TurnScaling,
    pub(crate) vehicle_size_percent: f32,
    pub(crate) rear_axle_from_center_px: f32,
    /// `null` waits forever.
    pub(crate) asset_load_timeout_ms: Option<u64>,
    /// `null` picks a random track at startup.
    pub(crate) initial_track: Option<i64>,
    pub(crate) atlas: String,
    pub(crate) skins: Vec<String>,
    pub(crate) tracks: Vec<TrackDefinition>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            window_title: "Race Car".to_string(),
            window_width: 1280,
            window_height: 720,
            velocity: 10.0,
            turn_step_degrees: 3.5,
            reverse_drag: 0.5,
            turn_scaling: TurnScaling::FrameCoupled,
            vehicle_size_percent: 100.0,
            rear_axle_from_center_px: 46.0,
            asset_load_timeout_ms: Some(10_000),
            initial_track: None,
            atlas: "track-maps".to_string(),
            skins: DEFAULT_SKINS.iter().map(ToString::to_string).collect(),
            tracks: default_tracks(),
        }
    }
}

impl RaceConfig {
    pub(crate) fn drive_tuning(&self) -> DriveTuning {
        DriveTuning {
            turn_step: self.turn_step_degrees.to_radians(),
            reverse_drag: self.reverse_drag,
            turn_scaling: self.turn_scaling,
        }
    }

    pub(crate) fn vehicle_geometry(&self) -> VehicleGeometry {
        VehicleGeometry {
            size_percent: self.vehicle_size_percent,
            rear_axle_from_center_px: self.rear_axle_from_center_px,
        }
    }

    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
            asset_load_timeout: self.asset_load_timeout_ms.map(Duration::from_millis),
            ..LoopConfig::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_finite("velocity", self.velocity)?;
        require_finite("turn_step_degrees", self.turn_step_degrees)?;
        require_finite("reverse_drag", self.reverse_drag)?;
        require_positive("vehicle_size_percent", self.vehicle_size_percent)?;
        require_finite("rear_axle_from_center_px", self.rear_axle_from_center_px)?;
        if let TurnScaling::DeltaScaled { reference_frame_ms } = self.turn_scaling {
            require_positive("turn_scaling.delta_scaled.reference_frame_ms", reference_frame_ms)?;
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(invalid("window_width", "window size must be non-zero"));
        }

        validate_asset_key(&self.atlas).map_err(|source| ConfigError::AssetKey {
            field: "atlas".to_string(),
            source,
        })?;
        if self.skins.is_empty() {
            return Err(invalid("skins", "at least one skin is required"));
        }
        for (index, skin) in self.skins.iter().enumerate() {
            validate_asset_key(skin).map_err(|source| ConfigError::AssetKey {
                field: format!("skins[{index}]"),
                source,
            })?;
        }

        if self.tracks.is_empty() {
            return Err(invalid("tracks", "at least one track is required"));
        }
        for (index, track) in self.tracks.iter().enumerate() {
            let field = |name: &str| format!("tracks[{index}].{name}");
            if track.atlas_region.width == 0 || track.atlas_region.height == 0 {
                return Err(invalid(field("atlas_region"), "region must be non-empty"));
            }
            require_positive(&field("zoom"), track.zoom)?;
            require_finite(&field("spawn.x"), track.spawn.x)?;
            require_finite(&field("spawn.y"), track.spawn.y)?;
            require_finite(&field("spawn.heading"), track.spawn.heading)?;
        }
        Ok(())
    }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        message: message.into(),
    }
}

fn require_finite(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("expected finite number, got {value}")))
    }
}

fn require_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected positive number, got {value}")))
    }
}

pub(crate) fn parse_config_json(raw: &str) -> Result<RaceConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config = serde_path_to_error::deserialize::<_, RaceConfig>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            let location = if path.is_empty() || path == "." {
                String::new()
            } else {
                format!(" at {path}")
            };
            ConfigError::Parse {
                location,
                source: error.into_inner(),
            }
        },
    )?;
    config.validate()?;
    Ok(config)
}

/// `RACECAR_CONFIG` must name an existing file; the default location may be
/// absent, in which case built-in defaults apply.
pub(crate) fn load_config(root: &Path) -> Result<RaceConfig, ConfigError> {
    match env::var_os(CONFIG_ENV_VAR) {
        Some(explicit) => read_config_file(Path::new(&explicit)),
        None => {
            let path = root.join(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                read_config_file(&path)
            } else {
                info!(path = %path.display(), "config_defaults");
                Ok(RaceConfig::default())
            }
        }
    }
}

fn read_config_file(path: &Path) -> Result<RaceConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_json(&raw)?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}
