use racecar_engine::{resolve_app_paths, AppPaths, AssetKeyError, LoopConfig, Scene, StartupError};
use rand::Rng;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_config, ConfigError, RaceConfig};
use super::race::{AssetManifest, RaceScene, SimulationLoop, TrackCatalog};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid asset key: {0}")]
    AssetKey(#[from] AssetKeyError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Race Car Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets = %paths.assets_dir.display(),
        "startup_paths"
    );
    let config = load_config(&paths.root)?;
    let scene = build_scene(&config, &paths)?;

    Ok(AppWiring {
        config: config.loop_config(),
        scene: Box::new(scene),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn build_scene(config: &RaceConfig, paths: &AppPaths) -> Result<RaceScene, BootstrapError> {
    let manifest = asset_manifest(config, paths)?;
    let catalog = TrackCatalog::new(config.tracks.clone()).ok_or_else(|| ConfigError::Invalid {
        field: "tracks".to_string(),
        message: "at least one track is required".to_string(),
    })?;
    let initial_track = config
        .initial_track
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..catalog.len() as i64));

    let simulation = SimulationLoop::new(
        catalog,
        config.drive_tuning(),
        config.vehicle_geometry(),
        config.velocity,
        initial_track,
    );
    Ok(RaceScene::new(simulation, manifest))
}

fn asset_manifest(config: &RaceConfig, paths: &AppPaths) -> Result<AssetManifest, AssetKeyError> {
    let atlas = (config.atlas.clone(), paths.asset_path(&config.atlas)?);
    let skins = config
        .skins
        .iter()
        .map(|key| Ok((key.clone(), paths.sprite_path(key)?)))
        .collect::<Result<Vec<_>, AssetKeyError>>()?;
    Ok(AssetManifest { atlas, skins })
}
