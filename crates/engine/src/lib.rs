use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod asset_keys;

pub use app::{
    run_app, AffineTransform, AppError, AssetBatch, AssetError, AssetHandle, AssetLoader,
    AssetStatus, Clock, CommandRecorder, DrawCommand, DrawSurface, FrameCanvas, FrameContext,
    FrameTiming, InputSignal, InputState, LoopConfig, PixelRect, Rect, Rgba, Scene, Sprite,
    TextStyle, Vec2, Viewport, GLYPH_ADVANCE_CELLS, LINE_ADVANCE_CELLS,
};
pub use asset_keys::{validate_asset_key, AssetKeyError};

pub const ROOT_ENV_VAR: &str = "RACECAR_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub sprites_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        let sprites_dir = assets_dir.join("sprites");
        Self {
            root,
            assets_dir,
            sprites_dir,
        }
    }

    pub fn sprite_path(&self, key: &str) -> Result<PathBuf, AssetKeyError> {
        validate_asset_key(key)?;
        Ok(self.sprites_dir.join(format!("{key}.png")))
    }

    pub fn asset_path(&self, key: &str) -> Result<PathBuf, AssetKeyError> {
        validate_asset_key(key)?;
        Ok(self.assets_dir.join(format!("{key}.png")))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{var} is not valid unicode")]
    NonUnicodeEnv { var: &'static str },
    #[error("{var}={path} does not contain an assets/ directory")]
    InvalidEnvRoot { var: &'static str, path: PathBuf },
    #[error("cannot locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error(
        "no directory with assets/ found above {searched:?}; set {var} to the game directory"
    )]
    RootNotFound {
        var: &'static str,
        searched: Vec<PathBuf>,
    },
}

/// Finds the game directory: `RACECAR_ROOT` if set, otherwise the nearest
/// ancestor of the executable, then of the working directory, holding an
/// `assets/` directory.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let root = canonical_or_raw(Path::new(&value));
            if has_assets_dir(&root) {
                Ok(root)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    var: ROOT_ENV_VAR,
                    path: root,
                })
            }
        }
        Err(env::VarError::NotUnicode(_)) => {
            Err(StartupError::NonUnicodeEnv { var: ROOT_ENV_VAR })
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let mut searched: Vec<PathBuf> =
                exe.parent().map(Path::to_path_buf).into_iter().collect();
            if let Ok(cwd) = env::current_dir() {
                searched.push(cwd);
            }
            find_root_above(&searched).ok_or(StartupError::RootNotFound {
                var: ROOT_ENV_VAR,
                searched,
            })
        }
    }
}

fn find_root_above(starts: &[PathBuf]) -> Option<PathBuf> {
    starts
        .iter()
        .flat_map(|start| start.ancestors())
        .find(|candidate| has_assets_dir(candidate))
        .map(canonical_or_raw)
}

fn has_assets_dir(path: &Path) -> bool {
    path.join("assets").is_dir()
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
