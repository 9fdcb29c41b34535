use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use image::ImageReader;
use thiserror::Error;
use tracing::{info, warn};

/// Decoded RGBA8 image, row-major, 4 bytes per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sprite")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Sprite {
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coordinates are clamped to the image edge.
    pub fn rgba_at(&self, x: u32, y: u32) -> [u8; 4] {
        if self.is_empty() {
            return [0, 0, 0, 0];
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let offset = (y * self.width as usize + x) * 4;
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open asset '{key}' at {path}: {source}")]
    Open {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode asset '{key}' at {path}: {source}")]
    Decode {
        key: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("asset '{key}' did not load within {waited_ms} ms")]
    Timeout { key: String, waited_ms: u64 },
    #[error("loader for asset '{key}' exited without delivering a result")]
    LoaderDisconnected { key: String },
    #[error("failed to spawn loader thread for asset '{key}': {source}")]
    SpawnLoader {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Ready,
    Failed,
    TimedOut,
}

impl AssetStatus {
    pub fn is_settled(self) -> bool {
        !matches!(self, AssetStatus::Pending)
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetStatus::Pending => "loading",
            AssetStatus::Ready => "ready",
            AssetStatus::Failed => "failed",
            AssetStatus::TimedOut => "timed out",
        }
    }
}

enum HandleState<T> {
    Pending(Receiver<Result<T, AssetError>>),
    Ready(T),
    Failed(AssetError),
}

/// One asset being produced off-thread. Settles exactly once; polling never
/// blocks.
pub struct AssetHandle<T> {
    key: String,
    state: HandleState<T>,
    requested_at: Instant,
    timeout: Option<Duration>,
}

impl<T> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("key", &self.key)
            .field("status", &self.status())
            .finish()
    }
}

impl<T> AssetHandle<T> {
    /// A handle fed by whoever holds the returned sender.
    pub fn pending(
        key: impl Into<String>,
        timeout: Option<Duration>,
        requested_at: Instant,
    ) -> (Sender<Result<T, AssetError>>, Self) {
        let (sender, receiver) = mpsc::channel();
        let handle = Self {
            key: key.into(),
            state: HandleState::Pending(receiver),
            requested_at,
            timeout,
        };
        (sender, handle)
    }

    pub fn resolved(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            state: HandleState::Ready(value),
            requested_at: Instant::now(),
            timeout: None,
        }
    }

    pub fn failed(key: impl Into<String>, error: AssetError) -> Self {
        Self {
            key: key.into(),
            state: HandleState::Failed(error),
            requested_at: Instant::now(),
            timeout: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> AssetStatus {
        match &self.state {
            HandleState::Pending(_) => AssetStatus::Pending,
            HandleState::Ready(_) => AssetStatus::Ready,
            HandleState::Failed(AssetError::Timeout { .. }) => AssetStatus::TimedOut,
            HandleState::Failed(_) => AssetStatus::Failed,
        }
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            HandleState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AssetError> {
        match &self.state {
            HandleState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn poll(&mut self, now: Instant) -> AssetStatus {
        let HandleState::Pending(receiver) = &self.state else {
            return self.status();
        };

        let next = match receiver.try_recv() {
            Ok(Ok(value)) => Some(HandleState::Ready(value)),
            Ok(Err(error)) => Some(HandleState::Failed(error)),
            Err(TryRecvError::Disconnected) => {
                Some(HandleState::Failed(AssetError::LoaderDisconnected {
                    key: self.key.clone(),
                }))
            }
            Err(TryRecvError::Empty) => {
                let waited = now.saturating_duration_since(self.requested_at);
                match self.timeout {
                    Some(limit) if waited >= limit => {
                        Some(HandleState::Failed(AssetError::Timeout {
                            key: self.key.clone(),
                            waited_ms: waited.as_millis() as u64,
                        }))
                    }
                    _ => None,
                }
            }
        };

        if let Some(next) = next {
            self.state = next;
            match &self.state {
                HandleState::Ready(_) => info!(asset = %self.key, "asset_ready"),
                HandleState::Failed(error) => warn!(asset = %self.key, error = %error, "asset_failed"),
                HandleState::Pending(_) => {}
            }
        }
        self.status()
    }
}

/// Ordered group of handles that is ready only when every member is.
#[derive(Debug)]
pub struct AssetBatch<T> {
    handles: Vec<AssetHandle<T>>,
}

impl<T> AssetBatch<T> {
    pub fn new(handles: Vec<AssetHandle<T>>) -> Self {
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn poll(&mut self, now: Instant) -> AssetStatus {
        for handle in &mut self.handles {
            handle.poll(now);
        }
        self.status()
    }

    /// The first settled failure in batch order wins; otherwise ready once
    /// nothing is pending. An empty batch is never ready.
    pub fn status(&self) -> AssetStatus {
        if self.handles.is_empty() {
            return AssetStatus::Pending;
        }
        let mut any_pending = false;
        for handle in &self.handles {
            match handle.status() {
                AssetStatus::Ready => {}
                AssetStatus::Pending => any_pending = true,
                failed => return failed,
            }
        }
        if any_pending {
            AssetStatus::Pending
        } else {
            AssetStatus::Ready
        }
    }

    /// Member access, gated on the whole batch being ready.
    pub fn get(&self, index: usize) -> Option<&T> {
        if self.status() != AssetStatus::Ready {
            return None;
        }
        self.handles.get(index).and_then(AssetHandle::get)
    }

    pub fn key(&self, index: usize) -> Option<&str> {
        self.handles.get(index).map(AssetHandle::key)
    }
}

/// Spawns one named decoder thread per requested image.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetLoader {
    timeout: Option<Duration>,
}

impl AssetLoader {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn load_image(&self, key: &str, path: PathBuf) -> AssetHandle<Sprite> {
        let (sender, handle) = AssetHandle::pending(key, self.timeout, Instant::now());
        let thread_key = key.to_string();
        let spawned = thread::Builder::new()
            .name(format!("asset-loader:{key}"))
            .spawn(move || {
                let result = decode_sprite(&thread_key, &path);
                // The handle may already have timed out and been dropped.
                let _ = sender.send(result);
            });
        match spawned {
            Ok(_) => {
                info!(asset = key, "asset_requested");
                handle
            }
            Err(source) => {
                let error = AssetError::SpawnLoader {
                    key: key.to_string(),
                    source,
                };
                warn!(asset = key, error = %error, "asset_failed");
                AssetHandle::failed(key, error)
            }
        }
    }

    pub fn load_images<I>(&self, entries: I) -> AssetBatch<Sprite>
    where
        I: IntoIterator<Item = (String, PathBuf)>,
    {
        AssetBatch::new(
            entries
                .into_iter()
                .map(|(key, path)| self.load_image(&key, path))
                .collect(),
        )
    }
}

fn decode_sprite(key: &str, path: &Path) -> Result<Sprite, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(Sprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
