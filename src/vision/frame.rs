//! Camera frames and the provider the router pulls them from.
//!
//! Capture and display live outside this crate; whatever drives the cameras
//! pushes encoded images into [`LatestFrames`], and the router reads them
//! through the [`FrameProvider`] trait.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use thiserror::Error;

use super::CameraId;

// ---------------------------------------------------------------------------
// FrameError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("cannot read frame file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("frame file {0} is empty")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// An encoded image (JPEG/PNG bytes).  Cloning is an `Arc` clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    data: Arc<[u8]>,
    mime: &'static str,
}

impl Frame {
    pub fn new(data: impl Into<Arc<[u8]>>, mime: &'static str) -> Self {
        Self {
            data: data.into(),
            mime,
        }
    }

    pub fn jpeg(data: impl Into<Arc<[u8]>>) -> Self {
        Self::new(data, "image/jpeg")
    }

    /// Read an image file; the MIME type is taken from the extension
    /// (`png`, `webp`, anything else is treated as JPEG).
    pub fn from_file(path: &Path) -> Result<Self, FrameError> {
        let data = std::fs::read(path).map_err(|source| FrameError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if data.is_empty() {
            return Err(FrameError::Empty(path.display().to_string()));
        }
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        };
        Ok(Self::new(data, mime))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// `data:<mime>;base64,<payload>`, the form vision endpoints accept in
    /// an `image_url` content part.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            BASE64_STANDARD.encode(&self.data)
        )
    }
}

// ---------------------------------------------------------------------------
// FrameProvider
// ---------------------------------------------------------------------------

/// Source of the most recently captured frame per camera.
///
/// `None` means the camera has not produced a frame (capture failure).
pub trait FrameProvider: Send + Sync {
    fn get_frame(&self, camera: CameraId) -> Option<Frame>;
}

// ---------------------------------------------------------------------------
// LatestFrames
// ---------------------------------------------------------------------------

/// Thread-safe camera id → latest frame map.
///
/// The capture side calls [`update`](Self::update); the router only reads.
#[derive(Debug, Default)]
pub struct LatestFrames {
    frames: Mutex<HashMap<CameraId, Frame>>,
}

impl LatestFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest frame for `camera`.
    pub fn update(&self, camera: CameraId, frame: Frame) {
        self.lock().insert(camera, frame);
    }

    /// Forget the frame for `camera` (e.g. the device disconnected).
    pub fn clear(&self, camera: CameraId) {
        self.lock().remove(&camera);
    }

    /// Load `path` and store it as `camera`'s latest frame.
    pub fn load_file(&self, camera: CameraId, path: &Path) -> Result<(), FrameError> {
        let frame = Frame::from_file(path)?;
        self.update(camera, frame);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CameraId, Frame>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FrameProvider for LatestFrames {
    fn get_frame(&self, camera: CameraId) -> Option<Frame> {
        self.lock().get(&camera).cloned()
    }
}
