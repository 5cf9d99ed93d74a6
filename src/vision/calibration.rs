//! Static per-camera calibration used by the triangulation engine.
//!
//! Records are loaded once (from `settings.toml`, see
//! [`AppConfig`](crate::config::AppConfig)) and are read-only afterwards.
//! In TOML the store is an array of tables:
//!
//! ```toml
//! [[calibration]]
//! camera = 1
//! position = [0.5, 0.0, 0.0]
//! focal_length = 1000.0
//! cx = 320.0
//! cy = 240.0
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CameraId;

/// Focal length assumed when a record omits it (pixels).
pub const DEFAULT_FOCAL_LENGTH: f64 = 1000.0;
/// Principal point x assumed when a record omits it (pixels).
pub const DEFAULT_CX: f64 = 320.0;
/// Principal point y assumed when a record omits it (pixels).
pub const DEFAULT_CY: f64 = 240.0;

fn default_focal_length() -> f64 {
    DEFAULT_FOCAL_LENGTH
}

fn default_cx() -> f64 {
    DEFAULT_CX
}

fn default_cy() -> f64 {
    DEFAULT_CY
}

// ---------------------------------------------------------------------------
// CalibrationRecord
// ---------------------------------------------------------------------------

/// Intrinsics and position of one camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Camera this record describes.
    pub camera: CameraId,
    /// Camera origin in world space, meters.
    pub position: [f64; 3],
    /// Focal length in pixels.
    #[serde(default = "default_focal_length")]
    pub focal_length: f64,
    /// Principal point x in pixels.
    #[serde(default = "default_cx")]
    pub cx: f64,
    /// Principal point y in pixels.
    #[serde(default = "default_cy")]
    pub cy: f64,
}

impl CalibrationRecord {
    /// Record at `position` with the default intrinsics.
    pub fn at(camera: CameraId, position: [f64; 3]) -> Self {
        Self {
            camera,
            position,
            focal_length: DEFAULT_FOCAL_LENGTH,
            cx: DEFAULT_CX,
            cy: DEFAULT_CY,
        }
    }

    /// Euclidean distance between this camera's origin and `other`'s, meters.
    pub fn baseline_to(&self, other: &CalibrationRecord) -> f64 {
        self.position
            .iter()
            .zip(other.position.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

// ---------------------------------------------------------------------------
// CalibrationStore
// ---------------------------------------------------------------------------

/// Camera id → [`CalibrationRecord`], iterated in ascending id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CalibrationRecord>", into = "Vec<CalibrationRecord>")]
pub struct CalibrationStore {
    records: BTreeMap<CameraId, CalibrationRecord>,
}

impl CalibrationStore {
    /// Empty store.
    pub fn empty() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Builder-style insert; a later record for the same camera replaces the
    /// earlier one.
    pub fn with(mut self, record: CalibrationRecord) -> Self {
        self.records.insert(record.camera, record);
        self
    }

    pub fn get(&self, camera: CameraId) -> Option<&CalibrationRecord> {
        self.records.get(&camera)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalibrationRecord> {
        self.records.values()
    }
}

/// Two-camera rig: camera 0 at the origin, camera 1 half a meter along +X.
impl Default for CalibrationStore {
    fn default() -> Self {
        Self::empty()
            .with(CalibrationRecord::at(0, [0.0, 0.0, 0.0]))
            .with(CalibrationRecord::at(1, [0.5, 0.0, 0.0]))
    }
}

impl From<Vec<CalibrationRecord>> for CalibrationStore {
    fn from(records: Vec<CalibrationRecord>) -> Self {
        records.into_iter().fold(Self::empty(), Self::with)
    }
}

impl From<CalibrationStore> for Vec<CalibrationRecord> {
    fn from(store: CalibrationStore) -> Self {
        store.records.into_values().collect()
    }
}
