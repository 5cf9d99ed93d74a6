//! Two-view stereo triangulation.
//!
//! Depth comes from the similar-triangles disparity formula
//!
//! ```text
//! Z = f * baseline / |x1 - x2|
//! X = (x1 - cx) * Z / f
//! Y = (y1 - cy) * Z / f
//! ```
//!
//! where `f`, `cx`, `cy` are the *first* camera's intrinsics (both cameras
//! are assumed to share near-identical optics).  The result is expressed in
//! the first camera's frame, not in a rig-centred world frame.
//!
//! When more than two cameras report a position, only the first two by
//! ascending camera id are used.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::calibration::CalibrationStore;
use super::coords::PixelCoordinate;
use super::CameraId;

/// Disparities below this many pixels give meaningless depth.
pub const MIN_DISPARITY_PX: f64 = 1.0;

/// Per-camera observation; `None` marks a camera whose reply held no usable
/// coordinates.
pub type Observations = BTreeMap<CameraId, Option<PixelCoordinate>>;

/// Why no position could be computed.  The `Display` text is shown to the
/// user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriangulationError {
    #[error("Need two good camera views.")]
    InsufficientObservations,

    #[error("Disparity too small for reliable depth.")]
    DisparityTooSmall,

    #[error("No calibration for camera {0}.")]
    MissingCalibration(CameraId),
}

/// Estimated position in meters, each component rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: round2(x),
            y: round2(y),
            z: round2(z),
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Renders as `[-11.0, -2.0, 50.0]`.
impl fmt::Display for WorldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?}, {:?}]", self.x, self.y, self.z)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Triangulate from the first two valid observations.
pub fn triangulate(
    calibration: &CalibrationStore,
    observations: &Observations,
) -> Result<WorldPosition, TriangulationError> {
    let mut valid = observations
        .iter()
        .filter_map(|(id, obs)| obs.map(|p| (*id, p)));

    let (Some((id1, p1)), Some((id2, p2))) = (valid.next(), valid.next()) else {
        return Err(TriangulationError::InsufficientObservations);
    };

    let cam1 = calibration
        .get(id1)
        .ok_or(TriangulationError::MissingCalibration(id1))?;
    let cam2 = calibration
        .get(id2)
        .ok_or(TriangulationError::MissingCalibration(id2))?;

    let baseline = cam1.baseline_to(cam2);
    let f = cam1.focal_length;

    let disparity = (p1.x - p2.x).abs() as f64;
    if disparity < MIN_DISPARITY_PX {
        return Err(TriangulationError::DisparityTooSmall);
    }

    let z = f * baseline / disparity;
    let x = (p1.x as f64 - cam1.cx) * z / f;
    let y = (p1.y as f64 - cam1.cy) * z / f;

    log::debug!(
        "triangulate: cameras {id1},{id2} baseline={baseline:.3}m disparity={disparity}px"
    );

    Ok(WorldPosition::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::calibration::CalibrationRecord;

    fn obs(entries: &[(CameraId, Option<(i64, i64)>)]) -> Observations {
        entries
            .iter()
            .map(|(id, p)| (*id, p.map(PixelCoordinate::from)))
            .collect()
    }

    #[test]
    fn two_camera_rig_reference_case() {
        let calibration = CalibrationStore::default();
        let observations = obs(&[(0, Some((100, 200))), (1, Some((110, 200)))]);

        let pos = triangulate(&calibration, &observations).unwrap();
        assert_eq!(pos.to_array(), [-11.0, -2.0, 50.0]);
        assert_eq!(pos.to_string(), "[-11.0, -2.0, 50.0]");
    }

    #[test]
    fn zero_disparity_is_rejected() {
        let calibration = CalibrationStore::default();
        let observations = obs(&[(0, Some((150, 200))), (1, Some((150, 180)))]);

        let err = triangulate(&calibration, &observations).unwrap_err();
        assert_eq!(err, TriangulationError::DisparityTooSmall);
        assert_eq!(err.to_string(), "Disparity too small for reliable depth.");
    }

    #[test]
    fn one_valid_observation_is_insufficient() {
        let calibration = CalibrationStore::default();
        let observations = obs(&[(0, Some((100, 200))), (1, None)]);

        let err = triangulate(&calibration, &observations).unwrap_err();
        assert_eq!(err, TriangulationError::InsufficientObservations);
        assert_eq!(err.to_string(), "Need two good camera views.");
    }

    #[test]
    fn empty_observations_are_insufficient() {
        let calibration = CalibrationStore::default();
        assert_eq!(
            triangulate(&calibration, &Observations::new()),
            Err(TriangulationError::InsufficientObservations)
        );
    }

    #[test]
    fn absent_observations_are_skipped_before_pairing() {
        let calibration = CalibrationStore::default()
            .with(CalibrationRecord::at(2, [1.0, 0.0, 0.0]));
        // Camera 1 failed, so the pair is (0, 2) with a 1 m baseline.
        let observations = obs(&[
            (0, Some((100, 200))),
            (1, None),
            (2, Some((120, 200))),
        ]);

        let pos = triangulate(&calibration, &observations).unwrap();
        assert_eq!(pos.z, 50.0);
    }

    #[test]
    fn only_first_two_cameras_are_used() {
        let calibration = CalibrationStore::default()
            .with(CalibrationRecord::at(2, [5.0, 0.0, 0.0]));
        // Camera 2 would give a wildly different depth; it must be ignored.
        let observations = obs(&[
            (0, Some((100, 200))),
            (1, Some((110, 200))),
            (2, Some((101, 200))),
        ]);

        let pos = triangulate(&calibration, &observations).unwrap();
        assert_eq!(pos.to_array(), [-11.0, -2.0, 50.0]);
    }

    #[test]
    fn uses_first_camera_intrinsics() {
        let mut cam0 = CalibrationRecord::at(0, [0.0, 0.0, 0.0]);
        cam0.focal_length = 500.0;
        cam0.cx = 100.0;
        cam0.cy = 100.0;
        let calibration = CalibrationStore::empty()
            .with(cam0)
            .with(CalibrationRecord::at(1, [0.5, 0.0, 0.0]));
        let observations = obs(&[(0, Some((150, 50))), (1, Some((100, 50)))]);

        // Z = 500 * 0.5 / 50 = 5; X = 50 * 5 / 500 = 0.5; Y = -50 * 5 / 500 = -0.5
        let pos = triangulate(&calibration, &observations).unwrap();
        assert_eq!(pos.to_array(), [0.5, -0.5, 5.0]);
    }

    #[test]
    fn missing_calibration_is_reported() {
        let calibration = CalibrationStore::default();
        let observations = obs(&[(0, Some((100, 200))), (3, Some((110, 200)))]);

        assert_eq!(
            triangulate(&calibration, &observations),
            Err(TriangulationError::MissingCalibration(3))
        );
    }

    #[test]
    fn components_are_rounded_to_two_decimals() {
        let calibration = CalibrationStore::default();
        // Z = 1000 * 0.5 / 3 = 166.666...
        let observations = obs(&[(0, Some((321, 240))), (1, Some((324, 240)))]);

        let pos = triangulate(&calibration, &observations).unwrap();
        assert_eq!(pos.z, 166.67);
        assert_eq!(pos.x, 0.17);
        assert_eq!(pos.y, 0.0);
    }
}
