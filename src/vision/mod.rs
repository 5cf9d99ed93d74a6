//! Multi-camera perception: frames, calibration, reply parsing, triangulation
//! and the camera query fan-out.
//!
//! # Pipeline
//!
//! ```text
//! prompt ─▶ locate_all (one task per camera, joined)
//!             │  LocateReply per camera
//!             ▼
//!          to_observations (parse_coords, failures → None)
//!             │  BTreeMap<CameraId, Option<PixelCoordinate>>
//!             ▼
//!          triangulate (first two valid cameras + CalibrationStore)
//!             │
//!             ▼
//!          Result<WorldPosition, TriangulationError>
//! ```

pub mod calibration;
pub mod coords;
pub mod fanout;
pub mod frame;
pub mod triangulate;

/// Zero-based camera identifier.
pub type CameraId = usize;

pub use calibration::{CalibrationRecord, CalibrationStore};
pub use coords::{parse_coords, CoordError, PixelCoordinate};
pub use fanout::{
    locate_all, locate_prompt, query_camera, to_observations, CameraQueryError, CameraSet,
    LocateReply,
};
pub use frame::{Frame, FrameError, FrameProvider, LatestFrames};
pub use triangulate::{triangulate, Observations, TriangulationError, WorldPosition};
