//! Camera query fan-out.
//!
//! * [`query_camera`]: one camera, one prompt (CAMERA intent).
//! * [`locate_all`]: every active camera in parallel (TRIANGULATE intent),
//!   joined before returning; results are keyed by camera id so their order
//!   never depends on which backend answered first.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;

use super::coords::parse_coords;
use super::frame::FrameProvider;
use super::triangulate::Observations;
use super::CameraId;
use crate::llm::{CameraCapability, CameraReply};

// ---------------------------------------------------------------------------
// CameraSet
// ---------------------------------------------------------------------------

struct CameraEntry {
    name: String,
    backend: Arc<dyn CameraCapability>,
}

/// Active cameras keyed by id, each with its display name.
#[derive(Default)]
pub struct CameraSet {
    cameras: BTreeMap<CameraId, CameraEntry>,
}

impl CameraSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the backend for camera `id`.
    pub fn insert(
        &mut self,
        id: CameraId,
        name: impl Into<String>,
        backend: Arc<dyn CameraCapability>,
    ) {
        self.cameras.insert(
            id,
            CameraEntry {
                name: name.into(),
                backend,
            },
        );
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        id: CameraId,
        name: impl Into<String>,
        backend: Arc<dyn CameraCapability>,
    ) -> Self {
        self.insert(id, name, backend);
        self
    }

    pub fn contains(&self, id: CameraId) -> bool {
        self.cameras.contains_key(&id)
    }

    /// Camera ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.cameras.keys().copied()
    }

    /// Id → display name, ascending by id.
    pub fn names(&self) -> BTreeMap<CameraId, String> {
        self.cameras
            .iter()
            .map(|(id, entry)| (*id, entry.name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    fn backend(&self, id: CameraId) -> Option<&Arc<dyn CameraCapability>> {
        self.cameras.get(&id).map(|entry| &entry.backend)
    }
}

impl fmt::Debug for CameraSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.cameras.iter().map(|(id, e)| (id, &e.name)))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Single-camera query
// ---------------------------------------------------------------------------

/// Why a single-camera query never reached the backend.  `Display` is the
/// user-visible bracketed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CameraQueryError {
    /// The addressed camera is not active.
    #[error("[Error: No camera available.]")]
    NoCamera,
    /// The camera is active but has no captured frame.
    #[error("[Error: Could not capture camera frame.]")]
    NoFrame,
}

/// Ask camera `id` about its latest frame.  The backend is not called when
/// the camera is inactive or has no frame.  A backend error comes back as
/// its displayable text.
pub async fn query_camera(
    cameras: &CameraSet,
    frames: &dyn FrameProvider,
    id: CameraId,
    prompt: &str,
) -> Result<String, CameraQueryError> {
    let backend = cameras.backend(id).ok_or(CameraQueryError::NoCamera)?;
    let frame = frames.get_frame(id).ok_or(CameraQueryError::NoFrame)?;

    log::debug!("fanout: querying camera {id}");
    Ok(backend.query(prompt, &frame).await.into_text())
}

// ---------------------------------------------------------------------------
// Parallel locate
// ---------------------------------------------------------------------------

/// Outcome of asking one camera to locate an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateReply {
    /// The backend's raw text.
    Reply(String),
    /// No frame was available; the backend was not called.
    NoFrame,
    /// The backend reported an error, or the query task died.
    Failed(String),
}

impl LocateReply {
    pub fn text(&self) -> Option<&str> {
        match self {
            LocateReply::Reply(text) => Some(text),
            _ => None,
        }
    }
}

/// Prompt sent to every camera when triangulating `object`.
pub fn locate_prompt(object: &str) -> String {
    format!("Locate the {object}. Give only x,y pixel coordinates.")
}

/// Query every camera in `cameras` concurrently and wait for all of them.
///
/// One camera failing, timing out inside its backend, or lacking a frame
/// does not affect the others.  The returned map has exactly one entry per
/// camera.
pub async fn locate_all(
    cameras: &CameraSet,
    frames: &dyn FrameProvider,
    object: &str,
) -> BTreeMap<CameraId, LocateReply> {
    let prompt: Arc<str> = Arc::from(locate_prompt(object));
    let mut results = BTreeMap::new();
    let mut join_set = JoinSet::new();

    for (id, entry) in &cameras.cameras {
        let id = *id;
        let Some(frame) = frames.get_frame(id) else {
            log::warn!("fanout: camera {id} has no frame, skipping");
            results.insert(id, LocateReply::NoFrame);
            continue;
        };

        let backend = Arc::clone(&entry.backend);
        let prompt = Arc::clone(&prompt);
        join_set.spawn(async move {
            let reply = backend.query(&prompt, &frame).await;
            (id, reply)
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((id, CameraReply::Answer(reply))) => {
                log::debug!("fanout: camera {id} replied {reply:?}");
                results.insert(id, LocateReply::Reply(reply));
            }
            Ok((id, CameraReply::Error(message))) => {
                log::warn!("fanout: camera {id} failed: {message}");
                results.insert(id, LocateReply::Failed(message));
            }
            Err(e) => log::warn!("fanout: camera query task failed: {e}"),
        }
    }

    // Tasks that died never reported their id; fill the gaps.
    for id in cameras.ids() {
        results
            .entry(id)
            .or_insert_with(|| LocateReply::Failed("camera query task failed".into()));
    }

    results
}

/// Parse each reply into a pixel coordinate; anything unparsable (or with no
/// reply at all) becomes an absent observation.
pub fn to_observations(replies: &BTreeMap<CameraId, LocateReply>) -> Observations {
    replies
        .iter()
        .map(|(id, reply)| {
            let coords = reply.text().and_then(|text| match parse_coords(text) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("fanout: camera {id} reply unusable ({e}): {text:?}");
                    None
                }
            });
            (*id, coords)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::vision::{Frame, LatestFrames, PixelCoordinate};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Replies with a fixed string after an optional delay, recording prompts.
    struct ScriptedCamera {
        reply: String,
        delay: Duration,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCamera {
        fn new(reply: &str) -> Arc<Self> {
            Self::slow(reply, Duration::ZERO)
        }

        fn slow(reply: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.into(),
                delay,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CameraCapability for ScriptedCamera {
        async fn query(&self, prompt: &str, _frame: &Frame) -> CameraReply {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            CameraReply::from(self.reply.clone())
        }
    }

    struct PanickingCamera;

    #[async_trait]
    impl CameraCapability for PanickingCamera {
        async fn query(&self, _prompt: &str, _frame: &Frame) -> CameraReply {
            panic!("backend blew up");
        }
    }

    /// Fails with an error message that itself contains two integers.
    struct OverloadedCamera;

    #[async_trait]
    impl CameraCapability for OverloadedCamera {
        async fn query(&self, _prompt: &str, _frame: &Frame) -> CameraReply {
            CameraReply::Error("[Camera 1] Error: endpoint returned 503: overloaded".into())
        }
    }

    fn frames_for(ids: &[CameraId]) -> LatestFrames {
        let frames = LatestFrames::new();
        for id in ids {
            frames.update(*id, Frame::jpeg(vec![*id as u8]));
        }
        frames
    }

    // -----------------------------------------------------------------------
    // query_camera
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn query_returns_backend_reply_verbatim() {
        let cam = ScriptedCamera::new("A cat on a mat.");
        let cameras = CameraSet::new().with(0, "camera 1", cam.clone());
        let frames = frames_for(&[0]);

        let reply = query_camera(&cameras, &frames, 0, "what do you see").await;
        assert_eq!(reply.as_deref(), Ok("A cat on a mat."));
        assert_eq!(cam.prompts.lock().unwrap()[0], "what do you see");
    }

    #[tokio::test]
    async fn query_unknown_camera_is_no_camera() {
        let cameras = CameraSet::new().with(0, "camera 1", ScriptedCamera::new("x"));
        let frames = frames_for(&[0, 1]);

        let err = query_camera(&cameras, &frames, 1, "see").await.unwrap_err();
        assert_eq!(err, CameraQueryError::NoCamera);
        assert_eq!(err.to_string(), "[Error: No camera available.]");
    }

    #[tokio::test]
    async fn query_without_frame_skips_backend() {
        let cam = ScriptedCamera::new("x");
        let cameras = CameraSet::new().with(0, "camera 1", cam.clone());
        let frames = LatestFrames::new();

        let err = query_camera(&cameras, &frames, 0, "see").await.unwrap_err();
        assert_eq!(err, CameraQueryError::NoFrame);
        assert_eq!(err.to_string(), "[Error: Could not capture camera frame.]");
        assert_eq!(cam.calls(), 0);
    }

    // -----------------------------------------------------------------------
    // locate_all
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn locate_queries_every_camera_with_locate_prompt() {
        let a = ScriptedCamera::new("100, 200");
        let b = ScriptedCamera::new("110,200");
        let cameras = CameraSet::new()
            .with(0, "camera 1", a.clone())
            .with(1, "camera 2", b.clone());
        let frames = frames_for(&[0, 1]);

        let replies = locate_all(&cameras, &frames, "red ball").await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[&0], LocateReply::Reply("100, 200".into()));
        assert_eq!(replies[&1], LocateReply::Reply("110,200".into()));
        assert_eq!(
            a.prompts.lock().unwrap()[0],
            "Locate the red ball. Give only x,y pixel coordinates."
        );
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn locate_keeps_id_order_regardless_of_finish_order() {
        let cameras = CameraSet::new()
            .with(0, "a", ScriptedCamera::slow("1,1", Duration::from_millis(60)))
            .with(1, "b", ScriptedCamera::slow("2,2", Duration::from_millis(5)))
            .with(2, "c", ScriptedCamera::slow("3,3", Duration::from_millis(30)));
        let frames = frames_for(&[0, 1, 2]);

        let replies = locate_all(&cameras, &frames, "cup").await;
        let ids: Vec<CameraId> = replies.keys().copied().collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn locate_runs_queries_concurrently() {
        let delay = Duration::from_millis(200);
        let cameras = CameraSet::new()
            .with(0, "a", ScriptedCamera::slow("1,1", delay))
            .with(1, "b", ScriptedCamera::slow("2,2", delay))
            .with(2, "c", ScriptedCamera::slow("3,3", delay));
        let frames = frames_for(&[0, 1, 2]);

        let started = std::time::Instant::now();
        let replies = locate_all(&cameras, &frames, "cup").await;

        assert_eq!(replies.len(), 3);
        // Sequential execution would take at least 600 ms.
        assert!(started.elapsed() < Duration::from_millis(550));
    }

    #[tokio::test]
    async fn locate_records_missing_frame_and_panicked_task() {
        let healthy = ScriptedCamera::new("5, 6");
        let no_frame = ScriptedCamera::new("7, 8");
        let cameras = CameraSet::new()
            .with(0, "a", healthy.clone())
            .with(1, "b", no_frame.clone())
            .with(2, "c", Arc::new(PanickingCamera));
        let frames = frames_for(&[0, 2]);

        let replies = locate_all(&cameras, &frames, "cup").await;

        assert_eq!(replies[&0], LocateReply::Reply("5, 6".into()));
        assert_eq!(replies[&1], LocateReply::NoFrame);
        assert!(matches!(replies[&2], LocateReply::Failed(_)));
        assert_eq!(no_frame.calls(), 0);
    }

    #[tokio::test]
    async fn backend_error_is_failed_not_reply() {
        let cameras = CameraSet::new()
            .with(0, "a", ScriptedCamera::new("100, 200"))
            .with(1, "b", Arc::new(OverloadedCamera));
        let frames = frames_for(&[0, 1]);

        let replies = locate_all(&cameras, &frames, "ball").await;
        assert_eq!(
            replies[&1],
            LocateReply::Failed("[Camera 1] Error: endpoint returned 503: overloaded".into())
        );

        let observations = to_observations(&replies);
        assert_eq!(observations[&0], Some(PixelCoordinate::new(100, 200)));
        assert_eq!(observations[&1], None);
    }

    #[tokio::test]
    async fn query_surfaces_backend_error_text() {
        let cameras = CameraSet::new().with(1, "b", Arc::new(OverloadedCamera));
        let frames = frames_for(&[1]);

        let reply = query_camera(&cameras, &frames, 1, "what do you see").await;
        assert_eq!(
            reply.as_deref(),
            Ok("[Camera 1] Error: endpoint returned 503: overloaded")
        );
    }

    // -----------------------------------------------------------------------
    // to_observations
    // -----------------------------------------------------------------------

    #[test]
    fn unparsable_and_missing_replies_become_absent() {
        let replies = BTreeMap::from([
            (0, LocateReply::Reply("I see it around 45, 60 pixels".into())),
            (1, LocateReply::Reply("I cannot locate it".into())),
            (2, LocateReply::NoFrame),
            (3, LocateReply::Failed("boom".into())),
        ]);

        let observations = to_observations(&replies);
        assert_eq!(observations[&0], Some(PixelCoordinate::new(45, 60)));
        assert_eq!(observations[&1], None);
        assert_eq!(observations[&2], None);
        assert_eq!(observations[&3], None);
    }

    #[test]
    fn names_are_reported_in_id_order() {
        let cameras = CameraSet::new()
            .with(2, "door", ScriptedCamera::new("x"))
            .with(0, "bench", ScriptedCamera::new("x"));
        let names: Vec<(CameraId, String)> = cameras.names().into_iter().collect();
        assert_eq!(names, vec![(0, "bench".into()), (2, "door".into())]);
    }
}
