//! Keyword-based intent classification and addressed-camera resolution.
//!
//! [`KeywordClassifier`] lower-cases the prompt and checks it against three
//! vocabularies in a fixed order (camera, then triangulation, then arm)
//! and the first vocabulary with any substring hit wins.  No hit means
//! [`Intent::General`].  Because the order is fixed, a prompt such as
//! "locate the cup" (present in both camera and triangulation lists)
//! always routes to [`Intent::Camera`].
//!
//! The router only depends on the [`IntentClassifier`] trait, so a
//! model-based classifier can replace this one.

use std::collections::BTreeMap;

use crate::vision::CameraId;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Visual question about a single camera's feed.
    Camera,
    /// 3D localisation across all cameras.
    Triangulate,
    /// Robot-arm command.
    Arm,
    /// Anything else, handled by the conversational model.
    General,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Camera => "CAMERA",
            Intent::Triangulate => "TRIANGULATE",
            Intent::Arm => "ARM",
            Intent::General => "GENERAL",
        }
    }
}

/// Result of classifying one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    /// Camera explicitly addressed in the prompt, or 0 when none was.
    pub camera: CameraId,
}

/// Pluggable prompt classifier.
///
/// `cameras` maps each active camera id to its display name.  Implementations
/// must be pure: the same input always yields the same output.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, prompt: &str, cameras: &BTreeMap<CameraId, String>) -> Classification;
}

// ---------------------------------------------------------------------------
// Static vocabularies
// ---------------------------------------------------------------------------

struct KeywordSet {
    intent: Intent,
    keywords: &'static [&'static str],
}

/// Checked top to bottom; first set with a hit wins.
static KEYWORD_SETS: &[KeywordSet] = &[
    KeywordSet {
        intent: Intent::Camera,
        keywords: &[
            "camera",
            "see",
            "what do you see",
            "what are you seeing",
            "describe what you see",
            "describe what is on",
            "in the camera",
            "in the feed",
            "what's in view",
            "on screen",
            "monitor",
            "show me",
            "can you see",
            "vision",
            "object detection",
            "recognize",
            "analyze image",
            "describe",
            "who is in view",
            "what's visible",
            "what do you notice",
            "what is happening",
            "scan",
            "check camera",
            "look at",
            "feed",
            "scene",
            "live feed",
            "video",
            "frame",
            "on cam",
            "on cam 1",
            "on camera 1",
            "on camera one",
            "from the camera",
            "from the feed",
            "what's there",
            "what can you tell",
            "can you tell",
            "look",
            "find",
            "spot",
            "count objects",
            "anything moving",
            "what is moving",
            "identify",
            "locate",
            "current view",
            "what's in the room",
            "what's in this view",
            "describe what you observe",
        ],
    },
    KeywordSet {
        intent: Intent::Triangulate,
        keywords: &[
            "triangulate",
            "3d position",
            "where is",
            "locate",
            "world coordinates",
            "calculate position",
            "estimate distance",
            "find location",
            "3d location",
            "object location",
            "distance between",
            "angle between",
            "get position",
            "measure",
            "how far",
            "relative to",
            "absolute position",
        ],
    },
    KeywordSet {
        intent: Intent::Arm,
        keywords: &[
            "robot arm",
            "move arm",
            "move the arm",
            "move to",
            "pick up",
            "grasp",
            "release",
            "open hand",
            "close hand",
            "manipulate",
            "operate the arm",
            "move claw",
            "rotate wrist",
            "extend arm",
            "retract arm",
            "put down",
            "drop",
            "grab",
            "lift",
            "move robot",
            "move end effector",
            "control arm",
            "send arm",
            "to coordinates",
            "x y z",
            "point to",
            "go to",
            "move object",
            "arm to",
            "arm command",
            "execute arm",
            "reach for",
            "press",
            "push",
            "pull",
        ],
    },
];

// ---------------------------------------------------------------------------
// KeywordClassifier
// ---------------------------------------------------------------------------

/// Substring-matching classifier over the built-in vocabularies.
///
/// # Example
/// ```rust
/// use std::collections::BTreeMap;
/// use waldo_assistant::router::{Intent, IntentClassifier, KeywordClassifier};
///
/// let cameras = BTreeMap::from([(0, "camera 1".to_string()), (1, "camera 2".to_string())]);
/// let c = KeywordClassifier::new().classify("What does camera 2 see?", &cameras);
/// assert_eq!(c.intent, Intent::Camera);
/// assert_eq!(c.camera, 1);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Intent for an already lower-cased prompt.
    pub fn intent_of(prompt_lc: &str) -> Intent {
        KEYWORD_SETS
            .iter()
            .find(|set| set.keywords.iter().any(|kw| prompt_lc.contains(kw)))
            .map(|set| set.intent)
            .unwrap_or(Intent::General)
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, prompt: &str, cameras: &BTreeMap<CameraId, String>) -> Classification {
        let prompt_lc = prompt.to_lowercase();
        Classification {
            intent: Self::intent_of(&prompt_lc),
            camera: resolve_camera(&prompt_lc, cameras),
        }
    }
}

/// First camera (ascending id) addressed as `"camera N"` (1-based) or by its
/// display name; 0 when none is.  `prompt_lc` must already be lower-cased.
pub fn resolve_camera(prompt_lc: &str, cameras: &BTreeMap<CameraId, String>) -> CameraId {
    cameras
        .iter()
        .find(|(id, name)| {
            let name = name.to_lowercase();
            prompt_lc.contains(&format!("camera {}", *id + 1))
                || (!name.is_empty() && prompt_lc.contains(&name))
        })
        .map(|(id, _)| *id)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
