//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every field is defaulted, so a partial `settings.toml` is always valid.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::vision::{CalibrationStore, CameraId};

/// Camera ids considered when building the active camera set (0..4).
pub const MAX_CAMERAS: CameraId = 4;

// ---------------------------------------------------------------------------
// InterfaceConfig
// ---------------------------------------------------------------------------

/// Settings for the general conversational ("interface") model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Base URL of the OpenAI-compatible endpoint (without `/v1/...`).
    pub base_url: String,
    /// API key, `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Completion cap sent as `max_tokens`.
    pub max_tokens: u32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
    /// Free-text personality injected into the system preamble.
    pub personality: String,
    /// Free-text role description injected into the system preamble.
    pub roles: String,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "llama3.1:8b".into(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 30,
            personality: String::new(),
            roles: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Settings for one vision-capable camera backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Zero-based camera identifier.
    pub id: CameraId,
    /// Display name users may address the camera by (e.g. `"bench cam"`).
    pub name: Option<String>,
    /// Vision model identifier (e.g. `"llava:13b"`).
    pub model: Option<String>,
    /// API key for the vision endpoint.
    pub api_key: Option<String>,
    /// Base URL of the vision endpoint.
    pub endpoint: Option<String>,
    /// Image file used as this camera's latest frame by the terminal front-end.
    pub frame_path: Option<PathBuf>,
    /// Per-request timeout in seconds; 30 when unset.
    pub timeout_secs: Option<u64>,
    /// Token cap for replies; 300 when unset.
    pub max_tokens: Option<u32>,
}

impl CameraConfig {
    /// A camera is active only when model, key and endpoint are all present
    /// and non-empty.
    pub fn is_active(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        self.id < MAX_CAMERAS
            && present(&self.model)
            && present(&self.api_key)
            && present(&self.endpoint)
    }
}

// ---------------------------------------------------------------------------
// MemoryConfig
// ---------------------------------------------------------------------------

/// Settings for the bounded conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of (user, assistant) pairs kept; oldest pairs are evicted.
    pub max_pairs: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { max_pairs: 20 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use waldo_assistant::config::AppConfig;
///
/// // Load (returns Default when no settings file exists anywhere)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Conversational model settings.
    pub interface: InterfaceConfig,
    /// Per-camera vision backends.
    pub cameras: Vec<CameraConfig>,
    /// Per-camera intrinsics/extrinsics used for triangulation.
    pub calibration: CalibrationStore,
    /// Conversation memory bounds.
    pub memory: MemoryConfig,
}

impl AppConfig {
    /// Load configuration from the first settings file that exists among
    /// [`AppPaths::candidates`].
    ///
    /// Returns `Ok(AppConfig::default())` when none exists (first-run
    /// scenario).
    pub fn load() -> Result<Self> {
        for path in AppPaths::new().candidates() {
            if path.exists() {
                log::info!("config: loading {}", path.display());
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Active cameras in ascending id order.
    pub fn active_cameras(&self) -> Vec<&CameraConfig> {
        let mut active: Vec<&CameraConfig> =
            self.cameras.iter().filter(|c| c.is_active()).collect();
        active.sort_by_key(|c| c.id);
        active.dedup_by_key(|c| c.id);
        active
    }

    /// Display name for camera `id`: the configured name, or `"camera {id+1}"`.
    pub fn camera_display_name(&self, id: CameraId) -> String {
        self.cameras
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("camera {}", id + 1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
