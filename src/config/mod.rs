//! Configuration module for the WALDO assistant.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the interface
//! model, each camera backend and the conversation memory, `AppPaths` for
//! cross-platform config locations, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::{AppPaths, CONFIG_PATH_ENV, LOCAL_CONFIG_FILE};
pub use settings::{AppConfig, CameraConfig, InterfaceConfig, MemoryConfig, MAX_CAMERAS};
