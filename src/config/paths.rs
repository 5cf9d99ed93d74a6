//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir:
//!   Windows: %APPDATA%\waldo-assistant\
//!   macOS:   ~/Library/Application Support/waldo-assistant/
//!   Linux:   ~/.config/waldo-assistant/
//!
//! Fallbacks, checked in order when the config dir holds no settings file:
//!   1. the file named by `$WALDO_CONFIG_PATH`
//!   2. `./waldo_config.toml` in the current working directory

use std::path::PathBuf;

/// Environment variable that may point at an alternative settings file.
pub const CONFIG_PATH_ENV: &str = "WALDO_CONFIG_PATH";

/// File name looked up in the working directory as the last resort.
pub const LOCAL_CONFIG_FILE: &str = "waldo_config.toml";

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "waldo-assistant";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
        }
    }

    /// Candidate settings files in lookup order.
    ///
    /// The platform file always comes first; the env-var path is included only
    /// when the variable is set and non-empty.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut out = vec![self.settings_file.clone()];
        if let Some(env_path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            out.push(PathBuf::from(env_path));
        }
        out.push(PathBuf::from(LOCAL_CONFIG_FILE));
        out
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
    }

    #[test]
    fn candidates_start_with_platform_file_and_end_with_local_file() {
        let paths = AppPaths::new();
        let candidates = paths.candidates();
        assert_eq!(candidates.first(), Some(&paths.settings_file));
        assert_eq!(
            candidates.last().and_then(|p| p.to_str()),
            Some(LOCAL_CONFIG_FILE)
        );
    }
}
