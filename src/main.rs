//! Application entry point: WALDO terminal front-end.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (explicit path from the first argument, otherwise
//!    the usual lookup order; defaults when nothing is found).
//! 3. Build one vision backend per active camera and load its frame file.
//! 4. Build the chat backend and the arm interpreter.
//! 5. Read prompts from stdin, one per line, until EOF or `exit`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use waldo_assistant::{
    arm::CommandInterpreter,
    config::AppConfig,
    llm::{ApiChat, ApiVision, FallbackCamera, FallbackChat},
    router::{PromptBuilder, Router},
    vision::{CameraSet, LatestFrames},
};

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn load_config() -> AppConfig {
    let loaded = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => AppConfig::load_from(&path),
        None => AppConfig::load(),
    };
    loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    })
}

/// Vision backends and frame store for every active camera.
fn build_cameras(config: &AppConfig) -> (CameraSet, LatestFrames) {
    let mut cameras = CameraSet::new();
    let frames = LatestFrames::new();

    for camera in config.active_cameras() {
        let Some(vision) = ApiVision::from_config(camera) else {
            continue;
        };
        let name = config.camera_display_name(camera.id);
        log::info!("Camera {} active as {name:?}", camera.id);
        cameras.insert(camera.id, name, Arc::new(FallbackCamera::new(camera.id, vision)));

        if let Some(path) = &camera.frame_path {
            if let Err(e) = frames.load_file(camera.id, path) {
                log::warn!("Camera {}: {e}", camera.id);
            }
        }
    }

    if cameras.is_empty() {
        log::warn!("No active cameras; camera and triangulation prompts will report errors");
    }
    (cameras, frames)
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("WALDO assistant starting up");

    // 2. Configuration
    let config = load_config();

    // 3. Cameras
    let (cameras, frames) = build_cameras(&config);

    // 4. Chat + arm
    let chat = FallbackChat::new(ApiChat::from_config(&config.interface));
    let router = Router::new(
        cameras,
        Arc::new(frames),
        Arc::new(chat),
        Arc::new(CommandInterpreter::default()),
    )
    .with_calibration(config.calibration.clone())
    .with_prompt_builder(PromptBuilder::from_config(&config.interface))
    .with_memory_limit(config.memory.max_pairs);

    // 5. Prompt loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
            break;
        }
        println!("{}", router.process_prompt(prompt).await);
    }

    log::info!("WALDO assistant shutting down");
    Ok(())
}
