//! WALDO: a multimodal assistant front-end for a camera-equipped robot.
//!
//! Prompts are classified and routed to a per-camera vision model, a
//! multi-camera triangulation pipeline, a robot-arm interpreter or a general
//! conversational model.  See [`router::Router`] for the entry point.

pub mod arm;
pub mod config;
pub mod llm;
pub mod router;
pub mod vision;

pub use router::Router;
