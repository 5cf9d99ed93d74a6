//! Arm command wire-up.
//!
//! [`ArmTransport`] is whatever physically talks to the arm (serial port,
//! ROS bridge, HTTP).  Two implementations ship here: [`LogTransport`],
//! which only logs, and [`ChannelTransport`], which hands commands to a
//! consumer task over a tokio channel.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum ArmError {
    /// The consumer side of the transport has gone away.
    #[error("arm transport closed")]
    Closed,
}

/// Low-level commands understood by the arm controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ArmCommand {
    ClawOpen,
    ClawClose,
    Move { x: f64, y: f64, z: f64 },
}

/// Wire form: `CLAW OPEN`, `CLAW CLOSE`, `MOVE x,y,z`.
impl fmt::Display for ArmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmCommand::ClawOpen => write!(f, "CLAW OPEN"),
            ArmCommand::ClawClose => write!(f, "CLAW CLOSE"),
            ArmCommand::Move { x, y, z } => write!(f, "MOVE {x},{y},{z}"),
        }
    }
}

#[async_trait]
pub trait ArmTransport: Send + Sync {
    async fn send(&self, command: ArmCommand) -> Result<(), ArmError>;
}

/// Logs each command at `info` and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl ArmTransport for LogTransport {
    async fn send(&self, command: ArmCommand) -> Result<(), ArmError> {
        log::info!("[ARM] {command}");
        Ok(())
    }
}

/// Forwards commands to an `mpsc` receiver owned by a driver task.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<ArmCommand>,
}

impl ChannelTransport {
    /// Create the transport and the receiver the driver should drain.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ArmCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ArmTransport for ChannelTransport {
    async fn send(&self, command: ArmCommand) -> Result<(), ArmError> {
        self.tx.send(command).await.map_err(|_| ArmError::Closed)
    }
}
