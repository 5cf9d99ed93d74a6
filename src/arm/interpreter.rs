//! Natural-language arm command interpreter.
//!
//! Recognised phrasing, checked in this order:
//!
//! | Prompt contains | Command           | Reply                          |
//! |-----------------|-------------------|--------------------------------|
//! | `open`          | `CLAW OPEN`       | `Claw opened.`                 |
//! | `close`         | `CLAW CLOSE`      | `Claw closed.`                 |
//! | `move to` + 3 numbers | `MOVE x,y,z` | `Moving arm to [x, y, z]`     |
//!
//! Anything else is answered with `Command not recognized: …`.  Dispatch is
//! fire-and-forget: the reply acknowledges the command, it does not confirm
//! the arm finished moving.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::transport::{ArmCommand, ArmTransport, LogTransport};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-+]?[0-9]*\.?[0-9]+").unwrap());

/// Robot-arm backend as seen by the router.
#[async_trait]
pub trait ArmCapability: Send + Sync {
    async fn interpret(&self, command: &str) -> String;
}

/// Keyword interpreter that dispatches through an [`ArmTransport`].
pub struct CommandInterpreter {
    transport: Arc<dyn ArmTransport>,
}

impl CommandInterpreter {
    pub fn new(transport: Arc<dyn ArmTransport>) -> Self {
        Self { transport }
    }

    /// Map free text to a command, or to the reply explaining why not.
    pub fn parse(command: &str) -> Result<ArmCommand, String> {
        let lc = command.to_lowercase();

        if lc.contains("open") {
            return Ok(ArmCommand::ClawOpen);
        }
        if lc.contains("close") {
            return Ok(ArmCommand::ClawClose);
        }
        if lc.contains("move to") {
            let coords: Vec<f64> = NUMBER_RE
                .find_iter(command)
                .filter_map(|m| m.as_str().parse().ok())
                .collect();
            return match coords.as_slice() {
                [x, y, z] => Ok(ArmCommand::Move {
                    x: *x,
                    y: *y,
                    z: *z,
                }),
                _ => Err("Command not recognized: missing coordinates.".to_string()),
            };
        }
        Err(format!("Command not recognized: {command}"))
    }

    fn dispatch(&self, command: ArmCommand) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(e) = transport.send(command.clone()).await {
                log::error!("arm: failed to send {command}: {e}");
            }
        });
    }
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new(Arc::new(LogTransport))
    }
}

#[async_trait]
impl ArmCapability for CommandInterpreter {
    async fn interpret(&self, command: &str) -> String {
        match Self::parse(command) {
            Ok(cmd) => {
                let reply = match &cmd {
                    ArmCommand::ClawOpen => "Claw opened.".to_string(),
                    ArmCommand::ClawClose => "Claw closed.".to_string(),
                    ArmCommand::Move { x, y, z } => format!("Moving arm to [{x}, {y}, {z}]"),
                };
                log::debug!("arm: {command:?} -> {cmd}");
                self.dispatch(cmd);
                reply
            }
            Err(reply) => {
                log::debug!("arm: unrecognised command {command:?}");
                reply
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::transport::ChannelTransport;

    fn interpreter() -> (CommandInterpreter, tokio::sync::mpsc::Receiver<ArmCommand>) {
        let (transport, rx) = ChannelTransport::new(8);
        (CommandInterpreter::new(Arc::new(transport)), rx)
    }

    #[tokio::test]
    async fn open_dispatches_claw_open() {
        let (arm, mut rx) = interpreter();
        assert_eq!(arm.interpret("Open the hand").await, "Claw opened.");
        assert_eq!(rx.recv().await, Some(ArmCommand::ClawOpen));
    }

    #[tokio::test]
    async fn close_dispatches_claw_close() {
        let (arm, mut rx) = interpreter();
        assert_eq!(arm.interpret("close hand").await, "Claw closed.");
        assert_eq!(rx.recv().await, Some(ArmCommand::ClawClose));
    }

    #[tokio::test]
    async fn move_to_with_three_numbers() {
        let (arm, mut rx) = interpreter();
        let reply = arm.interpret("move to 0.1, -0.25, 3").await;
        assert_eq!(reply, "Moving arm to [0.1, -0.25, 3]");
        assert_eq!(
            rx.recv().await,
            Some(ArmCommand::Move { x: 0.1, y: -0.25, z: 3.0 })
        );
    }

    #[tokio::test]
    async fn move_to_without_enough_numbers_dispatches_nothing() {
        let (arm, mut rx) = interpreter();
        assert_eq!(
            arm.interpret("move to 10 20").await,
            "Command not recognized: missing coordinates."
        );
        drop(arm);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn unknown_command_echoes_input() {
        let (arm, _rx) = interpreter();
        assert_eq!(
            arm.interpret("wave hello").await,
            "Command not recognized: wave hello"
        );
    }

    #[test]
    fn open_wins_over_move_to() {
        assert_eq!(
            CommandInterpreter::parse("open claw then move to 1 2 3"),
            Ok(ArmCommand::ClawOpen)
        );
    }
}
