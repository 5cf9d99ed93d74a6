//! Robot-arm command handling.
//!
//! The router hands raw ARM-intent prompts to an [`ArmCapability`];
//! [`CommandInterpreter`] is the keyword-driven implementation, dispatching
//! [`ArmCommand`]s through an [`ArmTransport`].

pub mod interpreter;
pub mod transport;

pub use interpreter::{ArmCapability, CommandInterpreter};
pub use transport::{ArmCommand, ArmError, ArmTransport, ChannelTransport, LogTransport};
