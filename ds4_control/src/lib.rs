//! # DS4 Teleop Control
//!
//! Gamepad teleoperation node for one or two mobile robots with a
//! hard-stop latch and a dead-man safety trigger.
//!
//! # Module Structure
//!
//! - [`config`] - Node configuration, robot mode, release policy
//! - [`registry`] - Per-robot channels and publish/call through the transport
//! - [`state`] - Robot slots, stop sequence and the safety state machine
//! - [`quantize`] - Velocity scaling and 0.01 quantization
//! - [`mailbox`] - Depth-1 input hand-off between threads
//! - [`input_reader`] - Line-delimited JSON frame reader
//! - [`control_loop`] - Event loop tying input, timers and ticks together
//! - [`transport`] - Built-in transports and the transport registry
//! - [`error`] - Node-level errors
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────────────────┐
//! │ input thread│──►│ InputMailbox │──►│ ControlLoop                  │
//! └─────────────┘   └──────────────┘   │  SafetyStateMachine          │
//!                                      │  CommandQuantizer            │
//!                                      │  RobotRegistry ──► Transport │
//!                                      └──────────────────────────────┘
//! ```

pub mod config;
pub mod control_loop;
pub mod error;
pub mod input_reader;
pub mod mailbox;
pub mod quantize;
pub mod registry;
pub mod state;
pub mod transport;

// Re-export key types for convenience
pub use crate::config::{NodeConfig, ReleasePolicy, RobotMode};
pub use crate::control_loop::{ControlLoop, LoopStats};
pub use crate::error::RuntimeError;
pub use crate::mailbox::{Delivery, InputMailbox};
pub use crate::registry::{RobotRegistry, RobotSelector};
pub use crate::state::events::ControlEvent;
pub use crate::state::machine::SafetyStateMachine;
pub use crate::transport::TransportRegistry;
