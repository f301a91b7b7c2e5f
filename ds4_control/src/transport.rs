//! Outbound transport implementations.
//!
//! - [`simulation`] - In-process robot simulation for development and dry runs
//! - [`recording`] - Records all traffic in memory, with failure injection
//! - [`registry`] - Name → factory lookup used at startup
//!
//! # Adding New Transports
//!
//! 1. Create a new submodule under `transport/`
//! 2. Implement the `Transport` trait from `ds4_common::transport`
//! 3. Register its factory in [`TransportRegistry::with_builtin`]

pub mod recording;
pub mod registry;
pub mod simulation;

pub use recording::{RecordingHandle, RecordingTransport};
pub use registry::TransportRegistry;
pub use simulation::{SimulatedRobot, SimulationConfig, SimulationTransport};
