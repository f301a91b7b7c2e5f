//! Outbound transport trait and payload types.
//!
//! This module defines:
//! - `Transport` trait - Interface for pluggable message transports
//! - `TransportError` enum - Error types for publish/call operations
//! - `TransportFactory` type alias - Factory function type
//! - `VelocityCommand` / `TriggerResponse` - Payloads

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error types for transport operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// Channel or service has no peer.
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// Service call did not complete within the timeout.
    #[error("Service {service} timed out after {timeout_ms}ms")]
    Timeout {
        /// Service name.
        service: String,
        /// Timeout that expired [ms].
        timeout_ms: u64,
    },

    /// Lower-level communication failure.
    #[error("Communication error: {0}")]
    Communication(String),

    /// Transport not found in the registry.
    #[error("Transport not found: {0}")]
    TransportNotFound(String),

    /// Transport-specific configuration is invalid.
    #[error("Transport configuration error: {0}")]
    ConfigError(String),
}

/// Velocity command payload (`geometry_msgs/Twist` with only two fields used).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    /// Forward velocity (`linear.x`).
    pub linear: f64,
    /// Angular velocity (`angular.z`).
    pub angular: f64,
}

impl VelocityCommand {
    /// Zero-velocity stop command.
    pub const ZERO: Self = Self {
        linear: 0.0,
        angular: 0.0,
    };

    /// Create a command from the two used fields.
    pub const fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Whether both fields are zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

/// Response of a trigger service (`std_srvs/Trigger`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    /// Service reports success.
    pub success: bool,
    /// Optional human-readable message.
    #[serde(default)]
    pub message: String,
}

impl TriggerResponse {
    /// Successful response with a message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed response with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Factory function type for creating transport instances.
///
/// Receives the transport's own section of the node configuration.
pub type TransportFactory = fn(&toml::Table) -> Result<Box<dyn Transport>, TransportError>;

/// Trait defining the interface for outbound transports.
///
/// The control loop publishes velocity commands and calls hard-stop
/// services through this trait, so the safety logic is independent of the
/// middleware that actually reaches the robot.
///
/// # Timing Contracts
///
/// | Operation | Max Duration | Notes |
/// |-----------|--------------|-------|
/// | `publish_velocity()` | non-blocking | fire and forget |
/// | `call_trigger()` | `timeout` | expiry is a failure |
/// | `shutdown()` | 1 second | post-loop |
pub trait Transport: Send {
    /// Returns the transport's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Publish a velocity command on `channel`.
    ///
    /// # Errors
    /// Returns `TransportError` if the message could not be handed off.
    fn publish_velocity(
        &mut self,
        channel: &str,
        command: VelocityCommand,
    ) -> Result<(), TransportError>;

    /// Call a trigger service and wait for the response.
    ///
    /// # Errors
    /// Returns `TransportError::Timeout` if no response arrives within
    /// `timeout`, or another variant on transport failure. A response with
    /// `success == false` is returned as `Ok`.
    fn call_trigger(
        &mut self,
        service: &str,
        timeout: Duration,
    ) -> Result<TriggerResponse, TransportError>;

    /// Graceful shutdown.
    fn shutdown(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
