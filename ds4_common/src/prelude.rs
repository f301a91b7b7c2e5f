//! Prelude module for common re-exports.
//!
//! ```rust
//! use ds4_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_ANG_VEL, MAX_LIN_VEL, MAX_ROBOTS};

// ─── Input ──────────────────────────────────────────────────────────
pub use crate::input::{ButtonSet, InputError, InputSnapshot, JoyMessage};

// ─── Transport ──────────────────────────────────────────────────────
pub use crate::transport::{
    Transport, TransportError, TransportFactory, TriggerResponse, VelocityCommand,
};

/// Default settle delay around the zero-velocity stop command.
pub const DEFAULT_SETTLE_DELAY: Duration =
    Duration::from_millis(crate::consts::DEFAULT_SETTLE_DELAY_MS);

/// Default timeout for hard-stop service calls.
pub const DEFAULT_SERVICE_TIMEOUT: Duration =
    Duration::from_millis(crate::consts::DEFAULT_SERVICE_TIMEOUT_MS);
