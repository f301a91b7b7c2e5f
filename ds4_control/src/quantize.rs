//! Velocity scaling and fixed-resolution quantization.
//!
//! Every published command is truncated toward zero to 0.01 resolution,
//! matching a fixed-point (centi-unit integer) representation.

use ds4_common::consts::QUANTIZE_STEPS;
use ds4_common::input::InputSnapshot;
use ds4_common::transport::VelocityCommand;

/// Truncate `v` toward zero to a resolution of 0.01.
///
/// Inputs must be finite; axis values are clamped to `[-1, 1]` upstream.
#[inline]
pub fn quantize(v: f64) -> f64 {
    (v * QUANTIZE_STEPS).trunc() / QUANTIZE_STEPS
}

/// Scales stick deflection to velocity limits and quantizes the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandQuantizer {
    max_linear: f64,
    max_angular: f64,
}

impl CommandQuantizer {
    /// Create a quantizer with the given full-deflection limits.
    pub const fn new(max_linear: f64, max_angular: f64) -> Self {
        Self {
            max_linear,
            max_angular,
        }
    }

    /// Velocity command for the current stick positions.
    pub fn command(&self, snapshot: &InputSnapshot) -> VelocityCommand {
        VelocityCommand::new(
            quantize(f64::from(snapshot.forward()) * self.max_linear),
            quantize(f64::from(snapshot.turn()) * self.max_angular),
        )
    }
}
