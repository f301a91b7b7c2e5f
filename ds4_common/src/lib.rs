//! DS4 Common Library
//!
//! Shared constants, input types, the outbound transport seam and
//! configuration loading utilities for all DS4 teleop workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Button/axis indices, thresholds and velocity limits
//! - [`input`] - `InputSnapshot`, `ButtonSet` and the `JoyMessage` wire type
//! - [`transport`] - `Transport` trait, velocity/trigger payloads, `TransportError`
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use ds4_common::prelude::*;
//!
//! let snapshot = InputSnapshot::neutral();
//! assert!(snapshot.pressed().is_empty());
//! ```

pub mod config;
pub mod consts;
pub mod input;
pub mod prelude;
pub mod transport;
