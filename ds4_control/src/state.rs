//! State machine module root.
//!
//! Per-robot slot state, the deferred stop sequence, operator-facing
//! events and the safety state machine driven by input frames.

pub mod events;
pub mod machine;
pub mod slot;
