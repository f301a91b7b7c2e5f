//! Node-level error type.

use ds4_common::config::ConfigError;
use ds4_common::transport::TransportError;
use thiserror::Error;

/// Errors that abort node startup or shutdown.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport could not be created.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Signal handler could not be installed.
    #[error("signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),

    /// Input thread could not be started.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
