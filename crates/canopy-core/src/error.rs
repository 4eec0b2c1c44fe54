//! Error types for Canopy core plumbing.

/// Errors raised by the timer and signal primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The timer ID is invalid or the timer has already fired or been stopped.
    #[error("invalid or expired timer ID")]
    InvalidTimerId,
    /// The connection ID is invalid or has already been disconnected.
    #[error("invalid or disconnected connection ID")]
    InvalidConnection,
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
