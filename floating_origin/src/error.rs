//! Error types for reference frame and transform operations

use hecs::Entity;

/// Errors raised by caller bugs against the reference frame subsystem
///
/// None of these are recovered internally. Drift past the recentering
/// thresholds is not an error and never surfaces here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// An argument violated a precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The entity has no registered transform in this scene
    #[error("No transform registered for entity {0:?}")]
    TransformNotFound(Entity),
}

/// Convenience alias used throughout the crate
pub type FrameResult<T> = Result<T, FrameError>;
