//! Animation error types

use thiserror::Error;

/// Malformed animation configuration, raised when a node is constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Duration is negative, NaN or infinite
    #[error("invalid duration: {0} ms")]
    InvalidDuration(f64),

    /// A target or initial value is NaN or infinite
    #[error("non-finite value: {0}")]
    NonFiniteValue(f64),

    /// Easing curve parameters are out of range
    #[error("malformed easing: {0}")]
    MalformedEasing(String),

    /// Interpolation needs at least two breakpoints
    #[error("interpolation needs at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),

    /// Input and output ranges differ in length
    #[error("interpolation ranges differ in length: {input} inputs, {output} outputs")]
    RangeLengthMismatch { input: usize, output: usize },

    /// Input range decreases at the given breakpoint
    #[error("interpolation domain is not non-decreasing at breakpoint {0}")]
    NonMonotonicDomain(usize),

    /// A never-ending child inside a composite that is expected to complete
    #[error("{0} cannot contain a non-terminating child")]
    UnboundedChild(&'static str),

    /// An infinite loop whose child takes no time would never yield a tick
    #[error("infinite loop over a zero-duration child")]
    ZeroDurationLoop,

    /// Two parallel branches write to the same animated value
    #[error("parallel branches drive the same animated value")]
    ConflictingTargets,

    /// A staggered item key appears more than once
    #[error("duplicate stagger item at position {0}")]
    DuplicateItem(usize),

    /// Frame rate must be positive
    #[error("invalid frame rate: {0}")]
    InvalidFrameRate(u32),
}

/// Use of an animated value or session after it was torn down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The animated value was removed or never belonged to this driver
    #[error("animated value is no longer alive")]
    UnknownValue,

    /// The animated value is owned by a different session
    #[error("animated value belongs to another session")]
    ForeignValue,

    /// The orchestrator session has been cancelled
    #[error("session '{0}' has been torn down")]
    SessionTornDown(String),
}

/// Any error surfaced by the animation core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("lifecycle violation: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;

/// Validate a duration in milliseconds.
pub(crate) fn check_duration(duration_ms: f64) -> Result<f64> {
    if duration_ms.is_finite() && duration_ms >= 0.0 {
        Ok(duration_ms)
    } else {
        Err(ConfigError::InvalidDuration(duration_ms).into())
    }
}

/// Validate a value that will be written to an animated value.
pub(crate) fn check_finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFiniteValue(value).into())
    }
}
