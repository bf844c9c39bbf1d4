use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// Start and stop vectors have different lengths.
    #[error("start vector has {starts} axes but stop vector has {stops}")]
    AxisCountMismatch { starts: usize, stops: usize },

    /// Limits must be finite and strictly positive.
    #[error(
        "invalid motion constraint: max_acceleration={max_acceleration}, max_velocity={max_velocity}"
    )]
    InvalidConstraints {
        max_acceleration: f64,
        max_velocity: f64,
    },

    /// Frame interval must be finite and strictly positive.
    #[error("invalid frame interval {0}")]
    InvalidInterval(f64),
}
