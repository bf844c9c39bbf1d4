//! # Jogdeck Motion
//!
//! Trapezoidal velocity profiles for independent scalar axes, synchronized
//! so every axis of a move starts and stops at the same time.
//!
//! ```rust
//! use jogdeck_motion::{MotionConstraint, SyncMotion};
//!
//! let constraint = MotionConstraint::new(10.0, 100.0);
//! let motion = SyncMotion::new(&constraint, &[0.0, 0.0], &[50.0, 10.0]).unwrap();
//!
//! assert!((motion.duration() - 2.0 * 5f64.sqrt()).abs() < 1e-9);
//! assert_eq!(motion.sample(motion.duration()), vec![50.0, 10.0]);
//! ```

mod error;
mod plan;
mod sync;

pub use error::MotionError;
pub use plan::{MotionConstraint, MotionPlan};
pub use sync::{Frame, Frames, SyncMotion};
