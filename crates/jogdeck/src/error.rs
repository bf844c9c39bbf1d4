use jogdeck_motion::MotionError;
use jogdeck_program::ProgramError;
use jogdeck_reactive::ReactiveError;
use thiserror::Error;

use crate::robot::RobotError;

/// Errors of root-context operations.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Reactive(#[from] ReactiveError),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Robot(#[from] RobotError),

    #[error(transparent)]
    Motion(#[from] MotionError),

    /// Joint numbers run from 1 to 6.
    #[error("no joint {0}")]
    InvalidJoint(usize),

    #[error("no jog sequence item at index {0}")]
    InvalidJogIndex(usize),

    /// Settings JSON could not be parsed.
    #[error("invalid settings JSON: {0}")]
    Settings(serde_json::Error),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
