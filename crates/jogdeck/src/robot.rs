//! Robot collaborator.
//!
//! A [`Robot`] is whatever carries out commands: the remote controller, or
//! the in-process [`PreviewRobot`](crate::PreviewRobot). Execution is
//! asynchronous and single-threaded, so the traits are `?Send`.

use async_trait::async_trait;
use jogdeck_common::{Command, CommandKind, Position, RobotState};
use thiserror::Error;

/// Errors reported by a robot while carrying out a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RobotError {
    /// Robot is not reachable or not ready
    #[error("robot unavailable: {0}")]
    Unavailable(String),

    /// Robot rejected or failed the command
    #[error("{command} command failed: {reason}")]
    CommandFailed { command: CommandKind, reason: String },

    /// Jog position carries neither joints nor an effector pose
    #[error("jog position is empty")]
    EmptyPosition,
}

/// A live robot.
///
/// # Example
///
/// ```ignore
/// #[async_trait(?Send)]
/// impl Robot for RemoteRobot {
///     fn name(&self) -> &str {
///         "tx90"
///     }
///
///     fn state(&self) -> Option<RobotState> {
///         self.state.get()
///     }
///
///     async fn execute(&self, command: &Command) -> Result<(), RobotError> {
///         self.client.put("/api/command", command).await
///     }
///
///     async fn jog(&self, position: &Position) -> Result<(), RobotError> {
///         self.client.put("/api/jog", position).await
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait Robot {
    fn name(&self) -> &str;

    /// Last known state. Implementations backed by a signal make readers
    /// inside effects and memos depend on it.
    fn state(&self) -> Option<RobotState>;

    /// Carry out one program command, resolving when the motion completes.
    async fn execute(&self, command: &Command) -> Result<(), RobotError>;

    /// Move to a jog position, resolving when the motion completes.
    async fn jog(&self, position: &Position) -> Result<(), RobotError>;
}

/// Source of animation frame ticks.
#[async_trait(?Send)]
pub trait FrameClock {
    /// Resolve once the next frame, `interval` seconds away, is due.
    async fn next_frame(&self, interval: f64);
}

/// Clock whose frames are due immediately. Animations complete within a
/// single poll.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateClock;

#[async_trait(?Send)]
impl FrameClock for ImmediateClock {
    async fn next_frame(&self, _interval: f64) {}
}
