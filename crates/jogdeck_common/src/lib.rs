//! jogdeck_common
//!
//! Data model shared by every jogdeck crate: tool-center-point poses, joint
//! vectors, program commands, the authoritative robot state snapshot and the
//! operator UI state that drives playback.
//!
//! All records are plain values. They are never mutated in place once
//! published through a signal; callers build a new value and hand it to the
//! owning setter.

mod command;
mod position;
mod program;

/// ZYZ Euler pose helpers.
pub mod pose;

pub use command::{Command, CommandKind, SerialCommand, SpeedSetting};
pub use position::{
    Elbow, EffectorPosition, JointPosition, PartialJointPosition, Position, PositionUpdate,
    RobotState,
};
pub use program::{
    Editing, JogMode, JogSpace, JogState, Playback, Program, ProgramIndexItem, ProgramItem,
    ProgrammerState, SequenceItem, SequenceState,
};
