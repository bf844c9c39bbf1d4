//! # Jogdeck
//!
//! Operator console core for jogging and programming a 6-axis robot arm.
//!
//! A [`Console`] ties the pieces together:
//!
//! - **Programs** are edited copy-on-write and saved through a
//!   [`KeyValueStore`](jogdeck_program::KeyValueStore).
//! - **Derived state** replays the program through a [`Kinematics`]
//!   collaborator whenever the robot state, the program or the selection
//!   changes.
//! - **Playback** sends one command at a time to the live [`Robot`] and
//!   advances once it completes.
//! - **Jogging** drains a queue of jog positions the same way.
//!
//! [`PreviewRobot`] is a [`Robot`] that animates moves in process, for
//! previewing programs without hardware.
//!
//! ## Scheduling
//!
//! Everything runs on one thread. Robot calls are spawned on the
//! [`LocalSpawn`](futures::task::LocalSpawn) handed to [`Console::new`],
//! typically a `futures::executor::LocalPool` spawner or the UI's own local
//! executor. Signal writes propagate synchronously.

mod config;
mod console;
mod derived;
mod error;
mod jog;
mod kinematics;
mod playback;
mod preview;
mod robot;

pub use config::ConsoleSettings;
pub use console::Console;
pub use derived::{DerivedState, DerivedStates, derive_states};
pub use error::ConsoleError;
pub use jog::joint_jog_item;
pub use kinematics::{Kinematics, RobotHandle, Solution, SolveStatus};
pub use playback::PlaybackPhase;
pub use preview::PreviewRobot;
pub use robot::{FrameClock, ImmediateClock, Robot, RobotError};

pub use jogdeck_common as common;
pub use jogdeck_motion as motion;
pub use jogdeck_program as program;
pub use jogdeck_reactive as reactive;
