//! # Jogdeck Program
//!
//! Editing and persistence of robot programs.
//!
//! - [`storage`]: string key-value stores and the prefixed record/index
//!   helpers built on them.
//! - [`ProgramLibrary`]: saved programs plus their `{id, name}` index.
//! - [`edit`]: copy-on-write editing operations. Each takes the current
//!   program and programmer state and returns the replacement values; none of
//!   them mutate their inputs.

pub mod edit;
mod error;
mod identity;
mod library;
pub mod storage;

pub use edit::{Edit, add_command, patch_command, remove_command, rename_command, update_position};
pub use error::{ProgramError, StorageError};
pub use identity::{default_name, generate_id, identify};
pub use library::{Committed, DEFAULT_PREFIX, ProgramLibrary};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
