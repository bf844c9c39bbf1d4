use jogdeck_common::CommandKind;
use thiserror::Error;

/// Failures of the persistent key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Keys must be non-empty and free of path separators.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Errors of program editing and persistence.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// A position update carried neither joints nor an effector pose.
    #[error("position update has neither joints nor effector")]
    MissingPosition,

    /// A partial joint update found no complete joint vector to merge onto.
    #[error("no previous joint position to merge a partial joint update onto")]
    NoJointBaseline,

    /// The selected index does not point at a command.
    #[error("no command at selected index {index}")]
    NoSelection { index: usize },

    /// A patch tried to change the kind of the selected command.
    #[error("cannot patch {found} command with {expected} data")]
    CommandTypeMismatch {
        /// Kind of the patch
        expected: CommandKind,
        /// Kind of the selected command
        found: CommandKind,
    },

    /// Commands of this kind cannot be captured from a robot state.
    #[error("cannot capture a {0} command from robot state")]
    UnsupportedCommand(CommandKind),

    /// Saving requires an assigned id.
    #[error("program has no id")]
    MissingId,

    #[error("program {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
