//! Program commands.

use serde::{Deserialize, Serialize};

use crate::position::{EffectorPosition, JointPosition};

/// Payload of a `speed` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedSetting {
    pub speed: f64,
}

/// Payload of a `serial` command: a raw line for the controller console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialCommand {
    pub command: String,
}

/// One step of a program. Each variant mutates one aspect of the robot state
/// when applied.
///
/// Serialized as `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Command {
    Joints(JointPosition),
    Effector(EffectorPosition),
    /// Tool offset relative to the flange.
    Tool(EffectorPosition),
    Speed(SpeedSetting),
    Serial(SerialCommand),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Joints(_) => CommandKind::Joints,
            Command::Effector(_) => CommandKind::Effector,
            Command::Tool(_) => CommandKind::Tool,
            Command::Speed(_) => CommandKind::Speed,
            Command::Serial(_) => CommandKind::Serial,
        }
    }

    /// True for the commands that move the arm.
    pub fn is_motion(&self) -> bool {
        matches!(self, Command::Joints(_) | Command::Effector(_))
    }
}

/// Tag of a [`Command`] without its payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    #[default]
    Joints,
    Effector,
    Tool,
    Speed,
    Serial,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Joints => "joints",
            CommandKind::Effector => "effector",
            CommandKind::Tool => "tool",
            CommandKind::Speed => "speed",
            CommandKind::Serial => "serial",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
