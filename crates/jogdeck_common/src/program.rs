//! Programs and the operator UI state around them.

use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandKind};
use crate::position::Position;

/// A named program step.
///
/// Serialized flat: `{"name": "...", "type": "joints", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramItem {
    pub name: String,
    #[serde(flatten)]
    pub command: Command,
}

impl ProgramItem {
    pub fn new(name: impl Into<String>, command: Command) -> Self {
        Self { name: name.into(), command }
    }

    pub fn kind(&self) -> CommandKind {
        self.command.kind()
    }
}

/// An ordered sequence of recorded commands.
///
/// `id` is assigned the first time a populated program is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default)]
    pub commands: Vec<ProgramItem>,
}

impl Program {
    /// Only populated programs (a name or at least one command) are persisted.
    pub fn is_populated(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.is_empty()) || !self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&ProgramItem> {
        self.commands.get(index)
    }
}

/// Lightweight entry of the saved-program index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramIndexItem {
    pub id: String,
    pub name: String,
}

/// Playback mode selected by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Playback {
    #[default]
    Stopped,
    Play,
    Preview,
    Jog,
}

impl Playback {
    /// Modes that drive the live robot step by step.
    pub fn drives_robot(&self) -> bool {
        matches!(self, Playback::Play | Playback::Jog)
    }
}

/// What the operator is currently editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Editing {
    #[default]
    None,
    Sequence,
    Item,
}

/// Operator UI state for the programmer panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammerState {
    pub selected_index: usize,
    /// Replace the selected item instead of inserting a new one.
    pub update_selected: bool,
    pub playback: Playback,
    pub editing: Editing,
    pub command_to_add: CommandKind,
    /// Caller-level repeat flag; the playback controller does not loop on it.
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// A playback step is in flight.
    pub busy: bool,
}

impl Default for ProgrammerState {
    fn default() -> Self {
        Self {
            selected_index: 0,
            update_selected: false,
            playback: Playback::Stopped,
            editing: Editing::None,
            command_to_add: CommandKind::Joints,
            loop_playback: false,
            busy: false,
        }
    }
}

/// How drags in the viewport move the arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JogMode {
    TranslateEffector,
    RotateEffector,
    #[default]
    DragJoint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JogSpace {
    Local,
    #[default]
    World,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JogState {
    pub mode: JogMode,
    pub space: JogSpace,
}

/// A queued jog target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub position: Position,
    #[serde(default)]
    pub hide: bool,
}

impl SequenceItem {
    pub fn new(position: Position) -> Self {
        Self { name: None, position, hide: false }
    }
}

/// State of the jog-sequence runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    pub index: usize,
    pub active: bool,
    /// A jog is in flight.
    pub pending: bool,
}
