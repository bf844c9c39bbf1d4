//! Copy-on-write program editing.

use jogdeck_common::{
    Command, CommandKind, JointPosition, PositionUpdate, Program, ProgramItem, ProgrammerState,
    RobotState, SpeedSetting,
};

use crate::error::ProgramError;
use crate::identity::default_name;

/// Replacement program plus the index that should be selected afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub program: Program,
    pub selected_index: usize,
}

fn with_commands(program: &Program, commands: Vec<ProgramItem>) -> Program {
    Program { commands, ..program.clone() }
}

/// Last complete joint vector at or before `from` in program order.
fn joints_at_or_before(program: &Program, from: usize) -> Option<JointPosition> {
    program
        .commands
        .iter()
        .take(from.saturating_add(1))
        .rev()
        .find_map(|item| match &item.command {
            Command::Joints(joints) => Some(*joints),
            _ => None,
        })
}

/// Record a position sample.
///
/// Joints take precedence when both halves are supplied. The sample replaces
/// the selected item when `update_selected` is set and the selected item has
/// the same kind; otherwise a new item is inserted after the selection, or
/// appended when nothing is selected.
///
/// Partial joint updates are merged onto the nearest joint command at or
/// before the selection (or the end of the program when appending), falling
/// back to `live_joints`.
pub fn update_position(
    program: &Program,
    state: &ProgrammerState,
    update: &PositionUpdate,
    live_joints: Option<&JointPosition>,
) -> Result<Edit, ProgramError> {
    let selected = state.selected_index;
    let existing = program.commands.get(selected);

    let command = match (update.joints, update.effector) {
        (Some(partial), _) => {
            let joints = match partial.complete() {
                Some(joints) => joints,
                None => {
                    let search_from = if existing.is_some() {
                        selected
                    } else {
                        program.commands.len().saturating_sub(1)
                    };
                    let baseline = joints_at_or_before(program, search_from)
                        .or_else(|| live_joints.copied())
                        .ok_or(ProgramError::NoJointBaseline)?;
                    partial.merge_onto(&baseline)
                }
            };
            Command::Joints(joints)
        }
        (None, Some(effector)) => Command::Effector(effector),
        (None, None) => return Err(ProgramError::MissingPosition),
    };
    let replace =
        state.update_selected && existing.is_some_and(|item| item.kind() == command.kind());

    let mut commands = program.commands.clone();
    let selected_index = match existing {
        Some(item) if replace => {
            commands[selected] = ProgramItem::new(item.name.clone(), command);
            selected
        }
        Some(_) => {
            commands.insert(selected + 1, ProgramItem::new(default_name(), command));
            selected + 1
        }
        None => {
            commands.push(ProgramItem::new(default_name(), command));
            commands.len() - 1
        }
    };

    Ok(Edit { program: with_commands(program, commands), selected_index })
}

/// Capture a new command of kind `state.command_to_add` from a robot state.
///
/// `selected_state` is the derived state of the selected item, if there is
/// one; the command is inserted after it. Without it the command is
/// captured from `live_state` and inserted at the front.
pub fn add_command(
    program: &Program,
    state: &ProgrammerState,
    selected_state: Option<&RobotState>,
    live_state: Option<&RobotState>,
) -> Result<Edit, ProgramError> {
    let (insert_at, source) = match selected_state {
        Some(derived) => (state.selected_index + 1, derived),
        None => (0, live_state.ok_or(ProgramError::MissingPosition)?),
    };

    let command = match state.command_to_add {
        CommandKind::Joints => {
            Command::Joints(source.position.joints.ok_or(ProgramError::MissingPosition)?)
        }
        CommandKind::Effector => {
            Command::Effector(source.position.effector.ok_or(ProgramError::MissingPosition)?)
        }
        CommandKind::Tool => Command::Tool(source.tool_offset),
        CommandKind::Speed => Command::Speed(SpeedSetting { speed: source.speed }),
        CommandKind::Serial => return Err(ProgramError::UnsupportedCommand(CommandKind::Serial)),
    };

    let mut commands = program.commands.clone();
    let insert_at = insert_at.min(commands.len());
    commands.insert(insert_at, ProgramItem::new(default_name(), command));

    Ok(Edit { program: with_commands(program, commands), selected_index: insert_at })
}

/// Replace the data of the selected command. The kind must not change.
pub fn patch_command(
    program: &Program,
    state: &ProgrammerState,
    command: Command,
) -> Result<Program, ProgramError> {
    let index = state.selected_index;
    let current = program
        .commands
        .get(index)
        .ok_or(ProgramError::NoSelection { index })?;

    if current.kind() != command.kind() {
        return Err(ProgramError::CommandTypeMismatch {
            expected: command.kind(),
            found: current.kind(),
        });
    }

    let mut commands = program.commands.clone();
    commands[index] = ProgramItem::new(current.name.clone(), command);
    Ok(with_commands(program, commands))
}

/// Rename the selected command.
pub fn rename_command(
    program: &Program,
    state: &ProgrammerState,
    name: impl Into<String>,
) -> Result<Program, ProgramError> {
    let index = state.selected_index;
    let mut commands = program.commands.clone();
    let item = commands
        .get_mut(index)
        .ok_or(ProgramError::NoSelection { index })?;
    item.name = name.into();
    Ok(with_commands(program, commands))
}

/// Remove the command at `index`, keeping the selection on the same item
/// where possible.
pub fn remove_command(
    program: &Program,
    state: &ProgrammerState,
    index: usize,
) -> Result<Edit, ProgramError> {
    if index >= program.commands.len() {
        return Err(ProgramError::NoSelection { index });
    }

    let mut commands = program.commands.clone();
    commands.remove(index);

    let mut selected_index = state.selected_index;
    if index < selected_index {
        selected_index -= 1;
    }
    if selected_index >= commands.len() {
        selected_index = commands.len().saturating_sub(1);
    }

    Ok(Edit { program: with_commands(program, commands), selected_index })
}
