//! Root context of the operator console.
//!
//! A [`Console`] owns the reactive runtime and every signal of one console
//! instance. All mutation goes through its setters, which take care of
//! persistence and playback invalidation; values are never mutated in
//! place.

use std::cell::Cell;
use std::rc::Rc;

use futures::task::LocalSpawn;
use jogdeck_common::{
    Command, CommandKind, JogState, Playback, PositionUpdate, Program, ProgramIndexItem,
    ProgrammerState, RobotState, SequenceItem, SequenceState,
};
use jogdeck_program::{Edit, KeyValueStore, ProgramLibrary, edit};
use jogdeck_reactive::{Effect, Memo, ReactiveError, ReadSignal, Runtime, RwSignal};
use tracing::{debug, info};

use crate::config::ConsoleSettings;
use crate::derived::{DerivedStates, derive_states};
use crate::error::ConsoleError;
use crate::jog;
use crate::kinematics::{Kinematics, RobotHandle};
use crate::playback::{self, PlaybackPhase};
use crate::robot::{Robot, RobotError};

/// Write counters of the program and the programmer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Generations {
    pub program: u64,
    pub state: u64,
}

/// Signal handles shared with the console's effects.
#[derive(Clone)]
pub(crate) struct ConsoleSignals {
    pub program: RwSignal<Program>,
    pub programmer_state: RwSignal<ProgrammerState>,
    pub programs: RwSignal<Vec<ProgramIndexItem>>,
    pub robot: RwSignal<Option<Rc<dyn Robot>>>,
    pub jog_state: RwSignal<JogState>,
    pub jog_sequence: RwSignal<Vec<SequenceItem>>,
    pub sequence_state: RwSignal<SequenceState>,
    pub last_error: RwSignal<Option<RobotError>>,
    pub playback_phase: RwSignal<PlaybackPhase>,
    program_generation: Rc<Cell<u64>>,
    state_generation: Rc<Cell<u64>>,
}

impl ConsoleSignals {
    fn new(runtime: &Runtime, programs: Vec<ProgramIndexItem>) -> Self {
        Self {
            program: runtime.signal(Program::default()),
            programmer_state: runtime.signal(ProgrammerState::default()),
            programs: runtime.signal(programs),
            robot: runtime.signal(None),
            jog_state: runtime.signal(JogState::default()),
            jog_sequence: runtime.signal(Vec::new()),
            sequence_state: runtime.signal(SequenceState::default()),
            last_error: runtime.signal(None),
            playback_phase: runtime.signal(PlaybackPhase::Idle),
            program_generation: Rc::new(Cell::new(0)),
            state_generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn generations(&self) -> Generations {
        Generations { program: self.program_generation.get(), state: self.state_generation.get() }
    }

    pub fn publish_program(&self, program: Program) -> Result<(), ReactiveError> {
        self.program_generation.set(self.program_generation.get() + 1);
        self.program.set(program)
    }

    pub fn publish_state(&self, state: ProgrammerState) -> Result<(), ReactiveError> {
        self.state_generation.set(self.state_generation.get() + 1);
        self.programmer_state.set(state)
    }
}

/// One operator console.
///
/// Playback and jog steps run on the `spawner` handed to [`Console::new`];
/// the console never blocks on the robot.
pub struct Console {
    runtime: Runtime,
    settings: ConsoleSettings,
    library: ProgramLibrary,
    kinematics: Rc<dyn Kinematics>,
    signals: ConsoleSignals,
    derived: Memo<DerivedStates>,
    effects: Vec<Effect>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("settings", &self.settings)
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}

impl Console {
    pub fn new(
        settings: ConsoleSettings,
        store: Rc<dyn KeyValueStore>,
        kinematics: Rc<dyn Kinematics>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Result<Self, ConsoleError> {
        settings.validate()?;

        let runtime = Runtime::with_max_depth(settings.max_effect_depth);
        let library = ProgramLibrary::new(store, settings.storage_prefix.clone());
        let signals = ConsoleSignals::new(&runtime, library.list()?);

        let derived = runtime.memo({
            let signals = signals.clone();
            let kinematics = kinematics.clone();
            move || -> DerivedStates {
                // Selection changes republish the snapshot list.
                signals.programmer_state.with(|_| ());
                let Some(robot) = signals.robot.get() else {
                    return DerivedStates::default();
                };
                let Some(start) = robot.state() else {
                    return DerivedStates::default();
                };
                signals.program.with(|program| Rc::new(derive_states(kinematics.as_ref(), &start, program)))
            }
        })?;

        let effects = vec![
            playback::install(&runtime, &signals, spawner.clone())?,
            jog::install(&runtime, &signals, spawner)?,
        ];

        info!("[console] ready, programs under '{}'", library.prefix());
        Ok(Self { runtime, settings, library, kinematics, signals, derived, effects })
    }

    /// Runtime of this console, for creating signals and effects alongside it.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn library(&self) -> &ProgramLibrary {
        &self.library
    }

    pub fn kinematics(&self) -> Rc<dyn Kinematics> {
        self.kinematics.clone()
    }

    pub fn program(&self) -> ReadSignal<Program> {
        self.signals.program.read_only()
    }

    pub fn programmer_state(&self) -> ReadSignal<ProgrammerState> {
        self.signals.programmer_state.read_only()
    }

    /// Index of saved programs, sorted by name.
    pub fn programs(&self) -> ReadSignal<Vec<ProgramIndexItem>> {
        self.signals.programs.read_only()
    }

    pub fn robot(&self) -> ReadSignal<Option<Rc<dyn Robot>>> {
        self.signals.robot.read_only()
    }

    pub fn jog_state(&self) -> ReadSignal<JogState> {
        self.signals.jog_state.read_only()
    }

    pub fn jog_sequence(&self) -> ReadSignal<Vec<SequenceItem>> {
        self.signals.jog_sequence.read_only()
    }

    pub fn sequence_state(&self) -> ReadSignal<SequenceState> {
        self.signals.sequence_state.read_only()
    }

    /// Last failure reported by the robot during playback or jogging.
    pub fn last_error(&self) -> ReadSignal<Option<RobotError>> {
        self.signals.last_error.read_only()
    }

    pub fn playback_phase(&self) -> ReadSignal<PlaybackPhase> {
        self.signals.playback_phase.read_only()
    }

    /// Per-command robot states of the current program, replayed from the
    /// live robot state. Empty without a robot state.
    pub fn derived_state(&self) -> Memo<DerivedStates> {
        self.derived.clone()
    }

    /// Publish a new program.
    ///
    /// Stops a running playback. A populated program gets an id and a name
    /// on first publish and is saved together with its index entry.
    pub fn set_program(&self, program: Program) -> Result<(), ConsoleError> {
        let committed = self.library.commit(program)?;

        let current = self.signals.programmer_state.get_untracked();
        if current.busy {
            info!("[playback] program replaced while busy, stopping");
            self.signals.publish_state(ProgrammerState { playback: Playback::Stopped, ..current })?;
        }
        if let Some(index) = committed.index {
            self.signals.programs.set(index)?;
        }
        self.signals.publish_program(committed.program)?;
        Ok(())
    }

    pub fn set_programmer_state(&self, state: ProgrammerState) -> Result<(), ConsoleError> {
        self.signals.publish_state(state)?;
        Ok(())
    }

    /// Switch playback mode. Setting the current mode again is a no-op.
    pub fn set_playback(&self, playback: Playback) -> Result<(), ConsoleError> {
        let current = self.signals.programmer_state.get_untracked();
        if current.playback == playback {
            return Ok(());
        }
        info!("[playback] {:?} -> {:?}", current.playback, playback);
        self.set_programmer_state(ProgrammerState { playback, ..current })
    }

    pub fn select(&self, index: usize) -> Result<(), ConsoleError> {
        let current = self.signals.programmer_state.get_untracked();
        self.set_programmer_state(ProgrammerState { selected_index: index, ..current })
    }

    pub fn set_update_selected(&self, update_selected: bool) -> Result<(), ConsoleError> {
        let current = self.signals.programmer_state.get_untracked();
        self.set_programmer_state(ProgrammerState { update_selected, ..current })
    }

    pub fn set_command_to_add(&self, command_to_add: CommandKind) -> Result<(), ConsoleError> {
        let current = self.signals.programmer_state.get_untracked();
        self.set_programmer_state(ProgrammerState { command_to_add, ..current })
    }

    pub fn new_program(&self) -> Result<(), ConsoleError> {
        self.set_program(Program::default())
    }

    /// Load a saved program and reset the programmer state.
    pub fn load_program(&self, id: &str) -> Result<(), ConsoleError> {
        let program = self.library.load(id)?;
        info!("[program] loaded {}", id);
        self.set_program(program)?;
        self.set_programmer_state(ProgrammerState::default())
    }

    /// Delete the current program from storage, then start a new one.
    pub fn delete_program(&self) -> Result<(), ConsoleError> {
        let current = self.signals.program.get_untracked();
        if let Some(id) = current.id.as_deref() {
            self.library.delete(id)?;
            self.signals.programs.set(self.library.list()?)?;
        }
        self.set_program(Program::default())
    }

    /// Record a position sample into the program.
    pub fn update_position(&self, update: &PositionUpdate) -> Result<(), ConsoleError> {
        let live_joints = self.live_state().and_then(|state| state.position.joints);
        let change = edit::update_position(
            &self.signals.program.get_untracked(),
            &self.signals.programmer_state.get_untracked(),
            update,
            live_joints.as_ref(),
        )?;
        self.apply_edit(change)
    }

    /// Insert a command of the programmer state's `command_to_add` kind,
    /// captured from the selected step, or from the live robot when nothing
    /// is selected.
    pub fn add_command(&self) -> Result<(), ConsoleError> {
        let state = self.signals.programmer_state.get_untracked();
        let derived = self.derived.get_untracked();
        let selected = derived.get(state.selected_index).map(|step| &step.state);
        let live = self.live_state();

        let change = edit::add_command(&self.signals.program.get_untracked(), &state, selected, live.as_ref())?;
        self.apply_edit(change)
    }

    /// Replace the data of the selected command.
    pub fn patch_command(&self, command: Command) -> Result<(), ConsoleError> {
        let program = edit::patch_command(
            &self.signals.program.get_untracked(),
            &self.signals.programmer_state.get_untracked(),
            command,
        )?;
        self.set_program(program)
    }

    pub fn rename_command(&self, name: impl Into<String>) -> Result<(), ConsoleError> {
        let program = edit::rename_command(
            &self.signals.program.get_untracked(),
            &self.signals.programmer_state.get_untracked(),
            name,
        )?;
        self.set_program(program)
    }

    pub fn remove_command(&self, index: usize) -> Result<(), ConsoleError> {
        let change = edit::remove_command(
            &self.signals.program.get_untracked(),
            &self.signals.programmer_state.get_untracked(),
            index,
        )?;
        self.apply_edit(change)
    }

    /// Write the pose of `handle` into the selected command, after the
    /// operator dragged it in the viewport. Commands without a pose are
    /// left alone.
    pub fn capture_selected(&self, handle: &RobotHandle) -> Result<(), ConsoleError> {
        let state = self.signals.programmer_state.get_untracked();
        let kind = self
            .signals
            .program
            .with_untracked(|program| program.item(state.selected_index).map(|item| item.kind()));
        let Some(kind) = kind else {
            return Ok(());
        };

        let command = match kind {
            CommandKind::Joints => Command::Joints(self.kinematics.determine_joint_position(handle)),
            CommandKind::Effector => Command::Effector(self.kinematics.determine_effector_position(handle)),
            CommandKind::Tool => Command::Tool(self.kinematics.determine_tool_offset(handle)),
            CommandKind::Speed | CommandKind::Serial => return Ok(()),
        };
        self.patch_command(command)
    }

    pub fn set_robot(&self, robot: Option<Rc<dyn Robot>>) -> Result<(), ConsoleError> {
        match &robot {
            Some(robot) => info!("[console] robot '{}' connected", robot.name()),
            None => info!("[console] robot disconnected"),
        }
        self.signals.robot.set(robot)?;
        Ok(())
    }

    pub fn set_jog_state(&self, jog_state: JogState) -> Result<(), ConsoleError> {
        self.signals.jog_state.set(jog_state)?;
        Ok(())
    }

    /// Replace the jog queue. An active runner is paused first.
    pub fn set_jog_sequence(&self, sequence: Vec<SequenceItem>) -> Result<(), ConsoleError> {
        let state = self.signals.sequence_state.get_untracked();
        if state.active {
            self.signals.sequence_state.set(SequenceState { active: false, ..state })?;
        }
        self.signals.jog_sequence.set(sequence)?;
        Ok(())
    }

    /// Queue a move of joint `joint` to `angle` degrees.
    pub fn append_joint_jog(&self, joint: usize, angle: f64) -> Result<(), ConsoleError> {
        let mut sequence = self.signals.jog_sequence.get_untracked();
        let item = jog::joint_jog_item(&sequence, self.live_state().as_ref(), joint, angle)?;
        debug!("[jog] queued j{} = {}", joint, angle);
        sequence.push(item);
        self.set_jog_sequence(sequence)
    }

    pub fn set_sequence_active(&self, active: bool) -> Result<(), ConsoleError> {
        let state = self.signals.sequence_state.get_untracked();
        self.signals.sequence_state.set(SequenceState { active, ..state })?;
        Ok(())
    }

    pub fn toggle_jog_item_hidden(&self, index: usize) -> Result<(), ConsoleError> {
        let mut sequence = self.signals.jog_sequence.get_untracked();
        let Some(item) = sequence.get_mut(index) else {
            return Err(ConsoleError::InvalidJogIndex(index));
        };
        item.hide = !item.hide;
        self.set_jog_sequence(sequence)
    }

    /// Pause the runner and empty the jog queue.
    pub fn purge_jog_sequence(&self) -> Result<(), ConsoleError> {
        self.set_jog_sequence(Vec::new())
    }

    pub fn clear_last_error(&self) -> Result<(), ConsoleError> {
        self.signals.last_error.set(None)?;
        Ok(())
    }

    fn live_state(&self) -> Option<RobotState> {
        self.signals.robot.with_untracked(|robot| robot.as_ref().and_then(|robot| robot.state()))
    }

    fn apply_edit(&self, edit: Edit) -> Result<(), ConsoleError> {
        self.set_program(edit.program)?;
        let current = self.signals.programmer_state.get_untracked();
        self.set_programmer_state(ProgrammerState { selected_index: edit.selected_index, ..current })
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.derived.dispose();
        for effect in &self.effects {
            effect.dispose();
        }
    }
}
