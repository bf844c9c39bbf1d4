//! Single-flight program playback.
//!
//! One effect watches the program, the programmer state and the robot. When
//! playback is `play` or `jog` and nothing is in flight it marks the state
//! busy, hands the selected command to the robot on the spawner and returns.
//! The spawned task decides, once the robot is done, whether to advance or
//! stop. A new step starts only while the phase is [`PlaybackPhase::Idle`],
//! so a step stays single-flight even if the programmer state is rewritten
//! mid-step.

use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use jogdeck_common::{Playback, Program, ProgrammerState};
use jogdeck_reactive::{Effect, ReactiveError, Runtime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::console::{ConsoleSignals, Generations};
use crate::robot::{Robot, RobotError};

/// Where the playback controller is within one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// No step in flight
    #[default]
    Idle,
    /// Step accepted, robot call being issued
    Requesting,
    /// Waiting for the robot to finish the step
    AwaitingCompletion,
    /// Robot finished, choosing the next state
    Advancing,
}

pub(crate) fn install(
    runtime: &Runtime,
    signals: &ConsoleSignals,
    spawner: Rc<dyn LocalSpawn>,
) -> Result<Effect, ReactiveError> {
    let signals = signals.clone();
    runtime.effect(move || {
        let program = signals.program.get();
        let state = signals.programmer_state.get();
        let robot = signals.robot.get();

        if !state.playback.drives_robot() || state.busy {
            return;
        }
        // `busy` is public state; the phase belongs to the controller.
        if signals.playback_phase.get_untracked() != PlaybackPhase::Idle {
            return;
        }
        let Some(robot) = robot else {
            return;
        };
        if program.is_empty() {
            return;
        }

        // Overflow is reported to the outermost writer.
        if let Err(err) = start_step(&signals, spawner.as_ref(), robot, &program, state) {
            debug!("[playback] step not started: {}", err);
        }
    })
}

fn start_step(
    signals: &ConsoleSignals,
    spawner: &dyn LocalSpawn,
    robot: Rc<dyn Robot>,
    program: &Program,
    state: ProgrammerState,
) -> Result<(), ReactiveError> {
    let index = state.selected_index;
    let Some(item) = program.item(index).cloned() else {
        info!("[playback] nothing at index {}, stopping", index);
        return signals.publish_state(ProgrammerState { playback: Playback::Stopped, busy: false, ..state });
    };

    signals.playback_phase.set(PlaybackPhase::Requesting)?;
    signals.publish_state(ProgrammerState { busy: true, ..state })?;
    let started = signals.generations();
    debug!("[playback] step {} '{}' ({}) on {}", index, item.name, item.kind(), robot.name());

    signals.playback_phase.set(PlaybackPhase::AwaitingCompletion)?;
    let task = {
        let signals = signals.clone();
        async move {
            let result = robot.execute(&item.command).await;
            if let Err(err) = finish_step(&signals, started, index, result) {
                warn!("[playback] step {} result not published: {}", index, err);
            }
        }
    };

    if let Err(err) = spawner.spawn_local(task) {
        warn!("[playback] could not spawn step {}: {}", index, err);
        signals.playback_phase.set(PlaybackPhase::Idle)?;
        let current = signals.programmer_state.get_untracked();
        return signals.publish_state(ProgrammerState { playback: Playback::Stopped, busy: false, ..current });
    }
    Ok(())
}

fn finish_step(
    signals: &ConsoleSignals,
    started: Generations,
    index: usize,
    result: Result<(), RobotError>,
) -> Result<(), ReactiveError> {
    signals.playback_phase.set(PlaybackPhase::Advancing)?;

    let state = signals.programmer_state.get_untracked();
    let len = signals.program.with_untracked(Program::len);
    let stopped = ProgrammerState { playback: Playback::Stopped, busy: false, ..state.clone() };

    let next = match result {
        Err(err) => {
            warn!("[playback] step {} failed: {}", index, err);
            signals.last_error.set(Some(err))?;
            stopped
        }
        Ok(()) if signals.generations() != started => {
            warn!("[playback] program or state changed during step {}, stopping", index);
            stopped
        }
        Ok(()) if state.playback == Playback::Jog || index + 1 >= len => {
            info!("[playback] stopped after step {}", index);
            stopped
        }
        Ok(()) => {
            let selected_index = (index + 1) % len;
            debug!("[playback] advancing to step {}", selected_index);
            ProgrammerState { selected_index, busy: false, ..state }
        }
    };

    signals.playback_phase.set(PlaybackPhase::Idle)?;
    signals.publish_state(next)
}
