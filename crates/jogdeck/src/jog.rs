//! Jog sequence runner.
//!
//! Dragging a joint in the viewport queues jog positions. While the
//! sequence is active the runner sends the front position to the robot,
//! drops it once the robot is done and moves on to the next one.

use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use jogdeck_common::{Position, RobotState, SequenceItem, SequenceState};
use jogdeck_program::{ProgramError, default_name};
use jogdeck_reactive::{Effect, ReactiveError, Runtime};
use tracing::{debug, warn};

use crate::console::ConsoleSignals;
use crate::error::ConsoleError;
use crate::robot::{Robot, RobotError};

/// Jog item that moves joint `joint` (1 to 6) to `angle` degrees, keeping
/// the other joints of the last queued joint position, or of the live
/// state when nothing with joints is queued.
pub fn joint_jog_item(
    sequence: &[SequenceItem],
    live: Option<&RobotState>,
    joint: usize,
    angle: f64,
) -> Result<SequenceItem, ConsoleError> {
    if !(1..=6).contains(&joint) {
        return Err(ConsoleError::InvalidJoint(joint));
    }

    let baseline = sequence
        .iter()
        .rev()
        .find_map(|item| item.position.joints)
        .or_else(|| live.and_then(|state| state.position.joints))
        .ok_or(ProgramError::NoJointBaseline)?;

    Ok(SequenceItem {
        name: Some(default_name()),
        position: Position::from_joints(baseline.with_joint(joint, angle)),
        hide: false,
    })
}

pub(crate) fn install(
    runtime: &Runtime,
    signals: &ConsoleSignals,
    spawner: Rc<dyn LocalSpawn>,
) -> Result<Effect, ReactiveError> {
    let signals = signals.clone();
    runtime.effect(move || {
        let next = signals.jog_sequence.with(|sequence| sequence.first().map(|item| item.position));
        let state = signals.sequence_state.get();
        let robot = signals.robot.get();

        let Some(robot) = robot else {
            return;
        };
        if state.pending || !state.active {
            return;
        }
        let Some(position) = next else {
            return;
        };

        if let Err(err) = start_jog(&signals, spawner.as_ref(), robot, position, state) {
            debug!("[jog] step not started: {}", err);
        }
    })
}

fn start_jog(
    signals: &ConsoleSignals,
    spawner: &dyn LocalSpawn,
    robot: Rc<dyn Robot>,
    position: Position,
    state: SequenceState,
) -> Result<(), ReactiveError> {
    signals.sequence_state.set(SequenceState { pending: true, ..state })?;
    debug!("[jog] sending queued position {} to {}", state.index, robot.name());

    let task = {
        let signals = signals.clone();
        async move {
            let result = robot.jog(&position).await;
            if let Err(err) = finish_jog(&signals, result) {
                warn!("[jog] result not published: {}", err);
            }
        }
    };

    if let Err(err) = spawner.spawn_local(task) {
        warn!("[jog] could not spawn step: {}", err);
        let current = signals.sequence_state.get_untracked();
        return signals.sequence_state.set(SequenceState { active: false, pending: false, ..current });
    }
    Ok(())
}

fn finish_jog(signals: &ConsoleSignals, result: Result<(), RobotError>) -> Result<(), ReactiveError> {
    let state = signals.sequence_state.get_untracked();

    if let Err(err) = result {
        warn!("[jog] position {} failed: {}", state.index, err);
        signals.last_error.set(Some(err))?;
        return signals.sequence_state.set(SequenceState { active: false, pending: false, ..state });
    }

    let mut rest = signals.jog_sequence.get_untracked();
    if !rest.is_empty() {
        rest.remove(0);
    }
    let active = state.active && !rest.is_empty();

    signals.jog_sequence.set(rest)?;
    signals.sequence_state.set(SequenceState { index: state.index + 1, active, pending: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jogdeck_common::{EffectorPosition, JointPosition};

    fn live() -> RobotState {
        RobotState {
            position: Position::from_joints(JointPosition::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_jog_starts_from_live_joints() {
        let item = joint_jog_item(&[], Some(&live()), 2, 45.0).unwrap();
        assert_eq!(item.position.joints, Some(JointPosition::new(1.0, 45.0, 3.0, 4.0, 5.0, 6.0)));
        assert!(item.position.effector.is_none());
        assert!(item.name.is_some());
    }

    #[test]
    fn test_jog_builds_on_last_queued_joints() {
        let queued = vec![
            SequenceItem::new(Position::from_joints(JointPosition::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0))),
            SequenceItem::new(Position::from_effector(EffectorPosition::default())),
        ];
        let item = joint_jog_item(&queued, Some(&live()), 6, -30.0).unwrap();
        assert_eq!(item.position.joints, Some(JointPosition::new(10.0, 0.0, 0.0, 0.0, 0.0, -30.0)));
    }

    #[test]
    fn test_jog_needs_a_baseline_and_a_real_joint() {
        assert!(matches!(
            joint_jog_item(&[], None, 1, 0.0),
            Err(ConsoleError::Program(ProgramError::NoJointBaseline))
        ));
        assert!(matches!(joint_jog_item(&[], Some(&live()), 7, 0.0), Err(ConsoleError::InvalidJoint(7))));
        assert!(matches!(joint_jog_item(&[], Some(&live()), 0, 0.0), Err(ConsoleError::InvalidJoint(0))));
    }
}
