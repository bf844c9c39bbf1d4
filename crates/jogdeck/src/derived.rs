//! Derived state pipeline.
//!
//! Replays a program against a starting robot state through the kinematics
//! collaborator, producing one snapshot per command.

use std::rc::Rc;

use jogdeck_common::{Command, Position, Program, ProgramItem, RobotState};
use tracing::{debug, warn};

use crate::kinematics::{Kinematics, RobotHandle, SolveStatus};

/// Robot state after applying one command.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedState {
    pub command: ProgramItem,
    pub state: RobotState,
    pub handle: RobotHandle,
    /// Status of the inverse solve, for effector commands.
    pub solve_status: Option<SolveStatus>,
}

impl DerivedState {
    pub fn is_converged(&self) -> bool {
        self.solve_status.is_none_or(|status| status.is_converged())
    }
}

/// Published list of derived states. Replaced wholesale on every recompute.
pub type DerivedStates = Rc<Vec<DerivedState>>;

/// Replay `program` from `start`.
///
/// A non-converged solve is recorded in the step's `solve_status` and
/// logged; the resulting pose is still committed.
pub fn derive_states(kinematics: &dyn Kinematics, start: &RobotState, program: &Program) -> Vec<DerivedState> {
    let mut handle = RobotHandle::from_state(kinematics, start);
    let mut state = start.clone();
    let mut derived = Vec::with_capacity(program.len());

    for (index, item) in program.commands.iter().enumerate() {
        let mut solve_status = None;

        match &item.command {
            Command::Joints(joints) => {
                kinematics.apply_joint_position(joints, &mut handle);
                state.position = Position {
                    joints: Some(*joints),
                    effector: Some(kinematics.determine_effector_position(&handle)),
                };
            }
            Command::Effector(effector) => {
                let predecessor = handle.clone();
                let status = kinematics.apply_joints_from_effector_position(&predecessor, effector, &mut handle);
                if !status.is_converged() {
                    warn!("[derived] step {} '{}' solve finished {:?}", index, item.name, status);
                }
                solve_status = Some(status);
                state.position = Position {
                    joints: Some(kinematics.determine_joint_position(&handle)),
                    effector: Some(*effector),
                };
            }
            Command::Tool(tool_offset) => {
                kinematics.apply_tool_offset(tool_offset, &mut handle);
                state.tool_offset = *tool_offset;
                if state.position.joints.is_some() {
                    state.position.effector = Some(kinematics.determine_effector_position(&handle));
                }
            }
            Command::Speed(setting) => {
                state.speed = setting.speed;
            }
            Command::Serial(_) => {}
        }

        derived.push(DerivedState {
            command: item.clone(),
            state: state.clone(),
            handle: handle.clone(),
            solve_status,
        });
    }

    debug!("[derived] replayed {} commands", derived.len());
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::Solution;
    use crate::kinematics::testing::CartesianArm;
    use jogdeck_common::{EffectorPosition, JointPosition, SerialCommand, SpeedSetting};
    use nalgebra::Isometry3;

    const TOLERANCE: f64 = 1e-6;

    fn start() -> RobotState {
        RobotState {
            position: Position::from_joints(JointPosition::default()),
            speed: 50.0,
            ..Default::default()
        }
    }

    fn program(commands: Vec<Command>) -> Program {
        Program {
            commands: commands
                .into_iter()
                .enumerate()
                .map(|(i, command)| ProgramItem::new(format!("step {i}"), command))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_program_derives_nothing() {
        assert!(derive_states(&CartesianArm, &start(), &Program::default()).is_empty());
    }

    #[test]
    fn test_each_step_builds_on_the_previous() {
        let program = program(vec![
            Command::Joints(JointPosition::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
            Command::Speed(SpeedSetting { speed: 10.0 }),
            Command::Tool(EffectorPosition::new(0.0, 0.0, 25.0, 0.0, 0.0, 0.0)),
            Command::Serial(SerialCommand { command: "here".into() }),
            Command::Effector(EffectorPosition::new(10.0, 20.0, 30.0, 0.0, 0.0, 0.0)),
        ]);

        let derived = derive_states(&CartesianArm, &start(), &program);
        assert_eq!(derived.len(), 5);

        let effector = derived[0].state.position.effector.unwrap();
        assert!((effector.x - 100.0).abs() < TOLERANCE);
        assert_eq!(derived[0].state.speed, 50.0);

        assert_eq!(derived[1].state.speed, 10.0);
        assert_eq!(derived[1].state.position, derived[0].state.position);

        let tcp = derived[2].state.position.effector.unwrap();
        assert!((tcp.z - 25.0).abs() < TOLERANCE);
        assert_eq!(derived[2].state.tool_offset.z, 25.0);

        assert_eq!(derived[3].state, derived[2].state);

        // The tool stays applied, so the flange sits 25mm below the target.
        let joints = derived[4].state.position.joints.unwrap();
        assert!((joints.j3 - 5.0).abs() < TOLERANCE);
        assert_eq!(derived[4].solve_status, Some(SolveStatus::Converged));
        assert!(derived.iter().all(DerivedState::is_converged));
    }

    struct StalledArm;

    impl Kinematics for StalledArm {
        fn forward(&self, joints: &JointPosition) -> Isometry3<f64> {
            CartesianArm.forward(joints)
        }

        fn inverse(&self, seed: &JointPosition, _flange: &Isometry3<f64>) -> Solution {
            Solution { joints: *seed, status: SolveStatus::Stalled }
        }
    }

    #[test]
    fn test_unconverged_solve_is_recorded_and_committed() {
        let target = EffectorPosition::new(500.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let derived = derive_states(&StalledArm, &start(), &program(vec![Command::Effector(target)]));

        assert_eq!(derived[0].solve_status, Some(SolveStatus::Stalled));
        assert!(!derived[0].is_converged());
        assert_eq!(derived[0].state.position.effector, Some(target));
        assert_eq!(derived[0].state.position.joints, Some(JointPosition::default()));
    }
}
