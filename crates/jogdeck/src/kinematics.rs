//! Kinematics collaborator.
//!
//! The console never does the arm math itself. An implementation of
//! [`Kinematics`] provides forward and inverse kinematics; the provided
//! methods express the operations the console needs in terms of a scratch
//! [`RobotHandle`].

use jogdeck_common::{EffectorPosition, JointPosition, RobotState};
use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outcome reported by an inverse solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Converged,
    Stalled,
    Diverged,
    Timeout,
}

impl SolveStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolveStatus::Converged)
    }
}

/// Result of [`Kinematics::inverse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub joints: JointPosition,
    pub status: SolveStatus,
}

/// Scratch pose of the arm, mutated in place by the kinematics operations.
///
/// Translations are millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotHandle {
    pub joints: JointPosition,
    /// Flange pose in the base frame.
    pub flange: Isometry3<f64>,
    /// Tool center point relative to the flange.
    pub tool_offset: Isometry3<f64>,
}

impl Default for RobotHandle {
    fn default() -> Self {
        Self {
            joints: JointPosition::default(),
            flange: Isometry3::identity(),
            tool_offset: Isometry3::identity(),
        }
    }
}

impl RobotHandle {
    /// Tool center point in the base frame.
    pub fn tool_center_point(&self) -> Isometry3<f64> {
        self.flange * self.tool_offset
    }

    /// Handle posed like `state`. Joints are preferred; an effector-only
    /// state is solved from the zero pose.
    pub fn from_state(kinematics: &dyn Kinematics, state: &RobotState) -> Self {
        let mut handle = Self::default();
        kinematics.apply_tool_offset(&state.tool_offset, &mut handle);

        if let Some(joints) = &state.position.joints {
            kinematics.apply_joint_position(joints, &mut handle);
        } else if let Some(effector) = &state.position.effector {
            let seed = handle.clone();
            let status = kinematics.apply_joints_from_effector_position(&seed, effector, &mut handle);
            if !status.is_converged() {
                warn!("[kinematics] initial pose solve finished {:?}", status);
            }
        }
        handle
    }
}

pub trait Kinematics {
    /// Flange pose for `joints`.
    fn forward(&self, joints: &JointPosition) -> Isometry3<f64>;

    /// Joints that place the flange at `flange`, searched from `seed`.
    fn inverse(&self, seed: &JointPosition, flange: &Isometry3<f64>) -> Solution;

    /// Set the joints and move the flange with them.
    fn apply_joint_position(&self, joints: &JointPosition, target: &mut RobotHandle) {
        target.joints = *joints;
        target.flange = self.forward(joints);
    }

    /// Move the tool to `effector` without solving joints.
    fn apply_effector_position(&self, effector: &EffectorPosition, target: &mut RobotHandle) {
        target.flange = effector.to_isometry() * target.tool_offset.inverse();
    }

    fn apply_tool_offset(&self, tool_offset: &EffectorPosition, target: &mut RobotHandle) {
        target.tool_offset = tool_offset.to_isometry();
    }

    /// Solve joints that bring the tool of `target` to `effector`, seeded
    /// from `predecessor`. The flange follows the solved joints.
    fn apply_joints_from_effector_position(
        &self,
        predecessor: &RobotHandle,
        effector: &EffectorPosition,
        target: &mut RobotHandle,
    ) -> SolveStatus {
        let goal = effector.to_isometry() * target.tool_offset.inverse();
        let solution = self.inverse(&predecessor.joints, &goal);
        self.apply_joint_position(&solution.joints, target);
        solution.status
    }

    /// Re-derive the flange from the current joints.
    fn apply_effector_from_joint_position(&self, target: &mut RobotHandle) {
        target.flange = self.forward(&target.joints);
    }

    fn determine_joint_position(&self, source: &RobotHandle) -> JointPosition {
        source.joints
    }

    fn determine_effector_position(&self, source: &RobotHandle) -> EffectorPosition {
        EffectorPosition::from_isometry(&source.tool_center_point())
    }

    fn determine_tool_offset(&self, source: &RobotHandle) -> EffectorPosition {
        EffectorPosition::from_isometry(&source.tool_offset)
    }
}
