//! Pose and joint vectors plus the robot state snapshot.

use serde::{Deserialize, Serialize};

/// Tool-center-point pose relative to the robot base.
///
/// `x`, `y`, `z` are millimeters. `yaw`, `pitch`, `roll` are degrees in the
/// intrinsic ZYZ convention (see [`crate::pose`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectorPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl EffectorPosition {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { x, y, z, yaw, pitch, roll }
    }

    /// Axis order used by the motion planner: x, y, z, yaw, pitch, roll.
    pub fn to_axes(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.yaw, self.pitch, self.roll]
    }

    pub fn from_axes(axes: [f64; 6]) -> Self {
        let [x, y, z, yaw, pitch, roll] = axes;
        Self { x, y, z, yaw, pitch, roll }
    }
}

/// Six joint angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointPosition {
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j5: f64,
    pub j6: f64,
}

impl JointPosition {
    pub fn new(j1: f64, j2: f64, j3: f64, j4: f64, j5: f64, j6: f64) -> Self {
        Self { j1, j2, j3, j4, j5, j6 }
    }

    pub fn to_axes(&self) -> [f64; 6] {
        [self.j1, self.j2, self.j3, self.j4, self.j5, self.j6]
    }

    pub fn from_axes(axes: [f64; 6]) -> Self {
        let [j1, j2, j3, j4, j5, j6] = axes;
        Self { j1, j2, j3, j4, j5, j6 }
    }

    /// Angle of joint `n` (1-based). `None` outside `1..=6`.
    pub fn joint(&self, n: usize) -> Option<f64> {
        (1..=6).contains(&n).then(|| self.to_axes()[n - 1])
    }

    /// Copy with joint `n` (1-based) replaced. Out-of-range `n` returns the
    /// vector unchanged.
    pub fn with_joint(&self, n: usize, angle: f64) -> Self {
        let mut axes = self.to_axes();
        if let Some(slot) = n.checked_sub(1).and_then(|i| axes.get_mut(i)) {
            *slot = angle;
        }
        Self::from_axes(axes)
    }
}

/// A joint update that may only carry some of the six angles.
///
/// Jogging a single joint produces e.g. just `j3`; the program model splices
/// it onto the last known complete vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialJointPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub j1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub j2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub j3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub j4: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub j5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub j6: Option<f64>,
}

impl PartialJointPosition {
    /// Single-joint update for joint `n` (1-based).
    pub fn single(n: usize, angle: f64) -> Self {
        let mut axes = [None; 6];
        if let Some(slot) = n.checked_sub(1).and_then(|i| axes.get_mut(i)) {
            *slot = Some(angle);
        }
        Self::from_axes(axes)
    }

    pub fn to_axes(&self) -> [Option<f64>; 6] {
        [self.j1, self.j2, self.j3, self.j4, self.j5, self.j6]
    }

    pub fn from_axes(axes: [Option<f64>; 6]) -> Self {
        let [j1, j2, j3, j4, j5, j6] = axes;
        Self { j1, j2, j3, j4, j5, j6 }
    }

    /// The complete vector, if all six angles are present.
    pub fn complete(&self) -> Option<JointPosition> {
        Some(JointPosition {
            j1: self.j1?,
            j2: self.j2?,
            j3: self.j3?,
            j4: self.j4?,
            j5: self.j5?,
            j6: self.j6?,
        })
    }

    /// Splice the present angles onto `base`.
    pub fn merge_onto(&self, base: &JointPosition) -> JointPosition {
        let mut axes = base.to_axes();
        for (slot, update) in axes.iter_mut().zip(self.to_axes()) {
            if let Some(angle) = update {
                *slot = angle;
            }
        }
        JointPosition::from_axes(axes)
    }
}

impl From<JointPosition> for PartialJointPosition {
    fn from(joints: JointPosition) -> Self {
        Self::from_axes(joints.to_axes().map(Some))
    }
}

/// Either or both of a pose and a joint snapshot.
///
/// After a kinematics solve both halves are populated; for a recorded step
/// only one of them is authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effector: Option<EffectorPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joints: Option<JointPosition>,
}

impl Position {
    pub fn from_joints(joints: JointPosition) -> Self {
        Self { effector: None, joints: Some(joints) }
    }

    pub fn from_effector(effector: EffectorPosition) -> Self {
        Self { effector: Some(effector), joints: None }
    }
}

/// Input to the program model's position update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionUpdate {
    pub joints: Option<PartialJointPosition>,
    pub effector: Option<EffectorPosition>,
}

impl PositionUpdate {
    pub fn joints(joints: impl Into<PartialJointPosition>) -> Self {
        Self { joints: Some(joints.into()), effector: None }
    }

    pub fn effector(effector: EffectorPosition) -> Self {
        Self { joints: None, effector: Some(effector) }
    }
}

/// Arm configuration for the elbow joint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Elbow {
    #[default]
    Above,
    Below,
}

/// Authoritative robot snapshot at one point of a program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub position: Position,
    #[serde(default)]
    pub elbow: Elbow,
    pub speed: f64,
    #[serde(default)]
    pub tool_offset: EffectorPosition,
}
