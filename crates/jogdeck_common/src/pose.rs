//! Quaternion <-> Euler ZYZ conversion for effector poses.
//!
//! Orientation is intrinsic Z-Y-Z: `yaw` around Z, then `pitch` around the
//! new Y, then `roll` around the new Z. Translation is kept in millimeters.
//!
//! When `pitch` is 0 or 180 degrees the first and last rotations share an
//! axis, so only their sum (or difference) is recoverable. The inverse then
//! splits the angle evenly between yaw and roll.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::position::EffectorPosition;

/// Build the rotation `Rz(yaw) * Ry(pitch) * Rz(roll)`. Angles in degrees.
pub fn zyz_to_quaternion(yaw: f64, pitch: f64, roll: f64) -> UnitQuaternion<f64> {
    let q_yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw.to_radians());
    let q_pitch = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), pitch.to_radians());
    let q_roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll.to_radians());
    q_yaw * q_pitch * q_roll
}

/// Recover `(yaw, pitch, roll)` in degrees. `pitch` is in `[0, 180]`.
pub fn quaternion_to_zyz(q: &UnitQuaternion<f64>) -> (f64, f64, f64) {
    let q = q.quaternion();
    let (qw, qx, qy, qz) = (q.w, q.i, q.j, q.k);

    let sum = qz.atan2(qw);
    let difference = (-qx).atan2(qy);
    let pitch = (2.0 * (qw * qw + qz * qz) - 1.0).clamp(-1.0, 1.0).acos();

    (
        (sum + difference).to_degrees(),
        pitch.to_degrees(),
        (sum - difference).to_degrees(),
    )
}

impl EffectorPosition {
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        zyz_to_quaternion(self.yaw, self.pitch, self.roll)
    }

    /// Pose as a rigid transform (translation in millimeters).
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::new(self.x, self.y, self.z), self.rotation())
    }

    pub fn from_isometry(isometry: &Isometry3<f64>) -> Self {
        let t = &isometry.translation;
        let (yaw, pitch, roll) = quaternion_to_zyz(&isometry.rotation);
        Self { x: t.x, y: t.y, z: t.z, yaw, pitch, roll }
    }
}
