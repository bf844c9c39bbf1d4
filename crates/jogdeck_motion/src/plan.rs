use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Shared per-axis limits. Units are axis units per second (squared).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionConstraint {
    pub max_acceleration: f64,
    pub max_velocity: f64,
}

impl MotionConstraint {
    /// Joint-space moves, degrees.
    pub const JOINTS: Self = Self::new(10.0, 100.0);
    /// Effector-space moves, millimeters and degrees.
    pub const EFFECTOR: Self = Self::new(50.0, 500.0);

    pub const fn new(max_acceleration: f64, max_velocity: f64) -> Self {
        Self { max_acceleration, max_velocity }
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        let valid = |limit: f64| limit.is_finite() && limit > 0.0;
        if valid(self.max_acceleration) && valid(self.max_velocity) {
            Ok(())
        } else {
            Err(MotionError::InvalidConstraints {
                max_acceleration: self.max_acceleration,
                max_velocity: self.max_velocity,
            })
        }
    }

    /// Time needed to reach `max_velocity` from rest.
    pub fn max_accelerate_time(&self) -> f64 {
        self.max_velocity / self.max_acceleration
    }

    /// Distance covered by a full ramp up and ramp down with no cruise.
    pub fn distance_at_max_acceleration(&self) -> f64 {
        self.max_accelerate_time() * self.max_velocity
    }
}

/// Closed-form trapezoidal profile of one axis.
///
/// The axis ramps up for `accelerate_time`, cruises for `coast_time` and
/// ramps down for `accelerate_time` again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPlan {
    pub start: f64,
    /// Signed; zero for an axis that does not move.
    pub acceleration: f64,
    pub accelerate_time: f64,
    pub coast_time: f64,
}

impl MotionPlan {
    pub fn new(start: f64, acceleration: f64, accelerate_time: f64, coast_time: f64) -> Self {
        Self { start, acceleration, accelerate_time, coast_time }
    }

    /// Fastest profile from `start` to `stop` within `constraint`.
    ///
    /// Short moves never reach cruise speed and get a triangular profile.
    pub fn plan_constraints(
        constraint: &MotionConstraint,
        start: f64,
        stop: f64,
    ) -> Result<Self, MotionError> {
        constraint.validate()?;

        let delta = stop - start;
        let acceleration = if delta == 0.0 {
            0.0
        } else {
            delta.signum() * constraint.max_acceleration
        };
        let distance = delta.abs();
        let max_accelerate_time = constraint.max_accelerate_time();
        let distance_at_max_acceleration = constraint.distance_at_max_acceleration();

        let (accelerate_time, coast_time) = if distance_at_max_acceleration >= distance {
            ((distance / constraint.max_acceleration).sqrt(), 0.0)
        } else {
            (
                max_accelerate_time,
                (distance - distance_at_max_acceleration) / constraint.max_velocity,
            )
        };

        Ok(Self::new(start, acceleration, accelerate_time, coast_time))
    }

    /// Profile from `start` to `stop` that reuses the timing of `limiting`.
    ///
    /// If `limiting` has no duration the sibling cannot move and gets zero
    /// acceleration.
    pub fn plan_sibling(limiting: &MotionPlan, start: f64, stop: f64) -> Self {
        let denominator =
            (limiting.accelerate_time + limiting.coast_time) * limiting.accelerate_time;
        let acceleration = if denominator > 0.0 {
            (stop - start) / denominator
        } else {
            0.0
        };
        Self::new(start, acceleration, limiting.accelerate_time, limiting.coast_time)
    }

    /// One plan per axis, all sharing the timing of the slowest axis.
    ///
    /// When several axes tie for the longest time the last of them is the
    /// limiting plan and is returned unchanged.
    pub fn plan_sync(
        constraint: &MotionConstraint,
        starts: &[f64],
        stops: &[f64],
    ) -> Result<Vec<Self>, MotionError> {
        if starts.len() != stops.len() {
            return Err(MotionError::AxisCountMismatch {
                starts: starts.len(),
                stops: stops.len(),
            });
        }

        let initial = starts
            .iter()
            .zip(stops)
            .map(|(&start, &stop)| Self::plan_constraints(constraint, start, stop))
            .collect::<Result<Vec<_>, _>>()?;

        let mut limiting: Option<(usize, f64)> = None;
        for (index, plan) in initial.iter().enumerate() {
            let time = plan.total_time();
            if limiting.is_some_and(|(_, max)| time < max) {
                continue;
            }
            limiting = Some((index, time));
        }

        let Some((limiting_index, _)) = limiting else {
            return Ok(initial);
        };
        let limiting_plan = initial[limiting_index];

        Ok(initial
            .iter()
            .enumerate()
            .map(|(index, plan)| {
                if index == limiting_index {
                    limiting_plan
                } else {
                    Self::plan_sibling(&limiting_plan, plan.start, stops[index])
                }
            })
            .collect())
    }

    /// Position after `time` seconds. Times past [`total_time`](Self::total_time)
    /// are not clamped to the stop value, callers sample up to it only.
    pub fn position(&self, time: f64) -> f64 {
        if time < self.accelerate_time {
            let velocity = time * self.acceleration;
            return self.start + time * velocity / 2.0;
        }

        let velocity = self.acceleration * self.accelerate_time;
        let mut time = time - self.accelerate_time;
        let mut position = self.start + self.accelerate_time * velocity / 2.0;

        if time < self.coast_time {
            return position + time * velocity;
        }

        time -= self.coast_time;
        position += self.coast_time * velocity;

        let time = time.min(self.accelerate_time);
        let final_velocity = velocity - self.acceleration * time;
        position + final_velocity * time + (velocity - final_velocity) * time / 2.0
    }

    pub fn total_time(&self) -> f64 {
        self.accelerate_time * 2.0 + self.coast_time
    }

    /// Position at the end of the profile.
    pub fn stop(&self) -> f64 {
        self.start
            + self.acceleration * self.accelerate_time * (self.accelerate_time + self.coast_time)
    }
}
