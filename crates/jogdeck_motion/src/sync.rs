use tracing::debug;

use crate::error::MotionError;
use crate::plan::{MotionConstraint, MotionPlan};

/// A synchronized move of several axes.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncMotion {
    plans: Vec<MotionPlan>,
    stops: Vec<f64>,
    duration: f64,
}

impl SyncMotion {
    pub fn new(
        constraint: &MotionConstraint,
        starts: &[f64],
        stops: &[f64],
    ) -> Result<Self, MotionError> {
        let plans = MotionPlan::plan_sync(constraint, starts, stops)?;
        let duration = plans.first().map(MotionPlan::total_time).unwrap_or(0.0);
        debug!(
            "[motion] planned {} axes over {:.3}s (accel={}, vel={})",
            plans.len(),
            duration,
            constraint.max_acceleration,
            constraint.max_velocity
        );
        Ok(Self { plans, stops: stops.to_vec(), duration })
    }

    pub fn plans(&self) -> &[MotionPlan] {
        &self.plans
    }

    pub fn stops(&self) -> &[f64] {
        &self.stops
    }

    pub fn axis_count(&self) -> usize {
        self.plans.len()
    }

    /// Shared duration of every axis in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Axis positions at `time`. Negative times sample the start, times at or
    /// past the duration return the exact stop vector.
    pub fn sample(&self, time: f64) -> Vec<f64> {
        if time >= self.duration {
            return self.stops.clone();
        }
        let time = time.max(0.0);
        self.plans.iter().map(|plan| plan.position(time)).collect()
    }

    /// Frames spaced `interval` seconds apart, ending with the exact stops.
    pub fn frames(&self, interval: f64) -> Result<Frames<'_>, MotionError> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(MotionError::InvalidInterval(interval));
        }
        Ok(Frames { motion: self, interval, step: 0, finished: false })
    }
}

/// One sampled instant of a [`SyncMotion`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time: f64,
    pub positions: Vec<f64>,
    /// Set on the final frame, whose positions are the exact stops.
    pub last: bool,
}

/// Iterator returned by [`SyncMotion::frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    motion: &'a SyncMotion,
    interval: f64,
    step: u64,
    finished: bool,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }

        let time = self.step as f64 * self.interval;
        if time < self.motion.duration {
            self.step += 1;
            return Some(Frame { time, positions: self.motion.sample(time), last: false });
        }

        self.finished = true;
        Some(Frame {
            time: self.motion.duration,
            positions: self.motion.stops.clone(),
            last: true,
        })
    }
}
