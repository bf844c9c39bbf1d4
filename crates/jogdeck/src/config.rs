//! Console configuration.

use std::path::Path;

use jogdeck_motion::MotionConstraint;
use jogdeck_program::DEFAULT_PREFIX;
use jogdeck_reactive::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;

/// Settings of a [`Console`](crate::Console).
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Key-value prefix of saved programs and their index.
    pub storage_prefix: String,
    /// Limits for joint-space preview moves (degrees).
    pub joint_constraints: MotionConstraint,
    /// Limits for effector-space preview moves (millimeters, degrees).
    pub effector_constraints: MotionConstraint,
    /// Maximum nesting of effect runs before a write fails.
    pub max_effect_depth: usize,
    /// Seconds between preview animation frames.
    pub frame_interval: f64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_PREFIX.to_owned(),
            joint_constraints: MotionConstraint::JOINTS,
            effector_constraints: MotionConstraint::EFFECTOR,
            max_effect_depth: DEFAULT_MAX_DEPTH,
            frame_interval: 1.0 / 60.0,
        }
    }
}

impl ConsoleSettings {
    pub fn from_json(text: &str) -> Result<Self, ConsoleError> {
        let settings: Self = serde_json::from_str(text).map_err(ConsoleError::Settings)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            ConsoleError::InvalidSettings(format!("{}: {}", path.as_ref().display(), err))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConsoleError> {
        self.joint_constraints.validate()?;
        self.effector_constraints.validate()?;
        if self.max_effect_depth == 0 {
            return Err(ConsoleError::InvalidSettings("max_effect_depth must be at least 1".into()));
        }
        if !self.frame_interval.is_finite() || self.frame_interval <= 0.0 {
            return Err(ConsoleError::InvalidSettings(format!(
                "frame_interval must be positive, got {}",
                self.frame_interval
            )));
        }
        Ok(())
    }
}
