//! In-process robot that animates commands instead of sending them to a
//! controller.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use jogdeck_common::{
    Command, CommandKind, EffectorPosition, JointPosition, Position, RobotState,
};
use jogdeck_motion::{MotionConstraint, MotionError, SyncMotion};
use jogdeck_reactive::{ReadSignal, Runtime, RwSignal};
use tracing::debug;

use crate::config::ConsoleSettings;
use crate::kinematics::{Kinematics, RobotHandle};
use crate::robot::{FrameClock, Robot, RobotError};

/// Preview robot.
///
/// Joint and effector moves are planned with the configured constraints
/// and sampled once per frame of the [`FrameClock`]. Each frame poses the
/// scratch [`RobotHandle`]; the robot state is published once the move
/// completes.
pub struct PreviewRobot {
    name: String,
    state: RwSignal<RobotState>,
    kinematics: Rc<dyn Kinematics>,
    clock: Rc<dyn FrameClock>,
    handle: RefCell<RobotHandle>,
    joint_constraints: MotionConstraint,
    effector_constraints: MotionConstraint,
    frame_interval: f64,
}

impl std::fmt::Debug for PreviewRobot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRobot")
            .field("name", &self.name)
            .field("frame_interval", &self.frame_interval)
            .finish_non_exhaustive()
    }
}

impl PreviewRobot {
    pub fn new(
        runtime: &Runtime,
        settings: &ConsoleSettings,
        kinematics: Rc<dyn Kinematics>,
        clock: Rc<dyn FrameClock>,
        initial: RobotState,
    ) -> Self {
        let handle = RobotHandle::from_state(kinematics.as_ref(), &initial);
        Self {
            name: "preview".to_owned(),
            state: runtime.signal(initial),
            kinematics,
            clock,
            handle: RefCell::new(handle),
            joint_constraints: settings.joint_constraints,
            effector_constraints: settings.effector_constraints,
            frame_interval: settings.frame_interval,
        }
    }

    /// Reactive robot state.
    pub fn state_signal(&self) -> ReadSignal<RobotState> {
        self.state.read_only()
    }

    /// Pose of the most recent animation frame.
    pub fn handle(&self) -> RobotHandle {
        self.handle.borrow().clone()
    }

    fn publish(&self, state: RobotState) -> Result<(), RobotError> {
        self.state
            .set(state)
            .map_err(|err| RobotError::Unavailable(format!("state not published: {err}")))
    }

    async fn move_joints(&self, target: JointPosition) -> Result<(), RobotError> {
        let initial = self.state.get_untracked();
        let start = initial
            .position
            .joints
            .unwrap_or_else(|| self.kinematics.determine_joint_position(&self.handle.borrow()));

        self.animate(CommandKind::Joints, &self.joint_constraints, &start.to_axes(), &target.to_axes(), |axes| {
            let joints = JointPosition::from_axes(axes);
            let mut handle = self.handle.borrow_mut();
            self.kinematics.apply_joint_position(&joints, &mut handle);
            self.kinematics.apply_effector_from_joint_position(&mut handle);
        })
        .await?;

        let effector = self.kinematics.determine_effector_position(&self.handle.borrow());
        self.publish(RobotState {
            position: Position { effector: Some(effector), joints: Some(target) },
            ..initial
        })
    }

    async fn move_effector(&self, target: EffectorPosition) -> Result<(), RobotError> {
        let initial = self.state.get_untracked();
        let start = initial
            .position
            .effector
            .unwrap_or_else(|| self.kinematics.determine_effector_position(&self.handle.borrow()));

        self.animate(CommandKind::Effector, &self.effector_constraints, &start.to_axes(), &target.to_axes(), |axes| {
            let effector = EffectorPosition::from_axes(axes);
            let mut handle = self.handle.borrow_mut();
            let predecessor = handle.clone();
            self.kinematics.apply_effector_position(&effector, &mut handle);
            let status = self.kinematics.apply_joints_from_effector_position(&predecessor, &effector, &mut handle);
            if !status.is_converged() {
                debug!("[preview] frame solve finished {:?}", status);
            }
        })
        .await?;

        let joints = self.kinematics.determine_joint_position(&self.handle.borrow());
        self.publish(RobotState {
            position: Position { joints: Some(joints), effector: Some(target) },
            ..initial
        })
    }

    /// Play a synchronized move, handing every frame to `apply`. The last
    /// frame carries the exact targets.
    async fn animate(
        &self,
        command: CommandKind,
        constraint: &MotionConstraint,
        starts: &[f64; 6],
        stops: &[f64; 6],
        apply: impl Fn([f64; 6]),
    ) -> Result<(), RobotError> {
        let failed = |err: MotionError| RobotError::CommandFailed { command, reason: err.to_string() };
        let motion = SyncMotion::new(constraint, starts, stops).map_err(failed)?;

        let mut frames = 0usize;
        for frame in motion.frames(self.frame_interval).map_err(failed)? {
            let mut axes = [0.0; 6];
            axes.copy_from_slice(&frame.positions);
            apply(axes);
            frames += 1;
            if !frame.last {
                self.clock.next_frame(self.frame_interval).await;
            }
        }

        debug!("[preview] {} move took {:.3}s over {} frames", command, motion.duration(), frames);
        Ok(())
    }
}

#[async_trait(?Send)]
impl Robot for PreviewRobot {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> Option<RobotState> {
        Some(self.state.get())
    }

    async fn execute(&self, command: &Command) -> Result<(), RobotError> {
        match command {
            Command::Joints(joints) => self.move_joints(*joints).await,
            Command::Effector(effector) => self.move_effector(*effector).await,
            Command::Tool(tool_offset) => {
                self.kinematics.apply_tool_offset(tool_offset, &mut self.handle.borrow_mut());
                let state = self.state.get_untracked();
                self.publish(RobotState { tool_offset: *tool_offset, ..state })
            }
            Command::Speed(setting) => {
                let state = self.state.get_untracked();
                self.publish(RobotState { speed: setting.speed, ..state })
            }
            Command::Serial(serial) => {
                debug!("[preview] ignoring serial command '{}'", serial.command);
                Ok(())
            }
        }
    }

    async fn jog(&self, position: &Position) -> Result<(), RobotError> {
        match (position.joints, position.effector) {
            (Some(joints), _) => self.move_joints(joints).await,
            (None, Some(effector)) => self.move_effector(effector).await,
            (None, None) => Err(RobotError::EmptyPosition),
        }
    }
}
