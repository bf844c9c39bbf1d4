#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use jogdeck::common::{
    Command, EffectorPosition, JointPosition, Position, Program, ProgramItem, RobotState,
};
use jogdeck::program::{KeyValueStore, MemoryStore, StorageError};
use jogdeck::{Console, ConsoleSettings, FrameClock, Kinematics, Robot, RobotError, Solution, SolveStatus};
use nalgebra::Isometry3;

/// Joints 1-3 are the flange translation, joints 4-6 its ZYZ orientation.
pub struct CartesianArm;

impl Kinematics for CartesianArm {
    fn forward(&self, joints: &JointPosition) -> Isometry3<f64> {
        EffectorPosition::new(joints.j1, joints.j2, joints.j3, joints.j4, joints.j5, joints.j6).to_isometry()
    }

    fn inverse(&self, _seed: &JointPosition, flange: &Isometry3<f64>) -> Solution {
        let pose = EffectorPosition::from_isometry(flange);
        Solution {
            joints: JointPosition::new(pose.x, pose.y, pose.z, pose.yaw, pose.pitch, pose.roll),
            status: SolveStatus::Converged,
        }
    }
}

/// Robot whose commands complete only when the test releases them.
pub struct GatedRobot {
    state: RefCell<Option<RobotState>>,
    commands: RefCell<Vec<Command>>,
    jogs: RefCell<Vec<Position>>,
    gates: RefCell<VecDeque<oneshot::Sender<Result<(), RobotError>>>>,
    in_flight: Cell<usize>,
    max_in_flight: Cell<usize>,
}

impl GatedRobot {
    pub fn new(state: Option<RobotState>) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(state),
            commands: RefCell::new(Vec::new()),
            jogs: RefCell::new(Vec::new()),
            gates: RefCell::new(VecDeque::new()),
            in_flight: Cell::new(0),
            max_in_flight: Cell::new(0),
        })
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    pub fn jogs(&self) -> Vec<Position> {
        self.jogs.borrow().clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.get()
    }

    /// Complete the oldest pending call. Returns false if none was pending.
    pub fn release(&self, result: Result<(), RobotError>) -> bool {
        let gate = self.gates.borrow_mut().pop_front();
        gate.is_some_and(|gate| gate.send(result).is_ok())
    }

    async fn wait(&self) -> Result<(), RobotError> {
        let (sender, receiver) = oneshot::channel();
        self.gates.borrow_mut().push_back(sender);
        self.in_flight.set(self.in_flight.get() + 1);
        self.max_in_flight.set(self.max_in_flight.get().max(self.in_flight.get()));

        let result = receiver
            .await
            .unwrap_or_else(|_| Err(RobotError::Unavailable("gate dropped".into())));
        self.in_flight.set(self.in_flight.get() - 1);
        result
    }
}

#[async_trait(?Send)]
impl Robot for GatedRobot {
    fn name(&self) -> &str {
        "gated"
    }

    fn state(&self) -> Option<RobotState> {
        self.state.borrow().clone()
    }

    async fn execute(&self, command: &Command) -> Result<(), RobotError> {
        self.commands.borrow_mut().push(command.clone());
        self.wait().await
    }

    async fn jog(&self, position: &Position) -> Result<(), RobotError> {
        self.jogs.borrow_mut().push(*position);
        self.wait().await
    }
}

/// Clock that counts the frames it was asked to wait for.
#[derive(Default)]
pub struct CountingClock {
    pub frames: Cell<usize>,
}

#[async_trait(?Send)]
impl FrameClock for CountingClock {
    async fn next_frame(&self, _interval: f64) {
        self.frames.set(self.frames.get() + 1);
    }
}

/// In-memory store whose writes fail while `failing` is set.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub failing: Cell<bool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

pub fn home_state() -> RobotState {
    RobotState {
        position: Position::from_joints(JointPosition::default()),
        speed: 50.0,
        ..Default::default()
    }
}

pub fn joints(j1: f64) -> Command {
    Command::Joints(JointPosition::new(j1, 0.0, 0.0, 0.0, 0.0, 0.0))
}

pub fn program(name: &str, commands: Vec<Command>) -> Program {
    Program {
        name: Some(name.to_owned()),
        commands: commands
            .into_iter()
            .enumerate()
            .map(|(i, command)| ProgramItem::new(format!("{name} {i}"), command))
            .collect(),
        ..Default::default()
    }
}

pub fn console(pool: &LocalPool) -> Console {
    console_with_store(pool, Rc::new(MemoryStore::new()))
}

pub fn console_with_store(pool: &LocalPool, store: Rc<dyn KeyValueStore>) -> Console {
    Console::new(ConsoleSettings::default(), store, Rc::new(CartesianArm), Rc::new(pool.spawner())).unwrap()
}

pub fn attach(console: &Console, robot: &Rc<GatedRobot>) {
    let robot: Rc<dyn Robot> = robot.clone();
    console.set_robot(Some(robot)).unwrap();
}
