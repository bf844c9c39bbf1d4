mod common;

use std::rc::Rc;

use common::*;
use futures::executor::{LocalPool, block_on};
use jogdeck::common::{
    Command, EffectorPosition, JointPosition, Playback, Position, SerialCommand, SpeedSetting,
};
use jogdeck::program::MemoryStore;
use jogdeck::reactive::Runtime;
use jogdeck::{Console, ConsoleSettings, ImmediateClock, PreviewRobot, Robot, RobotError};

const TOLERANCE: f64 = 1e-6;

fn preview(runtime: &Runtime, settings: &ConsoleSettings, clock: Rc<CountingClock>) -> PreviewRobot {
    PreviewRobot::new(runtime, settings, Rc::new(CartesianArm), clock, home_state())
}

#[test]
fn joint_move_lands_on_the_target() {
    let runtime = Runtime::new();
    let robot = preview(&runtime, &ConsoleSettings::default(), Rc::new(CountingClock::default()));
    let target = JointPosition::new(50.0, -20.0, 0.0, 0.0, 0.0, 0.0);

    block_on(robot.execute(&Command::Joints(target))).unwrap();

    let state = robot.state().unwrap();
    assert_eq!(state.position.joints, Some(target));
    let effector = state.position.effector.unwrap();
    assert!((effector.x - 50.0).abs() < TOLERANCE);
    assert!((effector.y + 20.0).abs() < TOLERANCE);
    assert_eq!(robot.handle().joints, target);
    assert_eq!(state.speed, 50.0);
}

#[test]
fn joint_move_waits_one_frame_per_interval() {
    let runtime = Runtime::new();
    let settings = ConsoleSettings { frame_interval: 0.5, ..Default::default() };
    let clock = Rc::new(CountingClock::default());
    let robot = preview(&runtime, &settings, clock.clone());

    // 0 -> 50 under {10, 100} takes 2 * sqrt(5) s, frames at 0.0 ..= 4.0.
    block_on(robot.execute(&Command::Joints(JointPosition::new(50.0, 0.0, 0.0, 0.0, 0.0, 0.0)))).unwrap();
    assert_eq!(clock.frames.get(), 9);
}

#[test]
fn effector_move_solves_the_joints() {
    let runtime = Runtime::new();
    let robot = preview(&runtime, &ConsoleSettings::default(), Rc::new(CountingClock::default()));
    let target = EffectorPosition::new(120.0, 30.0, -40.0, 0.0, 0.0, 0.0);

    block_on(robot.jog(&Position::from_effector(target))).unwrap();

    let state = robot.state().unwrap();
    assert_eq!(state.position.effector, Some(target));
    let joints = state.position.joints.unwrap();
    assert!((joints.j1 - 120.0).abs() < TOLERANCE);
    assert!((joints.j2 - 30.0).abs() < TOLERANCE);
    assert!((joints.j3 + 40.0).abs() < TOLERANCE);
}

#[test]
fn tool_and_speed_update_the_state_without_moving() {
    let runtime = Runtime::new();
    let clock = Rc::new(CountingClock::default());
    let robot = preview(&runtime, &ConsoleSettings::default(), clock.clone());
    let tool = EffectorPosition::new(0.0, 0.0, 80.0, 0.0, 0.0, 0.0);

    block_on(async {
        robot.execute(&Command::Tool(tool)).await?;
        robot.execute(&Command::Speed(SpeedSetting { speed: 12.0 })).await?;
        robot.execute(&Command::Serial(SerialCommand { command: "here".into() })).await
    })
    .unwrap();

    let state = robot.state().unwrap();
    assert_eq!(state.tool_offset, tool);
    assert_eq!(state.speed, 12.0);
    assert_eq!(state.position, home_state().position);
    assert_eq!(clock.frames.get(), 0);

    let tcp = jogdeck::Kinematics::determine_effector_position(&CartesianArm, &robot.handle());
    assert!((tcp.z - 80.0).abs() < TOLERANCE);
}

#[test]
fn empty_jog_position_is_rejected() {
    let runtime = Runtime::new();
    let robot = preview(&runtime, &ConsoleSettings::default(), Rc::new(CountingClock::default()));
    assert_eq!(block_on(robot.jog(&Position::default())), Err(RobotError::EmptyPosition));
}

#[test]
fn console_plays_a_program_on_the_preview_robot() {
    let mut pool = LocalPool::new();
    let settings = ConsoleSettings { frame_interval: 0.25, ..Default::default() };
    let console = Console::new(
        settings.clone(),
        Rc::new(MemoryStore::new()),
        Rc::new(CartesianArm),
        Rc::new(pool.spawner()),
    )
    .unwrap();

    let robot = Rc::new(PreviewRobot::new(
        console.runtime(),
        &settings,
        console.kinematics(),
        Rc::new(ImmediateClock),
        home_state(),
    ));
    let as_robot: Rc<dyn Robot> = robot.clone();
    console.set_robot(Some(as_robot)).unwrap();

    let target = JointPosition::new(0.0, 0.0, 0.0, 0.0, 0.0, 30.0);
    console
        .set_program(program(
            "demo",
            vec![joints(15.0), Command::Speed(SpeedSetting { speed: 20.0 }), Command::Joints(target)],
        ))
        .unwrap();
    console.set_playback(Playback::Play).unwrap();
    pool.run_until_stalled();

    let state = console.programmer_state().get();
    assert_eq!(state.playback, Playback::Stopped);
    assert!(!state.busy);
    assert_eq!(state.selected_index, 2);

    let final_state = robot.state().unwrap();
    assert_eq!(final_state.position.joints, Some(target));
    assert_eq!(final_state.speed, 20.0);

    // The program now replays from the robot's new state.
    let derived = console.derived_state().get();
    assert_eq!(derived.len(), 3);
    assert_eq!(derived[0].state.speed, 20.0);
}
