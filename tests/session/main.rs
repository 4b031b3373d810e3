mod common;

mod breakpoints;
mod display;
mod lifecycle;
mod steps;

use crate::common::{MockSpawner, TestSession, SOCKET};
use camlstalker::debugger::process::ProcessRole;
use camlstalker::debugger::{LaunchArgs, MessageKind, Perspective, SessionEvent, State};
use serial_test::serial;

#[test]
#[serial]
fn test_startup_handshake() {
    let env = TestSession::new();
    env.session.start(
        LaunchArgs::new("a.out")
            .with_project_root("/work")
            .with_program_args(vec!["input.txt".to_string()]),
    );
    assert_eq!(env.session.state(), State::Starting1);

    env.prompt("\tOCaml Debugger version 4.14.0\n\n");
    for _ in 0..5 {
        env.prompt("");
    }
    assert_written!(
        env,
        "set loadingmode manual",
        "set checkpoints on",
        "set smallstep 1000",
        "set bigstep 10000",
        "set processcount 15",
        "goto 0",
    );
    assert_eq!(env.session.state(), State::Starting3);

    // socket announcement may come in pieces
    env.feed("Loading program... Waiting for connection...(the sock");
    assert_eq!(env.spawned().len(), 1);
    env.feed(&format!("et is {SOCKET})\n"));

    let spawned = env.spawned();
    assert_eq!(spawned.len(), 2);
    assert_eq!(spawned[1].role, ProcessRole::Debugee);
    assert_eq!(spawned[1].program, "/work/a.out");
    assert_eq!(spawned[1].args, vec!["input.txt"]);
    assert!(spawned[1]
        .env
        .contains(&("CAML_DEBUG_SOCKET".to_string(), SOCKET.to_string())));

    env.prompt("done.\n");
    assert_eq!(env.session.state(), State::Idle);
    assert!(env.written().is_empty());

    let events = env.take_events();
    assert!(events.contains(&SessionEvent::PerspectiveChanged(Perspective::Debug)));
    assert_eq!(events.last(), Some(&SessionEvent::Started));
}

#[test]
#[serial]
fn test_remote_startup() {
    let env = TestSession::new();
    env.session.start(
        LaunchArgs::new("a.out")
            .with_remote_port(Some(9000))
            .with_script_file(Some("init.ocd".into())),
    );
    assert_eq!(env.spawned()[0].args[..2], ["-s", "0.0.0.0:9000"]);

    for _ in 0..6 {
        env.prompt("");
    }
    env.take_written();
    env.feed("Waiting for connection...(the socket is 0.0.0.0:9000)\n");
    // remote program is not launched
    assert_eq!(env.spawned().len(), 1);
    assert!(env
        .take_events()
        .contains(&SessionEvent::WaitingForConnection { port: 9000 }));

    env.prompt("done.\n");
    assert_written!(env, "source init.ocd");
    env.prompt("");
    assert_eq!(env.session.state(), State::Idle);
    assert!(env
        .take_events()
        .contains(&SessionEvent::ConnectionEstablished));
}

#[test]
#[serial]
fn test_second_start_rejected() {
    let env = TestSession::started();
    env.session.start(LaunchArgs::new("b.out"));
    assert_eq!(env.spawned().len(), 2);
    assert_eq!(env.take_messages(MessageKind::Warning).len(), 1);
    assert_eq!(env.session.state(), State::Idle);
}

#[test]
#[serial]
fn test_debugger_spawn_failure() {
    let env = TestSession::with_spawner(common::test_preferences(), MockSpawner::failing());
    env.session.start(LaunchArgs::new("a.out"));

    assert_eq!(env.session.state(), State::NotStarted);
    let events = env.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::Message { kind: MessageKind::Error, .. })));
    assert_eq!(events.last(), Some(&SessionEvent::Terminated));
}

#[test]
#[serial]
fn test_session_restart_after_termination() {
    let env = TestSession::started();
    env.session.kill();
    assert_eq!(env.session.state(), State::NotStarted);

    env.start(LaunchArgs::new("a.out"));
    env.session.step();
    assert_written!(env, "step");
}
