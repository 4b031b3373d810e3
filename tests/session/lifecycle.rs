use crate::assert_written;
use crate::common::TestSession;
use camlstalker::debugger::process::{ProcessRole, TransportEvent};
use camlstalker::debugger::{LaunchArgs, MessageKind, Perspective, SessionEvent, State};
use serial_test::serial;

/// Put a breakpoint and stop somewhere, so there is something to clear on termination.
fn stopped_with_breakpoint(env: &TestSession) {
    env.session.put_breakpoint_at("Foo", 10, 3);
    env.prompt("Breakpoint 1 at 19480: file foo.ml, line 10, characters 3-15\n");
    env.session.run();
    env.prompt("Time: 12 - pc: 19480 - module Foo\nBreakpoint: 1\n10   <|b|>print_int x\n");
    env.prompt("#0 Pc: 19480 Foo char 181\n");
    env.prompt("Backtrace:\n#0 Pc: 19480 Foo char 181\n");
    assert_eq!(env.session.registry().breakpoints().len(), 1);
    assert!(env.session.registry().current_position().is_some());
    env.take_written();
    env.take_events();
}

#[test]
#[serial]
fn test_quit() {
    let env = TestSession::started();
    stopped_with_breakpoint(&env);

    env.session.quit();
    env.feed("The program is running. Quit anyway ? (y or n) ");
    assert_written!(env, "quit", "y");
    assert_eq!(env.session.state(), State::Quitting);

    env.debugger_exit(0);
    assert_eq!(env.session.state(), State::NotStarted);
    assert!(env.session.registry().breakpoints().is_empty());
    assert!(env.session.registry().current_position().is_none());

    let events = env.take_events();
    assert!(events.contains(&SessionEvent::info("debugger terminated")));
    assert!(events.contains(&SessionEvent::BreakpointsChanged(vec![])));
    assert!(events.contains(&SessionEvent::PerspectiveChanged(Perspective::Default)));
    assert_eq!(events.last(), Some(&SessionEvent::Terminated));
}

#[test]
#[serial]
fn test_position_cleared_when_quitting() {
    let env = TestSession::started();
    stopped_with_breakpoint(&env);

    env.session.quit();
    assert_eq!(env.session.state(), State::Quitting);
    assert!(env.session.registry().current_position().is_none());
    assert!(env.take_events().contains(&SessionEvent::RefreshEditor));

    let env = TestSession::started();
    stopped_with_breakpoint(&env);

    env.feed_err("The program \"a.out\" has no debugging info.\n");
    assert_eq!(env.session.state(), State::Quitting);
    assert!(env.session.registry().current_position().is_none());
}

#[test]
#[serial]
fn test_second_quit_kills() {
    let env = TestSession::started();
    stopped_with_breakpoint(&env);

    env.session.quit();
    env.session.quit();

    assert_written!(env, "quit");
    assert_eq!(env.session.state(), State::NotStarted);
    assert!(env.killed().contains(&ProcessRole::Debugger));
    assert!(env.killed().contains(&ProcessRole::Debugee));
    assert!(env.session.registry().breakpoints().is_empty());
    assert!(env.session.registry().current_position().is_none());
}

#[test]
#[serial]
fn test_quit_while_waiting_for_remote() {
    let env = TestSession::new();
    env.session
        .start(LaunchArgs::new("a.out").with_remote_port(Some(8000)));
    for _ in 0..6 {
        env.prompt("");
    }
    env.feed("Waiting for connection...(the socket is 0.0.0.0:8000)\n");
    env.take_written();

    env.session.quit();
    assert!(env.written().is_empty());
    assert_eq!(env.session.state(), State::NotStarted);
    assert_eq!(env.killed(), vec![ProcessRole::Debugger]);
}

#[test]
#[serial]
fn test_quit_rejected() {
    let env = TestSession::new();
    env.session.quit();
    assert_eq!(
        env.take_messages(MessageKind::Warning),
        vec!["please start the debugger first"]
    );

    let env = TestSession::started();
    env.session.step();
    env.session.quit();
    assert_written!(env, "step");
    assert_eq!(env.session.state(), State::Stepping);
}

#[test]
#[serial]
fn test_unexpected_debugger_exit() {
    let env = TestSession::started();
    stopped_with_breakpoint(&env);

    env.debugger_exit(2);
    assert_eq!(env.session.state(), State::NotStarted);
    assert!(env.session.registry().breakpoints().is_empty());
    assert_eq!(env.take_messages(MessageKind::Error).len(), 1);
    assert!(env.killed().contains(&ProcessRole::Debugee));
}

#[test]
#[serial]
fn test_no_debug_info_reported_once() {
    let env = TestSession::started();
    env.feed_err("The program \"a.out\" has no debugging info.\n");
    env.feed_err("The program \"a.out\" has no debugging info.\n");

    assert_eq!(env.take_messages(MessageKind::Error).len(), 1);
    assert_written!(env, "quit");
    assert_eq!(env.session.state(), State::Quitting);
}

#[test]
#[serial]
fn test_fatal_banners_reset_on_start() {
    let env = TestSession::new();
    env.session.start(LaunchArgs::new("a.out"));
    env.feed_err("a.out is not a bytecode file.\n");
    assert_eq!(env.take_messages(MessageKind::Error).len(), 1);
    env.debugger_exit(2);
    env.take_events();

    env.session.start(LaunchArgs::new("a.out"));
    env.feed_err("a.out is not a bytecode file.\n");
    assert_eq!(env.take_messages(MessageKind::Error).len(), 1);
}

#[test]
#[serial]
fn test_lost_connection() {
    let env = TestSession::started();
    env.feed_err("Lost connection with process 4242\n");

    assert_eq!(env.session.state(), State::NotStarted);
    assert!(env.killed().contains(&ProcessRole::Debugger));
    let events = env.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::Message { kind: MessageKind::Error, .. })));
    assert_eq!(events.last(), Some(&SessionEvent::Terminated));
}

#[test]
#[serial]
fn test_stale_output_ignored() {
    let env = TestSession::started();
    env.session.kill();
    env.take_events();

    // reader threads of killed processes may still deliver output
    env.prompt("#0 Pc: 19480 Foo char 181\n");
    env.debugger_exit(137);

    assert_eq!(env.session.state(), State::NotStarted);
    assert!(env.take_events().is_empty());
}

#[test]
#[serial]
fn test_debugee_output_and_exit() {
    let env = TestSession::started();
    env.debugee_event(TransportEvent::Output("hello\n".to_string()));
    env.debugee_event(TransportEvent::Error("oops\n".to_string()));
    assert_eq!(
        env.take_events(),
        vec![
            SessionEvent::DebugeeOutput {
                text: "hello\n".to_string(),
                is_error: false
            },
            SessionEvent::DebugeeOutput {
                text: "oops\n".to_string(),
                is_error: true
            },
        ]
    );
    assert_eq!(env.session.state(), State::Idle);

    env.debugee_event(TransportEvent::Exited(0));
    let events = env.take_events();
    assert_eq!(
        events[..2],
        [
            SessionEvent::info("Program exited with code 0"),
            SessionEvent::DebugeeExited(0),
        ]
    );
    assert_eq!(events.last(), Some(&SessionEvent::Terminated));
    assert_eq!(env.session.state(), State::NotStarted);
    assert_eq!(env.killed(), vec![ProcessRole::Debugger]);
}

#[test]
#[serial]
fn test_bind_failure_reported_before_exit() {
    let env = TestSession::new();
    env.session
        .start(LaunchArgs::new("a.out").with_remote_port(Some(8000)));
    env.feed_err("Unix error: bind failed: Address already in use\n");
    env.debugger_exit(2);

    assert_eq!(
        env.take_messages(MessageKind::Error),
        vec!["Port 8000 is already in use, choose another remote debugging port."]
    );
    assert_eq!(env.session.state(), State::NotStarted);
}
