use crate::assert_written;
use crate::common::TestSession;
use camlstalker::debugger::{LaunchArgs, MessageKind, Session, SessionEvent, State};
use serial_test::serial;

const STOP: &str = "Time: 12 - pc: 19480 - module Foo\n10   <|b|>print_int x\n";
const FRAME: &str = "#0 Pc: 19480 Foo char 181\n";
const BACKTRACE: &str = "Backtrace:\n#0 Pc: 19480 Foo char 181\n#1 Pc: 19500 Foo char 240\n";

#[test]
#[serial]
fn test_execution_chain_without_watches() {
    let commands: [(fn(&Session), &str); 8] = [
        (Session::run, "run"),
        (Session::reverse, "reverse"),
        (Session::step, "step"),
        (Session::backstep, "backstep"),
        (Session::next, "next"),
        (Session::previous, "previous"),
        (Session::step_return, "finish"),
        (Session::backstep_return, "start"),
    ];

    for (command, line) in commands {
        let env = TestSession::started();
        command(&env.session);
        env.prompt(STOP);
        env.prompt(FRAME);
        env.prompt(BACKTRACE);

        assert_eq!(env.take_written(), vec![line, "frame", "bt"]);
        assert_eq!(env.session.state(), State::Idle);
        assert_eq!(env.session.call_stack().len(), 2);
        assert_eq!(
            env.session.registry().position_in_file("foo.ml"),
            Some(181)
        );
    }
}

#[test]
#[serial]
fn test_execution_chain_with_watches() {
    let env = TestSession::started();
    env.session.add_watch("x");
    env.prompt("x: int = 0\n");
    env.session.add_watch("Foo.counter");
    env.prompt("x: int = 0\n");
    env.prompt("Foo.counter: int ref = {contents = 1}\n");
    assert_written!(env, "print x", "print x", "print Foo.counter");
    env.take_events();

    env.session.next();
    env.prompt(STOP);
    env.prompt(FRAME);
    env.prompt(BACKTRACE);
    env.prompt("x: int = 3\n");
    env.prompt("Foo.counter: int ref = {contents = 2}\n");

    assert_written!(env, "next", "frame", "bt", "print x", "print Foo.counter");
    assert_eq!(env.session.state(), State::Idle);

    let watches = env.session.watches();
    assert_eq!(watches[0].value.as_deref(), Some("int = 3"));
    assert_eq!(watches[1].value.as_deref(), Some("int ref = {contents = 2}"));
    assert!(env
        .take_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::WatchesChanged(w) if w == &watches)));
}

#[test]
#[serial]
fn test_chunked_output() {
    let env = TestSession::started();
    env.session.step();
    for chunk in ["Time: 12 - pc: 19480 - mod", "ule Foo\n10   <|b|>print_int x\n(oc", "d) "] {
        env.feed(chunk);
    }
    assert_written!(env, "step", "frame");
}

#[test]
#[serial]
fn test_uncaught_exception() {
    let env = TestSession::started();
    env.session.run();
    env.prompt("Time: 1022\nProgram end.\nUncaught exception: Not_found\n");

    assert_written!(env, "run", "backstep");
    assert_eq!(env.session.state(), State::BackStepping);
    assert_eq!(
        env.take_messages(MessageKind::Warning),
        vec!["Uncaught exception: Not_found"]
    );

    env.prompt(STOP);
    env.prompt(FRAME);
    env.prompt(BACKTRACE);
    assert_written!(env, "frame", "bt");
    assert_eq!(env.session.state(), State::Idle);
}

#[test]
#[serial]
fn test_program_end() {
    let env = TestSession::started();
    env.session.run();
    env.prompt(STOP);
    env.prompt(FRAME);
    env.prompt(BACKTRACE);
    assert!(env.session.registry().current_position().is_some());
    env.take_written();

    env.session.run();
    env.prompt("Time: 1022\nProgram exit.\n");
    assert!(env.session.registry().current_position().is_none());
    env.prompt(FRAME);
    env.prompt("No backtrace available.\n");

    assert_written!(env, "run", "frame", "bt");
    assert!(env.session.registry().current_position().is_none());
    assert_eq!(env.session.state(), State::Idle);
    assert!(env
        .take_events()
        .contains(&SessionEvent::info("Program exit.")));
}

#[test]
#[serial]
fn test_commands_require_started_session() {
    let env = TestSession::new();
    env.session.run();
    env.session.step();
    env.session.put_breakpoint_at("Foo", 1, 1);

    assert!(env.spawned().is_empty());
    assert_eq!(
        env.take_messages(MessageKind::Warning),
        vec!["please start the debugger first"; 3]
    );
    assert_eq!(env.session.state(), State::NotStarted);
}

#[test]
#[serial]
fn test_commands_serialized() {
    let env = TestSession::started();
    env.session.step();
    env.take_events();

    env.session.run();
    env.session.backstep();
    env.session.set_frame(1);
    env.session.remove_all_breakpoints();
    env.session.quit();

    assert_written!(env, "step");
    assert_eq!(env.take_messages(MessageKind::Warning).len(), 5);
    assert_eq!(env.session.state(), State::Stepping);
}

#[test]
#[serial]
fn test_backward_commands_without_checkpoints() {
    let env = TestSession::new();
    env.start(LaunchArgs::new("a.out").with_checkpoints(Some(false)));

    env.session.backstep();
    env.session.reverse();
    env.session.restart();
    assert!(env.written().is_empty());
    assert_eq!(env.session.state(), State::Idle);

    env.session.step();
    assert_written!(env, "step");
}

#[test]
#[serial]
fn test_set_frame() {
    let env = TestSession::started();
    env.session.set_frame(1);
    env.prompt("#1 Pc: 19500 Foo char 240\n");

    assert_written!(env, "frame 1");
    assert_eq!(env.session.state(), State::Idle);
    assert_eq!(
        env.session.registry().position_in_file("foo.ml"),
        Some(240)
    );
}
