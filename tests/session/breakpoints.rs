use crate::assert_written;
use crate::common::TestSession;
use camlstalker::debugger::{Breakpoint, MessageKind, SessionEvent, State};
use serial_test::serial;

const BREAKPOINT_1: &str = "Breakpoint 1 at 19480: file foo.ml, line 10, characters 3-15\n";
const BREAKPOINT_2: &str = "Breakpoint 2 at 0:21212: file src/bar.ml, line 4, characters 1-20\n";

#[test]
#[serial]
fn test_breakpoint_round_trip() {
    let env = TestSession::started();
    env.session.put_breakpoint_at("Foo", 10, 3);
    assert_eq!(env.session.state(), State::PuttingBreakpoint);
    env.prompt(BREAKPOINT_1);

    assert_written!(env, "break @ Foo 10 3");
    assert_eq!(env.session.state(), State::Idle);
    let breakpoints = env.session.registry().breakpoints();
    assert_eq!(breakpoints, vec![Breakpoint::new(1, 9, 15, "foo.ml")]);
    assert!(env
        .take_events()
        .contains(&SessionEvent::BreakpointsChanged(breakpoints)));

    env.session.remove_breakpoint(1);
    env.prompt("");
    assert_written!(env, "delete 1");
    assert!(env.session.registry().breakpoints().is_empty());
    assert_eq!(env.session.state(), State::Idle);
}

#[test]
#[serial]
fn test_breakpoints_by_file() {
    let env = TestSession::started();
    env.session.put_breakpoint_at("Foo", 10, 3);
    env.prompt(BREAKPOINT_1);
    env.session.put_breakpoint_at("Bar", 4, 1);
    env.prompt(BREAKPOINT_2);

    let registry = env.session.registry();
    assert_eq!(registry.breakpoints().len(), 2);
    assert_eq!(
        registry.breakpoints_in_file("bar.ml"),
        vec![Breakpoint::new(2, 3, 20, "bar.ml")]
    );
    assert!(registry.breakpoints_in_file("baz.ml").is_empty());
}

#[test]
#[serial]
fn test_breakpoint_rejected_by_debugger() {
    let env = TestSession::started();
    env.session.put_breakpoint_at("Foo", 1000, 1);
    env.prompt("Can't find any event there.\n");

    assert_eq!(env.session.state(), State::Idle);
    assert!(env.session.registry().breakpoints().is_empty());
    assert_eq!(env.take_messages(MessageKind::Warning).len(), 1);
}

#[test]
#[serial]
fn test_remove_all_breakpoints() {
    let env = TestSession::started();
    env.session.put_breakpoint_at("Foo", 10, 3);
    env.prompt(BREAKPOINT_1);
    env.session.put_breakpoint_at("Bar", 4, 1);
    env.prompt(BREAKPOINT_2);
    env.take_written();

    env.session.remove_all_breakpoints();
    env.feed("Delete all breakpoints ? (y or n) ");
    assert_eq!(env.session.state(), State::RemovedBreakpoints);
    env.prompt("");

    assert_written!(env, "delete", "y");
    assert!(env.session.registry().breakpoints().is_empty());
    assert_eq!(env.session.state(), State::Idle);
}

#[test]
#[serial]
fn test_unexpected_confirmation_declined() {
    let env = TestSession::started();
    env.session.step();
    env.feed("Delete all breakpoints ? (y or n) ");
    assert_written!(env, "step", "n");
}
