use crate::common::TestSession;
use camlstalker::debugger::{Evaluation, State};
use serial_test::serial;
use std::thread;
use std::time::{Duration, Instant};

#[test]
#[serial]
fn test_display_value() {
    let env = TestSession::started();
    let session = env.session.clone();
    let evaluation = thread::spawn(move || session.display("x"));

    env.wait_written("print x");
    env.prompt("x: int = 5\n");

    assert_eq!(evaluation.join().unwrap(), Evaluation::Value("int = 5".to_string()));
    assert_eq!(env.session.state(), State::Idle);
}

#[test]
#[serial]
fn test_display_timeout() {
    let env = TestSession::started();
    let now = Instant::now();
    let evaluation = env.session.display("x");

    assert_eq!(evaluation, Evaluation::Busy);
    assert!(now.elapsed() >= Duration::from_millis(300));
    assert!(now.elapsed() < Duration::from_secs(2));
    assert_eq!(env.session.state(), State::Displaying);
}

#[test]
#[serial]
fn test_late_display_result_discarded() {
    let env = TestSession::started();
    assert_eq!(env.session.display("x"), Evaluation::Busy);
    // answer of the timed out evaluation
    env.prompt("x: int = 1\n");
    assert_eq!(env.session.state(), State::Idle);
    env.take_written();

    let session = env.session.clone();
    let evaluation = thread::spawn(move || session.display("y"));
    env.wait_written("print y");
    env.prompt("y: string = \"hello\"\n");

    assert_eq!(
        evaluation.join().unwrap(),
        Evaluation::Value("string = \"hello\"".to_string())
    );
}

#[test]
#[serial]
fn test_display_rejected() {
    let env = TestSession::new();
    assert_eq!(env.session.display("x"), Evaluation::Busy);

    let env = TestSession::started();
    env.session.step();
    assert_eq!(env.session.display("x"), Evaluation::Busy);
    assert_eq!(env.written(), vec!["step"]);
}

#[test]
#[serial]
fn test_display_invalid_expression() {
    let env = TestSession::started();
    assert_eq!(env.session.display("   "), Evaluation::Empty);
    assert_eq!(env.session.display("x; quit"), Evaluation::Empty);
    assert!(env.written().is_empty());
    assert_eq!(env.session.state(), State::Idle);
}

#[test]
#[serial]
fn test_display_interrupted_by_kill() {
    let env = TestSession::started();
    let session = env.session.clone();
    let evaluation = thread::spawn(move || session.display("x"));

    env.wait_written("print x");
    env.session.kill();

    assert_eq!(evaluation.join().unwrap(), Evaluation::Empty);
    assert_eq!(env.session.state(), State::NotStarted);
}
