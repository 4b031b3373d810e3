use camlstalker::debugger::error::Error;
use camlstalker::debugger::process::{
    ChildProcess, OutputSink, ProcessRole, ProcessSpawner, SpawnSpec, TransportEvent,
};
use camlstalker::debugger::{
    EventReceiver, LaunchArgs, MessageKind, Preferences, Session, SessionBuilder, SessionEvent,
    State,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

pub const PROMPT: &str = "(ocd) ";
pub const SOCKET: &str = "/tmp/camls-test-socket";

#[derive(Default)]
struct Transcript {
    written: Vec<String>,
    spawned: Vec<SpawnSpec>,
    killed: Vec<ProcessRole>,
    debugger_sink: Option<OutputSink>,
    debugee_sink: Option<OutputSink>,
}

/// Spawner of fake processes. Everything written to the debugger stdin is recorded,
/// debugger output is simulated by a test.
#[derive(Default, Clone)]
pub struct MockSpawner {
    transcript: Arc<Mutex<Transcript>>,
    fail_debugger: bool,
}

impl MockSpawner {
    pub fn failing() -> Self {
        Self {
            fail_debugger: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap()
    }
}

impl ProcessSpawner for MockSpawner {
    fn spawn(&self, spec: &SpawnSpec, sink: OutputSink) -> Result<Box<dyn ChildProcess>, Error> {
        if self.fail_debugger && spec.role == ProcessRole::Debugger {
            return Err(Error::Spawn(
                spec.program.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            ));
        }

        let mut transcript = self.lock();
        transcript.spawned.push(spec.clone());
        match spec.role {
            ProcessRole::Debugger => transcript.debugger_sink = Some(sink),
            ProcessRole::Debugee => transcript.debugee_sink = Some(sink),
        }
        Ok(Box::new(MockProcess {
            role: spec.role,
            transcript: self.transcript.clone(),
        }))
    }
}

struct MockProcess {
    role: ProcessRole,
    transcript: Arc<Mutex<Transcript>>,
}

impl ChildProcess for MockProcess {
    fn pid(&self) -> Option<u32> {
        None
    }

    fn write_line(&mut self, line: &str) -> Result<(), Error> {
        if self.role == ProcessRole::Debugger {
            self.transcript.lock().unwrap().written.push(line.to_string());
        }
        Ok(())
    }

    fn kill(&mut self) -> Result<(), Error> {
        self.transcript.lock().unwrap().killed.push(self.role);
        Ok(())
    }
}

pub fn test_preferences() -> Preferences {
    Preferences {
        display_timeout_ms: 300,
        ..Preferences::default()
    }
}

/// Session driven by a fake debugger.
pub struct TestSession {
    pub session: Arc<Session>,
    pub events: EventReceiver,
    spawner: MockSpawner,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_spawner(test_preferences(), MockSpawner::default())
    }

    pub fn with_spawner(prefs: Preferences, spawner: MockSpawner) -> Self {
        let (session, events) = SessionBuilder::new(prefs)
            .with_spawner(Arc::new(spawner.clone()))
            .build();
        Self {
            session,
            events,
            spawner,
        }
    }

    /// Start a session and complete the startup handshake of a local program.
    pub fn started() -> Self {
        let env = Self::new();
        env.start(LaunchArgs::new("a.out"));
        env
    }

    pub fn start(&self, args: LaunchArgs) {
        self.session.start(args);
        self.prompt("\tOCaml Debugger version 4.14.0\n\n");
        for _ in 0..5 {
            self.prompt("");
        }
        self.feed(&format!(
            "Loading program... Waiting for connection...(the socket is {SOCKET})\n"
        ));
        self.prompt("done.\n");
        assert_eq!(self.session.state(), State::Idle);
        self.take_written();
        self.take_events();
    }

    fn debugger_sink(&self) -> OutputSink {
        // sink is called without the transcript lock, a session may spawn a debuggee in it
        self.spawner
            .lock()
            .debugger_sink
            .clone()
            .expect("debugger must be spawned")
    }

    /// Simulate a debugger stdout chunk.
    pub fn feed(&self, chunk: &str) {
        (self.debugger_sink())(TransportEvent::Output(chunk.to_string()));
    }

    /// Simulate debugger output that ends with a prompt.
    pub fn prompt(&self, output: &str) {
        self.feed(&format!("{output}{PROMPT}"));
    }

    /// Simulate a debugger stderr chunk.
    pub fn feed_err(&self, chunk: &str) {
        (self.debugger_sink())(TransportEvent::Error(chunk.to_string()));
    }

    pub fn debugger_exit(&self, code: i32) {
        (self.debugger_sink())(TransportEvent::Exited(code));
    }

    pub fn debugee_event(&self, event: TransportEvent) {
        let sink = self
            .spawner
            .lock()
            .debugee_sink
            .clone()
            .expect("debugee must be spawned");
        sink(event);
    }

    pub fn written(&self) -> Vec<String> {
        self.spawner.lock().written.clone()
    }

    pub fn take_written(&self) -> Vec<String> {
        std::mem::take(&mut self.spawner.lock().written)
    }

    pub fn spawned(&self) -> Vec<SpawnSpec> {
        self.spawner.lock().spawned.clone()
    }

    pub fn killed(&self) -> Vec<ProcessRole> {
        self.spawner.lock().killed.clone()
    }

    pub fn take_events(&self) -> Vec<SessionEvent> {
        self.events.try_iter().collect()
    }

    /// Texts of messages from all pending events.
    pub fn take_messages(&self, kind: MessageKind) -> Vec<String> {
        self.take_events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Message { text, kind: k } if k == kind => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Wait until a command is written to the debugger.
    pub fn wait_written(&self, line: &str) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.written().iter().any(|l| l == line) {
            assert!(Instant::now() < deadline, "`{line}` is never written");
            thread::sleep(Duration::from_millis(5));
        }
    }
}

#[macro_export]
macro_rules! assert_written {
    ($env: expr, $($line: expr),* $(,)?) => {{
        let expected: Vec<&str> = vec![$($line),*];
        assert_eq!($env.take_written(), expected);
    }};
}
