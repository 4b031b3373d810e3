//! Debugger session: owns debugger and debuggee processes and drives the state machine
//! with their output.
//!
//! All state is kept behind a single mutex. Host commands and reader threads of child
//! processes take it in turn, so every input is processed atomically: a debugger output
//! chunk is decoded, state transition performed and the resulting commands written before
//! the next input is accepted.

use crate::debugger::config::{LaunchArgs, Preferences};
use crate::debugger::error::Error;
use crate::debugger::event::{EventReceiver, EventSender, SessionEvent};
use crate::debugger::location::{SourceOutline, StackFrame, TopLevelScanner};
use crate::debugger::machine::{Action, Machine};
use crate::debugger::process::{
    ChildProcess, OsSpawner, OutputSink, ProcessRole, ProcessSpawner, TransportEvent,
};
use crate::debugger::registry::Registry;
use crate::debugger::state::State;
use crate::debugger::watch::WatchVariable;
use crate::log::PROTOCOL_TARGET;
use crate::{cs_debug, cs_error, cs_info, cs_warn, weak_error};
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// Result of a blocking expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Debugger answer, like `int = 5`.
    Value(String),
    /// Session can't evaluate now: it is not started, executes a command, or the
    /// answer didn't arrive in time.
    Busy,
    /// Expression rejected before it reached the debugger.
    Empty,
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluation::Value(value) => f.write_str(value),
            Evaluation::Busy => f.write_str("<busy>"),
            Evaluation::Empty => Ok(()),
        }
    }
}

struct Inner {
    machine: Machine,
    debugger: Option<Box<dyn ChildProcess>>,
    debugee: Option<Box<dyn ChildProcess>>,
    /// Incremented every time child processes are dropped, output of processes from
    /// an older epoch is ignored.
    epoch: u64,
    /// Last evaluation result with its generation.
    evaluation: Option<(u64, String)>,
    events: EventSender,
}

impl Inner {
    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            cs_debug!("session event dropped, host receiver is gone");
        }
    }
}

/// Session builder.
pub struct SessionBuilder {
    prefs: Preferences,
    registry: Option<Arc<Registry>>,
    spawner: Option<Arc<dyn ProcessSpawner>>,
    outline: Option<Arc<dyn SourceOutline>>,
}

impl SessionBuilder {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs,
            registry: None,
            spawner: None,
            outline: None,
        }
    }

    /// Share a breakpoint registry with a host.
    pub fn with_registry(self, registry: Arc<Registry>) -> Self {
        Self {
            registry: Some(registry),
            ..self
        }
    }

    pub fn with_spawner(self, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            spawner: Some(spawner),
            ..self
        }
    }

    pub fn with_outline(self, outline: Arc<dyn SourceOutline>) -> Self {
        Self {
            outline: Some(outline),
            ..self
        }
    }

    /// Create a session and a receiver of its events.
    pub fn build(self) -> (Arc<Session>, EventReceiver) {
        let (tx, rx) = mpsc::channel();
        let registry = self.registry.unwrap_or_default();
        let spawner = self.spawner.unwrap_or_else(|| Arc::new(OsSpawner));
        let outline = self.outline.unwrap_or_else(|| Arc::new(TopLevelScanner));
        let display_timeout = self.prefs.display_timeout();

        let session = Arc::new_cyclic(|me| Session {
            me: me.clone(),
            inner: Mutex::new(Inner {
                machine: Machine::new(self.prefs, registry.clone(), outline),
                debugger: None,
                debugee: None,
                epoch: 0,
                evaluation: None,
                events: tx,
            }),
            evaluated: Condvar::new(),
            spawner,
            registry,
            display_timeout,
        });
        (session, rx)
    }
}

/// Controller of a single debugger process. A session may be started again after it is
/// terminated.
pub struct Session {
    me: Weak<Session>,
    inner: Mutex<Inner>,
    evaluated: Condvar,
    spawner: Arc<dyn ProcessSpawner>,
    registry: Arc<Registry>,
    display_timeout: Duration,
}

macro_rules! command {
    ($(#[$meta:meta])* $name: ident) => {
        $(#[$meta])*
        pub fn $name(&self) {
            self.command(Machine::$name)
        }
    };
}

impl Session {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn state(&self) -> State {
        self.lock().machine.state()
    }

    pub fn is_started(&self) -> bool {
        self.lock().machine.is_started()
    }

    pub fn watches(&self) -> Vec<WatchVariable> {
        self.lock().machine.watches()
    }

    pub fn call_stack(&self) -> Vec<StackFrame> {
        self.lock().machine.call_stack().to_vec()
    }

    pub fn preferences(&self) -> Preferences {
        self.lock().machine.preferences().clone()
    }

    fn sink(&self, epoch: u64, role: ProcessRole) -> OutputSink {
        let session = self.me.clone();
        Arc::new(move |event| {
            if let Some(session) = session.upgrade() {
                session.on_transport_event(epoch, role, event);
            }
        })
    }

    /// Spawn the debugger and begin the startup handshake.
    pub fn start(&self, args: LaunchArgs) {
        let mut inner = self.lock();
        let spec = match inner.machine.start(args) {
            Ok(spec) => spec,
            Err(e) => {
                inner.emit(SessionEvent::warning(e.to_string()));
                return;
            }
        };

        inner.epoch += 1;
        let sink = self.sink(inner.epoch, ProcessRole::Debugger);
        cs_info!("start {} {}", spec.program, spec.args.join(" "));
        match self.spawner.spawn(&spec, sink) {
            Ok(process) => inner.debugger = Some(process),
            Err(e) => {
                cs_error!("start debugger: {e}");
                inner.emit(SessionEvent::error(format!("Cannot start debugger: {e}")));
                let actions = inner.machine.teardown();
                self.apply(&mut inner, actions);
            }
        }
    }

    fn command(&self, f: impl FnOnce(&mut Machine) -> Vec<Action>) {
        let mut inner = self.lock();
        let actions = f(&mut inner.machine);
        self.apply(&mut inner, actions);
    }

    command!(
        /// Continue execution until a breakpoint or the program end.
        run
    );
    command!(
        /// Run backwards until a breakpoint or the program beginning.
        reverse
    );
    command!(step);
    command!(backstep);
    command!(
        /// Step over function calls.
        next
    );
    command!(
        /// Backstep over function calls.
        previous
    );
    command!(
        /// Run until the current function returns.
        step_return
    );
    command!(
        /// Run backwards to the call of the current function.
        backstep_return
    );
    command!(
        /// Go back to the beginning of the program.
        restart
    );
    command!(remove_all_breakpoints);
    command!(clear_watches);
    command!(refresh_watches);

    /// Put a breakpoint at one-based line and column of a module.
    pub fn put_breakpoint_at(&self, module: &str, line: usize, column: usize) {
        self.command(|m| m.put_breakpoint_at(module, line, column))
    }

    pub fn remove_breakpoint(&self, number: u32) {
        self.command(|m| m.remove_breakpoint(number))
    }

    pub fn set_frame(&self, number: u32) {
        self.command(|m| m.set_frame(number))
    }

    pub fn add_watch(&self, expression: &str) {
        self.command(|m| m.add_watch(expression))
    }

    pub fn remove_watch(&self, index: usize) {
        self.command(|m| m.remove_watch(index))
    }

    /// Ask the debugger to quit. Killing is used when the debugger is already quitting or is
    /// blocked waiting for a debuggee.
    pub fn quit(&self) {
        self.command(Machine::quit)
    }

    /// Kill debugger and debuggee, tear the session down.
    pub fn kill(&self) {
        self.command(|_| vec![Action::Kill])
    }

    /// Evaluate an expression and wait for the answer at most for the configured timeout.
    ///
    /// A timed out evaluation returns [`Evaluation::Busy`], the late answer is discarded
    /// when it arrives.
    pub fn display(&self, expression: &str) -> Evaluation {
        let mut inner = self.lock();
        let (generation, actions) = match inner.machine.display(expression) {
            Ok(request) => request,
            Err(e @ (Error::NotStarted | Error::Busy(_))) => {
                inner.emit(SessionEvent::warning(e.to_string()));
                return Evaluation::Busy;
            }
            Err(e) => {
                inner.emit(SessionEvent::warning(e.to_string()));
                return Evaluation::Empty;
            }
        };

        inner.evaluation = None;
        self.apply(&mut inner, actions);

        let wait = self
            .evaluated
            .wait_timeout_while(inner, self.display_timeout, |inner| {
                inner.machine.is_started()
                    && !matches!(&inner.evaluation, Some((g, _)) if *g == generation)
            });
        let (mut inner, timeout) = match wait {
            Ok(result) => result,
            Err(poisoned) => poisoned.into_inner(),
        };

        match inner.evaluation.take() {
            Some((g, value)) if g == generation => Evaluation::Value(value),
            other => {
                inner.evaluation = other;
                if timeout.timed_out() {
                    cs_warn!("evaluation of `{expression}` timed out");
                    Evaluation::Busy
                } else {
                    Evaluation::Empty
                }
            }
        }
    }

    fn on_transport_event(&self, epoch: u64, role: ProcessRole, event: TransportEvent) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            cs_debug!("stale {role} event ignored: {event:?}");
            return;
        }

        let actions = match (role, event) {
            (ProcessRole::Debugger, TransportEvent::Output(chunk)) => {
                cs_debug!(target: PROTOCOL_TARGET, "< {chunk:?}");
                inner.machine.on_output(&chunk)
            }
            (ProcessRole::Debugger, TransportEvent::Error(chunk)) => {
                inner.machine.on_error_output(&chunk)
            }
            (ProcessRole::Debugger, TransportEvent::Exited(code)) => {
                cs_info!("debugger exited with code {code}");
                inner.debugger = None;
                self.drop_processes(&mut inner);
                let actions = inner.machine.on_debugger_exit(code);
                self.evaluated.notify_all();
                actions
            }
            (ProcessRole::Debugee, TransportEvent::Output(text)) => {
                vec![Action::Emit(SessionEvent::DebugeeOutput {
                    text,
                    is_error: false,
                })]
            }
            (ProcessRole::Debugee, TransportEvent::Error(text)) => {
                vec![Action::Emit(SessionEvent::DebugeeOutput {
                    text,
                    is_error: true,
                })]
            }
            // program is gone, the session can't go on without it
            (ProcessRole::Debugee, TransportEvent::Exited(code)) => {
                inner.debugee = None;
                vec![
                    Action::Emit(SessionEvent::info(format!(
                        "Program exited with code {code}"
                    ))),
                    Action::Emit(SessionEvent::DebugeeExited(code)),
                    Action::Kill,
                ]
            }
        };

        self.apply(&mut inner, actions);
    }

    /// Kill remaining child processes, output they may still produce is ignored.
    fn drop_processes(&self, inner: &mut Inner) {
        inner.epoch += 1;
        for (role, process) in [
            (ProcessRole::Debugee, inner.debugee.take()),
            (ProcessRole::Debugger, inner.debugger.take()),
        ] {
            if let Some(mut process) = process {
                cs_debug!("kill {role} process {:?}", process.pid());
                weak_error!(process.kill(), "kill process:");
            }
        }
    }

    fn apply(&self, inner: &mut Inner, actions: Vec<Action>) {
        let mut queue = VecDeque::from(actions);
        while let Some(action) = queue.pop_front() {
            match action {
                Action::Send(line) => {
                    cs_debug!(target: PROTOCOL_TARGET, "> {line}");
                    let Some(debugger) = inner.debugger.as_mut() else {
                        cs_warn!("debugger is not running, `{line}` not sent");
                        continue;
                    };
                    if let Err(e) = debugger.write_line(&line) {
                        cs_error!("send `{line}`: {e}");
                        inner.emit(SessionEvent::error(format!("Cannot send `{line}`: {e}")));
                        if e.is_fatal() {
                            queue.push_back(Action::Kill);
                        }
                    }
                }
                Action::Emit(event) => inner.emit(event),
                Action::LaunchDebugee { socket } => {
                    if let Err(e) = self.launch_debugee(inner, &socket) {
                        cs_error!("launch debugee: {e}");
                        inner.emit(SessionEvent::error(format!("Cannot start program: {e}")));
                        queue.push_back(Action::Kill);
                    }
                }
                Action::Kill => {
                    self.drop_processes(inner);
                    queue.extend(inner.machine.teardown());
                    self.evaluated.notify_all();
                }
                Action::Evaluated { generation, value } => {
                    inner.evaluation = Some((generation, value));
                    self.evaluated.notify_all();
                }
            }
        }
    }

    fn launch_debugee(&self, inner: &mut Inner, socket: &str) -> Result<(), Error> {
        let spec = inner.machine.debugee_spec(socket)?;
        let sink = self.sink(inner.epoch, ProcessRole::Debugee);
        cs_info!("start {} with {socket}", spec.program);
        inner.debugee = Some(self.spawner.spawn(&spec, sink)?);
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let inner = self
            .inner
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for mut process in [inner.debugee.take(), inner.debugger.take()]
            .into_iter()
            .flatten()
        {
            weak_error!(process.kill(), "kill process:");
        }
    }
}
