//! Session state machine.
//!
//! [`Machine`] holds no processes and performs no I/O: every input (debugger output, host
//! command) produces a list of [`Action`]s that the owning session executes in order. This
//! makes the whole transition table testable without a real debugger.

use crate::debugger::config::{LaunchArgs, Preferences};
use crate::debugger::decoder::{Frame, OutputDecoder};
use crate::debugger::error::Error;
use crate::debugger::event::{Perspective, SessionEvent};
use crate::debugger::expression;
use crate::debugger::location::{Resolver, SourceOutline, StackFrame};
use crate::debugger::pattern::{self, Banner, Confirmation, Fatal, FrameLocation};
use crate::debugger::process::{ProcessRole, SpawnSpec};
use crate::debugger::registry::Registry;
use crate::debugger::state::State;
use crate::debugger::watch::{WatchList, WatchVariable};
use crate::log::PROTOCOL_TARGET;
use crate::{cs_debug, cs_error, cs_warn, internal_error};
use std::path::Path;
use std::sync::Arc;

/// Environment variable that tells a debuggee where the debugger listens.
pub const DEBUG_SOCKET_ENV: &str = "CAML_DEBUG_SOCKET";

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write a command line to the debugger.
    Send(String),
    /// Notify the host.
    Emit(SessionEvent),
    /// Spawn a local debuggee connected to the socket.
    LaunchDebugee { socket: String },
    /// Kill debugger and debuggee processes and tear the session down.
    Kill,
    /// Result of an evaluation requested by `display`.
    Evaluated { generation: u64, value: String },
}

/// Fatal banners already reported to the user.
#[derive(Default)]
struct FatalReports {
    no_debug_info: bool,
    not_bytecode: bool,
    bind_failed: bool,
}

pub struct Machine {
    state: State,
    decoder: OutputDecoder,
    prefs: Preferences,
    args: Option<LaunchArgs>,
    registry: Arc<Registry>,
    resolver: Resolver,
    watches: WatchList,
    /// Index of the watch expression being evaluated.
    watch_cursor: usize,
    /// Number of a breakpoint in removal.
    pending_removal: Option<u32>,
    /// Program reached its end or beginning: frame of this cycle is not highlighted.
    terminal_cycle: bool,
    /// Generation of the last requested evaluation.
    evaluation: u64,
    reported: FatalReports,
    call_stack: Vec<StackFrame>,
}

fn reject(err: Error) -> Vec<Action> {
    cs_debug!("command rejected: {err}");
    vec![Action::Emit(SessionEvent::warning(err.to_string()))]
}

fn send(line: impl Into<String>) -> Action {
    Action::Send(line.into())
}

fn emit(event: SessionEvent) -> Action {
    Action::Emit(event)
}

impl Machine {
    pub fn new(prefs: Preferences, registry: Arc<Registry>, outline: Arc<dyn SourceOutline>) -> Self {
        Self {
            state: State::NotStarted,
            decoder: OutputDecoder::new(),
            prefs,
            args: None,
            registry,
            resolver: Resolver::new(outline),
            watches: WatchList::default(),
            watch_cursor: 0,
            pending_removal: None,
            terminal_cycle: false,
            evaluation: 0,
            reported: FatalReports::default(),
            call_stack: vec![],
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state != State::NotStarted
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn watches(&self) -> Vec<WatchVariable> {
        self.watches.snapshot()
    }

    pub fn call_stack(&self) -> &[StackFrame] {
        &self.call_stack
    }

    fn checkpoints(&self) -> bool {
        self.args
            .as_ref()
            .and_then(|args| args.checkpoints)
            .unwrap_or(self.prefs.checkpoints)
    }

    /// Accept user commands only in `Idle` state of a started session.
    fn idle(&self) -> Result<(), Error> {
        match self.state {
            State::NotStarted => Err(Error::NotStarted),
            State::Idle => Ok(()),
            state => Err(Error::Busy(state)),
        }
    }

    // --------------------------------- lifecycle -------------------------------------------------

    /// Begin a new session, return a spawn specification of the debugger process.
    pub fn start(&mut self, mut args: LaunchArgs) -> Result<SpawnSpec, Error> {
        if self.is_started() {
            return Err(Error::AlreadyStarted);
        }

        if args.program.is_relative() && !args.project_root.as_os_str().is_empty() {
            args.program = args.project_root.join(&args.program);
        }

        let mut spec = SpawnSpec::new(ProcessRole::Debugger, &self.prefs.debugger);
        if let Some(port) = args.remote_port {
            spec.args.push("-s".to_string());
            spec.args.push(format!("0.0.0.0:{port}"));
        }
        for path in &args.search_paths {
            let dir = if path.is_absolute() {
                path.clone()
            } else {
                args.project_root.join(path)
            };
            spec.args.push("-I".to_string());
            spec.args.push(dir.to_string_lossy().to_string());
        }
        spec.args.push(args.program.to_string_lossy().to_string());
        spec.args.extend(args.program_args.iter().cloned());
        spec.cwd = cwd(&args.project_root);

        self.resolver
            .configure(args.project_root.clone(), args.search_paths.clone());
        self.decoder.clear();
        self.reported = FatalReports::default();
        self.pending_removal = None;
        self.terminal_cycle = false;
        self.call_stack.clear();
        self.args = Some(args);
        self.state = State::Starting1;

        Ok(spec)
    }

    /// Return a spawn specification of a local debuggee connected to `socket`.
    pub fn debugee_spec(&self, socket: &str) -> Result<SpawnSpec, Error> {
        let args = self.args.as_ref().ok_or(Error::NotStarted)?;
        let mut spec = SpawnSpec::new(ProcessRole::Debugee, args.program.to_string_lossy());
        spec.args = args.program_args.clone();
        spec.env
            .push((DEBUG_SOCKET_ENV.to_string(), socket.to_string()));
        spec.cwd = cwd(&args.project_root);
        Ok(spec)
    }

    /// Reset the session into `NotStarted` state, drop breakpoints and execution position.
    pub fn teardown(&mut self) -> Vec<Action> {
        if !self.is_started() {
            return vec![];
        }

        self.state = State::NotStarted;
        self.decoder.clear();
        self.pending_removal = None;
        self.call_stack.clear();
        self.registry.clear();

        vec![
            emit(SessionEvent::BreakpointsChanged(vec![])),
            emit(SessionEvent::CallStackChanged(vec![])),
            emit(SessionEvent::RefreshEditor),
            emit(SessionEvent::PerspectiveChanged(Perspective::Default)),
            emit(SessionEvent::Terminated),
        ]
    }

    /// Debugger process exited.
    pub fn on_debugger_exit(&mut self, code: i32) -> Vec<Action> {
        if !self.is_started() {
            return vec![];
        }

        let mut actions = vec![];
        if self.state != State::Quitting {
            let msg = format!("debugger exited unexpectedly with code {code}");
            cs_warn!("{msg}");
            actions.push(emit(SessionEvent::error(msg)));
        } else {
            actions.push(emit(SessionEvent::info("debugger terminated")));
        }
        actions.extend(self.teardown());
        actions
    }

    // --------------------------------- debugger output -------------------------------------------

    /// Handle a stdout chunk of the debugger.
    pub fn on_output(&mut self, chunk: &str) -> Vec<Action> {
        if !self.is_started() {
            cs_debug!(target: PROTOCOL_TARGET, "output ignored, session not started: {chunk:?}");
            return vec![];
        }

        self.decoder.push(chunk);
        match self.decoder.decode(self.state == State::Starting3) {
            Frame::Incomplete => vec![],
            Frame::Prompt(output) => {
                cs_debug!(target: PROTOCOL_TARGET, "< [{}] {output:?}", self.state);
                self.on_prompt(output)
            }
            Frame::SocketAnnounced { socket, .. } => self.on_socket(socket),
            Frame::ConfirmationPrompt { kind, output } => self.on_confirmation(kind, &output),
        }
    }

    /// Handle a stderr chunk of the debugger, fatal conditions are checked here.
    pub fn on_error_output(&mut self, chunk: &str) -> Vec<Action> {
        cs_debug!(target: PROTOCOL_TARGET, "<! {chunk:?}");
        if !self.is_started() {
            return vec![];
        }

        let Some(fatal) = pattern::detect_fatal(chunk) else {
            return vec![];
        };

        let mut actions = vec![];
        let (reported, msg) = match fatal {
            Fatal::NoDebugInfo => (
                &mut self.reported.no_debug_info,
                "The program has no debugging info. Compile it with the `-g` option.".to_string(),
            ),
            Fatal::NotBytecode => (
                &mut self.reported.not_bytecode,
                "The program is not a bytecode executable, only bytecode programs can be debugged."
                    .to_string(),
            ),
            Fatal::BindFailed => {
                let port = self
                    .args
                    .as_ref()
                    .and_then(|args| args.remote_port)
                    .unwrap_or(self.prefs.remote_port);
                (
                    &mut self.reported.bind_failed,
                    format!("Port {port} is already in use, choose another remote debugging port."),
                )
            }
            Fatal::LostConnection(pid) => {
                let msg = format!("Lost connection with process {pid}");
                cs_warn!("{msg}");
                return vec![emit(SessionEvent::error(msg)), Action::Kill];
            }
        };

        if !*reported {
            *reported = true;
            cs_warn!("{msg}");
            actions.push(emit(SessionEvent::error(msg)));
        }
        actions.extend(self.force_quit());
        actions
    }

    fn force_quit(&mut self) -> Vec<Action> {
        match self.state {
            State::NotStarted | State::Quitting => vec![],
            _ => {
                self.decoder.clear();
                self.enter_quitting()
            }
        }
    }

    /// Position is meaningless once quitting begins, whatever the debugger answers.
    fn enter_quitting(&mut self) -> Vec<Action> {
        self.state = State::Quitting;
        self.registry.clear_current_position();
        vec![emit(SessionEvent::RefreshEditor), send("quit")]
    }

    fn incoherent(&mut self, output: &str) -> Vec<Action> {
        let err = Error::IncoherentState(self.state, output.trim().to_string());
        cs_error!("{err}");
        vec![emit(SessionEvent::error(err.to_string()))]
    }

    fn handshake(&mut self, next: State, command: String) -> Vec<Action> {
        self.state = next;
        vec![send(command)]
    }

    fn on_prompt(&mut self, output: String) -> Vec<Action> {
        match self.state {
            State::Starting1 => self.handshake(State::Starting1a, "set loadingmode manual".into()),
            State::Starting1a => {
                let flag = if self.checkpoints() { "on" } else { "off" };
                self.handshake(State::Starting1b, format!("set checkpoints {flag}"))
            }
            State::Starting1b => {
                let cmd = format!("set smallstep {}", self.prefs.small_step);
                self.handshake(State::Starting1c, cmd)
            }
            State::Starting1c => {
                let cmd = format!("set bigstep {}", self.prefs.big_step);
                self.handshake(State::Starting1d, cmd)
            }
            State::Starting1d => {
                let cmd = format!("set processcount {}", self.prefs.process_count);
                self.handshake(State::Starting2, cmd)
            }
            State::Starting2 => self.handshake(State::Starting3, "goto 0".into()),
            State::Starting3a => {
                let script = self
                    .args
                    .as_ref()
                    .and_then(|args| args.script_file.as_ref())
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.handshake(State::Starting4, format!("source {script}"))
            }
            State::Starting4 => self.on_started(),

            state if state.is_execution() => self.after_execution(&output),
            State::Frame => self.on_frame(&output),
            State::BackTrace => self.on_backtrace(&output),
            State::DisplayingWatchVars => self.on_watch_value(&output),
            State::PuttingBreakpoint => self.on_breakpoint_set(&output),
            State::RemovingBreakpoint => self.on_breakpoint_removed(),
            State::RemovingBreakpoints | State::RemovedBreakpoints => {
                self.on_breakpoints_removed()
            }
            State::Displaying => {
                self.state = State::Idle;
                vec![Action::Evaluated {
                    generation: self.evaluation,
                    value: pattern::parse_evaluation(&output),
                }]
            }
            State::SettingFrame => {
                let mut actions = match pattern::parse_frame(&output) {
                    Some(frame) => self.highlight_frame(&frame),
                    None => {
                        cs_error!("{}", Error::UnparsableResponse("frame", output.clone()));
                        vec![]
                    }
                };
                self.state = State::Idle;
                actions.push(emit(SessionEvent::RefreshEditor));
                actions
            }
            State::Quitting => {
                cs_debug!("prompt while quitting, wait for debugger exit");
                vec![]
            }
            // NotStarted, Idle or Starting3
            _ => self.incoherent(&output),
        }
    }

    fn on_socket(&mut self, socket: String) -> Vec<Action> {
        if self.state != State::Starting3 {
            return self.incoherent(&socket);
        }

        let Some(args) = self.args.as_ref() else {
            return self.incoherent(&socket);
        };
        self.state = if args.script_file.is_some() {
            State::Starting3a
        } else {
            State::Starting4
        };

        match args.remote_port {
            Some(port) => {
                cs_debug!("debugger waits for remote debuggee at {socket}");
                vec![emit(SessionEvent::WaitingForConnection { port })]
            }
            None => vec![Action::LaunchDebugee { socket }],
        }
    }

    fn on_confirmation(&mut self, kind: Confirmation, output: &str) -> Vec<Action> {
        match (self.state, kind) {
            (State::RemovingBreakpoints, Confirmation::DeleteAllBreakpoints) => {
                self.state = State::RemovedBreakpoints;
                vec![send("y")]
            }
            (State::Quitting, Confirmation::QuitAnyway) => vec![send("y")],
            (state, _) => {
                cs_warn!("unexpected question in state {state}: {}", output.trim());
                vec![send("n")]
            }
        }
    }

    fn on_started(&mut self) -> Vec<Action> {
        self.state = State::Idle;
        let mut actions = vec![];
        if self.args.as_ref().is_some_and(LaunchArgs::is_remote) {
            actions.push(emit(SessionEvent::ConnectionEstablished));
        }
        actions.push(emit(SessionEvent::PerspectiveChanged(Perspective::Debug)));
        actions.push(emit(SessionEvent::info("debugger started")));
        actions.push(emit(SessionEvent::Started));
        actions
    }

    // --------------------------------- execution chain -------------------------------------------

    fn after_execution(&mut self, output: &str) -> Vec<Action> {
        match pattern::detect_banner(output) {
            Some(Banner::UncaughtException(exception)) => {
                // ungated, without checkpoints the debugger replays the program to step back
                self.state = State::BackStepping;
                vec![
                    emit(SessionEvent::warning(format!("Uncaught exception: {exception}"))),
                    send("backstep"),
                ]
            }
            Some(banner) => {
                let msg = match banner {
                    Banner::ProgramBeginning => "Beginning of program.",
                    _ => "Program exit.",
                };
                self.terminal_cycle = true;
                self.registry.clear_current_position();
                self.state = State::Frame;
                vec![
                    emit(SessionEvent::info(msg)),
                    emit(SessionEvent::RefreshEditor),
                    send("frame"),
                ]
            }
            None => {
                self.terminal_cycle = false;
                self.state = State::Frame;
                vec![send("frame")]
            }
        }
    }

    fn highlight_frame(&mut self, frame: &FrameLocation) -> Vec<Action> {
        let location = self.resolver.resolve(&frame.module, frame.offset);
        self.registry
            .set_current_position(location.file_name.clone(), location.offset);

        if location.path.is_some() {
            return vec![emit(SessionEvent::Highlight { location })];
        }
        if self.resolver.report_missing(&location.file_name) {
            let msg = format!(
                "Source file {} not found in search paths, execution continues without highlighting",
                location.file_name
            );
            cs_warn!("{msg}");
            return vec![emit(SessionEvent::warning(msg))];
        }
        vec![]
    }

    fn on_frame(&mut self, output: &str) -> Vec<Action> {
        let mut actions = if self.terminal_cycle {
            vec![]
        } else {
            match pattern::parse_frame(output) {
                Some(frame) => self.highlight_frame(&frame),
                None => {
                    cs_error!("{}", Error::UnparsableResponse("frame", output.to_string()));
                    vec![]
                }
            }
        };
        actions.push(emit(SessionEvent::RefreshEditor));

        self.state = State::BackTrace;
        actions.push(send("bt"));
        actions
    }

    fn on_backtrace(&mut self, output: &str) -> Vec<Action> {
        let frames = match pattern::parse_backtrace(output) {
            Some(frames) => frames,
            None if self.terminal_cycle => vec![],
            None => {
                cs_error!("{}", Error::UnparsableResponse("backtrace", output.to_string()));
                vec![]
            }
        };

        self.call_stack = frames
            .into_iter()
            .map(|frame| StackFrame {
                number: frame.number,
                location: self.resolver.resolve(&frame.module, frame.offset),
            })
            .collect();
        self.terminal_cycle = false;

        let mut actions = vec![emit(SessionEvent::CallStackChanged(self.call_stack.clone()))];
        actions.extend(self.display_watch_vars());
        actions
    }

    /// Start watch expressions evaluation, return to `Idle` at once if there is nothing to
    /// evaluate.
    fn display_watch_vars(&mut self) -> Vec<Action> {
        self.state = State::DisplayWatchVars;
        self.watch_cursor = 0;
        match self.watches.expression(0) {
            Some(expr) => {
                let cmd = format!("print {expr}");
                self.state = State::DisplayingWatchVars;
                vec![send(cmd)]
            }
            None => self.finish_watch_cycle(),
        }
    }

    fn on_watch_value(&mut self, output: &str) -> Vec<Action> {
        self.watches
            .set_value(self.watch_cursor, pattern::parse_evaluation(output));
        self.watch_cursor += 1;

        match self.watches.expression(self.watch_cursor) {
            Some(expr) => vec![send(format!("print {expr}"))],
            None => self.finish_watch_cycle(),
        }
    }

    fn finish_watch_cycle(&mut self) -> Vec<Action> {
        self.state = State::Idle;
        vec![emit(SessionEvent::WatchesChanged(self.watches.snapshot()))]
    }

    // --------------------------------- breakpoints -----------------------------------------------

    fn on_breakpoint_set(&mut self, output: &str) -> Vec<Action> {
        self.state = State::Idle;

        let Some(bp) = pattern::parse_breakpoint(output) else {
            cs_error!("{}", Error::UnparsableResponse("breakpoint", output.to_string()));
            return vec![emit(SessionEvent::warning(format!(
                "Breakpoint not set: {}",
                output.trim()
            )))];
        };

        let filename = Path::new(&bp.file)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| bp.file.clone());
        let line = bp.line.saturating_sub(1);
        self.registry
            .add_breakpoint(bp.number, line, bp.char_end, filename.clone());

        let mut actions = vec![
            emit(SessionEvent::info(format!(
                "Breakpoint {} at {filename}, line {}",
                bp.number, bp.line
            ))),
            emit(SessionEvent::BreakpointsChanged(self.registry.breakpoints())),
        ];
        if let Some(file) = self.resolver.find_file(&filename) {
            actions.push(emit(SessionEvent::HighlightRange {
                file,
                line,
                col_start: bp.char_start,
                col_end: bp.char_end,
            }));
        }
        actions.push(emit(SessionEvent::RefreshEditor));
        actions
    }

    fn on_breakpoint_removed(&mut self) -> Vec<Action> {
        self.state = State::Idle;
        if let Some(number) = self.pending_removal.take() {
            internal_error!(self.registry.remove_breakpoint(number));
        }
        vec![
            emit(SessionEvent::BreakpointsChanged(self.registry.breakpoints())),
            emit(SessionEvent::RefreshEditor),
        ]
    }

    fn on_breakpoints_removed(&mut self) -> Vec<Action> {
        self.state = State::Idle;
        self.registry.remove_all_breakpoints();
        vec![
            emit(SessionEvent::BreakpointsChanged(vec![])),
            emit(SessionEvent::RefreshEditor),
        ]
    }

    // --------------------------------- command surface -------------------------------------------

    fn execute(&mut self, next: State) -> Vec<Action> {
        if let Err(e) = self.idle() {
            return reject(e);
        }
        if next.requires_checkpoints() && !self.checkpoints() {
            return reject(Error::CheckpointsDisabled);
        }
        let Some(cmd) = next.execution_command() else {
            return self.incoherent(&next.to_string());
        };

        self.state = next;
        self.terminal_cycle = false;
        vec![send(cmd)]
    }

    pub fn run(&mut self) -> Vec<Action> {
        self.execute(State::Running)
    }

    pub fn reverse(&mut self) -> Vec<Action> {
        self.execute(State::RunningBackwards)
    }

    pub fn step(&mut self) -> Vec<Action> {
        self.execute(State::Stepping)
    }

    pub fn backstep(&mut self) -> Vec<Action> {
        self.execute(State::BackStepping)
    }

    pub fn next(&mut self) -> Vec<Action> {
        self.execute(State::SteppingOver)
    }

    pub fn previous(&mut self) -> Vec<Action> {
        self.execute(State::BackSteppingOver)
    }

    pub fn step_return(&mut self) -> Vec<Action> {
        self.execute(State::StepReturn)
    }

    pub fn backstep_return(&mut self) -> Vec<Action> {
        self.execute(State::BackstepReturn)
    }

    pub fn restart(&mut self) -> Vec<Action> {
        self.execute(State::Restarting)
    }

    /// Put a breakpoint into module at one-based line and column.
    pub fn put_breakpoint_at(&mut self, module: &str, line: usize, column: usize) -> Vec<Action> {
        if let Err(e) = self.idle() {
            return reject(e);
        }
        self.state = State::PuttingBreakpoint;
        vec![send(format!("break @ {module} {line} {column}"))]
    }

    pub fn remove_breakpoint(&mut self, number: u32) -> Vec<Action> {
        if let Err(e) = self.idle() {
            return reject(e);
        }
        self.pending_removal = Some(number);
        self.state = State::RemovingBreakpoint;
        vec![send(format!("delete {number}"))]
    }

    pub fn remove_all_breakpoints(&mut self) -> Vec<Action> {
        if let Err(e) = self.idle() {
            return reject(e);
        }
        self.state = State::RemovingBreakpoints;
        vec![send("delete")]
    }

    /// Select a stack frame by its number.
    pub fn set_frame(&mut self, number: u32) -> Vec<Action> {
        if let Err(e) = self.idle() {
            return reject(e);
        }
        self.state = State::SettingFrame;
        vec![send(format!("frame {number}"))]
    }

    /// Request an evaluation, return its generation.
    pub fn display(&mut self, expr: &str) -> Result<(u64, Vec<Action>), Error> {
        self.idle()?;
        expression::validate(expr)?;

        self.evaluation += 1;
        self.state = State::Displaying;
        Ok((self.evaluation, vec![send(format!("print {}", expr.trim()))]))
    }

    pub fn quit(&mut self) -> Vec<Action> {
        match self.state {
            State::NotStarted => reject(Error::NotStarted),
            // second quit request, debugger doesn't respond - kill it
            State::Quitting => vec![Action::Kill],
            // debugger blocks until debuggee connects, nobody reads commands
            state if state.is_starting() => vec![Action::Kill],
            State::Idle => self.enter_quitting(),
            state => reject(Error::Busy(state)),
        }
    }

    // --------------------------------- watches ---------------------------------------------------

    /// Register a watch expression, evaluate all watches at once if the session is idle.
    pub fn add_watch(&mut self, expr: &str) -> Vec<Action> {
        if let Err(e) = expression::validate(expr) {
            return reject(e);
        }
        self.watches.add(expr.trim());
        if self.state == State::Idle {
            return self.display_watch_vars();
        }
        vec![emit(SessionEvent::WatchesChanged(self.watches.snapshot()))]
    }

    pub fn remove_watch(&mut self, index: usize) -> Vec<Action> {
        if self.state == State::DisplayingWatchVars {
            return reject(Error::Busy(self.state));
        }
        if self.watches.remove(index).is_none() {
            return vec![emit(SessionEvent::warning(format!(
                "no watch expression #{index}"
            )))];
        }
        vec![emit(SessionEvent::WatchesChanged(self.watches.snapshot()))]
    }

    pub fn clear_watches(&mut self) -> Vec<Action> {
        if self.state == State::DisplayingWatchVars {
            return reject(Error::Busy(self.state));
        }
        self.watches.clear();
        vec![emit(SessionEvent::WatchesChanged(vec![]))]
    }

    /// Evaluate all watch expressions again.
    pub fn refresh_watches(&mut self) -> Vec<Action> {
        if let Err(e) = self.idle() {
            return reject(e);
        }
        self.display_watch_vars()
    }
}

fn cwd(project_root: &Path) -> Option<std::path::PathBuf> {
    (!project_root.as_os_str().is_empty()).then(|| project_root.to_path_buf())
}
