use crate::debugger::{
    Evaluation, EventReceiver, LaunchArgs, MessageKind, Preferences, Session, SessionBuilder,
    SessionEvent, StackFrame, WatchVariable,
};
use crate::ui::command::{BreakpointCommand, Command, CommandError, WatchCommand};
use crate::ui::console::editor::{create_editor, CommandCompleter, RLHelper};
use crate::ui::console::help::help_for_command;
use crate::ui::console::print::style::{
    ErrorView, FilePathView, FunctionNameView, KeywordView, WarningView,
};
use crate::ui::console::print::ExternalPrinter;
use crate::{cs_debug, muted_error};
use anyhow::Context;
use crossterm::style::Stylize;
use rustyline::error::ReadlineError;
use rustyline::history::MemHistory;
use rustyline::Editor;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::{mpsc, Arc, Mutex, Once};
use std::thread;

mod editor;
mod help;
pub mod print;

const WELCOME_TEXT: &str = r#"
camlstalker greets
"#;
const PROMT: &str = "(cs) ";

type CSEditor = Editor<RLHelper, MemHistory>;

pub struct AppBuilder {
    prefs: Preferences,
    args: LaunchArgs,
}

impl AppBuilder {
    pub fn new(prefs: Preferences, args: LaunchArgs) -> Self {
        Self { prefs, args }
    }

    pub fn build(self) -> anyhow::Result<TerminalApplication> {
        let (control_tx, control_rx) = mpsc::sync_channel::<Control>(0);
        let mut editor = create_editor(PROMT)?;
        let (session, events) = SessionBuilder::new(self.prefs).build();

        if let Some(h) = editor.helper_mut() {
            h.completer
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .replace_module_hints(known_modules(&self.args));
        }

        Ok(TerminalApplication {
            session,
            events,
            args: self.args,
            editor,
            control_tx,
            control_rx,
        })
    }
}

/// Return names of modules which sources are found in search paths.
fn known_modules(args: &LaunchArgs) -> Vec<String> {
    let dirs: Vec<PathBuf> = if args.search_paths.is_empty() {
        vec![args.project_root.clone()]
    } else {
        args.search_paths
            .iter()
            .map(|path| args.project_root.join(path))
            .collect()
    };

    dirs.iter()
        .filter_map(|dir| muted_error!(fs::read_dir(dir)))
        .flat_map(|entries| entries.filter_map(Result::ok))
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension()? != "ml" {
                return None;
            }
            let stem = path.file_stem()?.to_string_lossy().to_string();
            let mut chars = stem.chars();
            let first = chars.next()?;
            Some(format!("{}{}", first.to_ascii_uppercase(), chars.as_str()))
        })
        .collect()
}

enum Control {
    /// New command from user received
    Cmd(String),
    /// Terminate application
    Terminate,
}

pub struct TerminalApplication {
    session: Arc<Session>,
    events: EventReceiver,
    args: LaunchArgs,
    editor: CSEditor,
    control_tx: SyncSender<Control>,
    control_rx: Receiver<Control>,
}

pub static HELLO_ONCE: Once = Once::new();

impl TerminalApplication {
    pub fn run(mut self) -> anyhow::Result<()> {
        let completer = Arc::clone(
            &self
                .editor
                .helper_mut()
                .context("editor helper must exists")?
                .completer,
        );

        // print session events while a user types commands
        {
            let printer = ExternalPrinter::new(&mut self.editor)?;
            let events = self.events;
            thread::Builder::new()
                .name("session-events".to_string())
                .spawn(move || {
                    while let Ok(event) = events.recv() {
                        print_event(&printer, &completer, event);
                    }
                })?;
        }

        let app_loop = AppLoop {
            session: self.session,
            args: self.args,
            printer: ExternalPrinter::new(&mut self.editor)?,
            control_rx: self.control_rx,
        };

        let mut editor = self.editor;
        let control_tx = self.control_tx;
        thread::spawn(move || {
            HELLO_ONCE.call_once(|| {
                println!("{WELCOME_TEXT}");
            });

            loop {
                let line = editor.readline(PROMT);
                match line {
                    Ok(input) => {
                        let exit = matches!(Command::parse(&input), Ok(Command::Exit));
                        _ = editor.add_history_entry(&input);
                        _ = control_tx.send(Control::Cmd(input));
                        if exit {
                            break;
                        }
                    }
                    Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                        _ = control_tx.send(Control::Terminate);
                        break;
                    }
                    Err(err) => {
                        println!("error: {:#}", err);
                        _ = control_tx.send(Control::Terminate);
                        break;
                    }
                }
            }
        });

        app_loop.run();

        Ok(())
    }
}

fn source_line(path: &Path, line: usize) -> Option<String> {
    let source = muted_error!(fs::read_to_string(path))?;
    source
        .lines()
        .nth(line.checked_sub(1)?)
        .map(ToString::to_string)
}

fn render_frame(frame: &StackFrame) -> String {
    let location = &frame.location;
    let file = location
        .path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| location.file_name.clone());
    match location.line {
        Some(line) => format!(
            "#{} {} at {}:{}",
            frame.number,
            FunctionNameView::from(location.function.as_deref()),
            FilePathView::from(file),
            line
        ),
        None => format!(
            "#{} {} at {}, char {}",
            frame.number,
            KeywordView::from(&location.module),
            FilePathView::from(file),
            location.offset
        ),
    }
}

fn render_watch(index: usize, watch: &WatchVariable) -> String {
    format!(
        "{index}: {} = {}",
        KeywordView::from(&watch.expression),
        watch.value.as_deref().unwrap_or("<not evaluated>")
    )
}

fn print_event(printer: &ExternalPrinter, completer: &Mutex<CommandCompleter>, event: SessionEvent) {
    match event {
        SessionEvent::Message { text, kind } => match kind {
            MessageKind::Info => printer.print(text),
            MessageKind::Warning => printer.print(WarningView::from(text)),
            MessageKind::Error => printer.print(ErrorView::from(text)),
        },
        SessionEvent::Highlight { location } => {
            let place = match (&location.path, location.line) {
                (Some(path), Some(line)) => {
                    format!("{}:{line}", FilePathView::from(path.to_string_lossy()))
                }
                _ => format!("{}", FilePathView::from(&location.file_name)),
            };
            printer.print(format!(
                "stopped in {} at {place}",
                FunctionNameView::from(location.function.as_deref())
            ));
            if let (Some(path), Some(line)) = (&location.path, location.line) {
                if let Some(code) = source_line(path, line) {
                    printer.print(format!("{:>4} {}", line, code.bold()));
                }
            }
        }
        SessionEvent::WatchesChanged(watches) => {
            watches
                .iter()
                .enumerate()
                .for_each(|(i, watch)| printer.print(render_watch(i, watch)));
            completer
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .replace_expression_hints(watches.into_iter().map(|w| w.expression));
        }
        SessionEvent::WaitingForConnection { port } => printer.print(format!(
            "waiting for a remote program on port {port}, type `kill` to cancel"
        )),
        SessionEvent::ConnectionEstablished => printer.print("remote program connected"),
        SessionEvent::DebugeeOutput { text, is_error } => {
            let text = text.trim_end_matches('\n');
            if is_error {
                printer.print(ErrorView::from(text))
            } else {
                printer.print(text)
            }
        }
        SessionEvent::Terminated => {
            printer.print("debugger session terminated, type `launch` to start again")
        }
        event => cs_debug!("session event: {event:?}"),
    }
}

struct AppLoop {
    session: Arc<Session>,
    args: LaunchArgs,
    printer: ExternalPrinter,
    control_rx: Receiver<Control>,
}

impl AppLoop {
    fn handle_command(&self, cmd: &str) -> Result<ControlFlow<()>, CommandError> {
        match Command::parse(cmd)? {
            Command::SkipInput => {}
            Command::Launch => self.session.start(self.args.clone()),
            Command::Run => self.session.run(),
            Command::Reverse => self.session.reverse(),
            Command::Step => self.session.step(),
            Command::Backstep => self.session.backstep(),
            Command::Next => self.session.next(),
            Command::Previous => self.session.previous(),
            Command::Finish => self.session.step_return(),
            Command::Start => self.session.backstep_return(),
            Command::Restart => self.session.restart(),
            Command::Breakpoint(cmd) => match cmd {
                BreakpointCommand::Add {
                    module,
                    line,
                    column,
                } => self.session.put_breakpoint_at(&module, line, column),
                BreakpointCommand::Remove(number) => self.session.remove_breakpoint(number),
                BreakpointCommand::RemoveAll => self.session.remove_all_breakpoints(),
                BreakpointCommand::Info => {
                    for bp in self.session.registry().breakpoints() {
                        self.printer.print(format!(
                            "- Breakpoint {} at {}:{}",
                            bp.number,
                            FilePathView::from(&bp.filename),
                            bp.line + 1
                        ));
                    }
                }
            },
            Command::Frame(number) => self.session.set_frame(number),
            Command::Backtrace => {
                let frames = self.session.call_stack();
                if frames.is_empty() {
                    self.printer.print("no call stack");
                }
                frames
                    .iter()
                    .for_each(|frame| self.printer.print(render_frame(frame)));
            }
            Command::Print(expression) => match self.session.display(&expression) {
                Evaluation::Value(value) => self
                    .printer
                    .print(format!("{}: {value}", KeywordView::from(&expression))),
                Evaluation::Busy => self.printer.print(WarningView::from("debugger is busy")),
                Evaluation::Empty => {}
            },
            Command::Watch(cmd) => match cmd {
                WatchCommand::Add(expression) => self.session.add_watch(&expression),
                WatchCommand::Remove(index) => self.session.remove_watch(index),
                WatchCommand::Clear => self.session.clear_watches(),
                WatchCommand::Refresh => self.session.refresh_watches(),
                WatchCommand::Info => self
                    .session
                    .watches()
                    .iter()
                    .enumerate()
                    .for_each(|(i, watch)| self.printer.print(render_watch(i, watch))),
            },
            Command::Quit => self.session.quit(),
            Command::Kill => self.session.kill(),
            Command::Exit => return Ok(ControlFlow::Break(())),
            Command::Help(command) => self.printer.print(help_for_command(command.as_deref())),
        }

        Ok(ControlFlow::Continue(()))
    }

    fn run(self) {
        self.session.start(self.args.clone());

        loop {
            let Ok(action) = self.control_rx.recv() else {
                break;
            };

            match action {
                Control::Cmd(command) => match self.handle_command(&command) {
                    Ok(ControlFlow::Continue(())) => {}
                    Ok(ControlFlow::Break(())) => break,
                    Err(e) => self.printer.print(ErrorView::from(e)),
                },
                Control::Terminate => break,
            }
        }

        self.session.kill();
    }
}
