//! Console commands.
//!
//! Command is a request to a debugger session typed by a user. Commands are parsed here and
//! dispatched by the console application, their results arrive as session events.

pub mod parser;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("malformed command: {0}")]
    Parsing(String),
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq)]
pub enum BreakpointCommand {
    /// Put a breakpoint at one-based line and column of a module.
    Add {
        module: String,
        line: usize,
        column: usize,
    },
    Remove(u32),
    RemoveAll,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatchCommand {
    Add(String),
    /// Remove expression by its index in the watch list.
    Remove(usize),
    Clear,
    Info,
    Refresh,
}

/// External commands that can be processed by the console application.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a new debugger session with the command line arguments.
    Launch,
    Run,
    Reverse,
    Step,
    Backstep,
    Next,
    Previous,
    Finish,
    Start,
    Restart,
    Breakpoint(BreakpointCommand),
    Frame(u32),
    Backtrace,
    Print(String),
    Watch(WatchCommand),
    Quit,
    Kill,
    Exit,
    SkipInput,
    Help(Option<String>),
}
