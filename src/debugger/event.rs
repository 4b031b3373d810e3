//! Notifications from a session to its host.
//!
//! The session never calls host UI code directly, every visible effect is delivered as a
//! [`SessionEvent`] over a channel consumed on the host side.

use crate::debugger::breakpoint::Breakpoint;
use crate::debugger::location::{Location, StackFrame};
use crate::debugger::watch::WatchVariable;
use std::path::PathBuf;
use std::sync::mpsc;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MessageKind {
    #[strum(serialize = "info")]
    Info,
    #[strum(serialize = "warning")]
    Warning,
    #[strum(serialize = "error")]
    Error,
}

/// Host workspace layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Perspective {
    #[strum(serialize = "debug")]
    Debug,
    #[strum(serialize = "default")]
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Console message.
    Message { text: String, kind: MessageKind },
    /// Open a file and highlight a character offset.
    Highlight { location: Location },
    /// Open a file and highlight a range on a line.
    HighlightRange {
        file: PathBuf,
        line: usize,
        col_start: usize,
        col_end: usize,
    },
    /// Breakpoint or position markers changed, active editor should be redrawn.
    RefreshEditor,
    PerspectiveChanged(Perspective),
    BreakpointsChanged(Vec<Breakpoint>),
    CallStackChanged(Vec<StackFrame>),
    WatchesChanged(Vec<WatchVariable>),
    /// Debugger waits for a remote debuggee, host may offer a way to cancel (kill) the session.
    WaitingForConnection { port: u16 },
    ConnectionEstablished,
    /// Debuggee stdout or stderr output.
    DebugeeOutput { text: String, is_error: bool },
    DebugeeExited(i32),
    /// Startup handshake is over, session accepts commands.
    Started,
    /// Session is torn down.
    Terminated,
}

impl SessionEvent {
    pub fn info(text: impl Into<String>) -> Self {
        SessionEvent::Message {
            text: text.into(),
            kind: MessageKind::Info,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        SessionEvent::Message {
            text: text.into(),
            kind: MessageKind::Warning,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        SessionEvent::Message {
            text: text.into(),
            kind: MessageKind::Error,
        }
    }
}

pub type EventSender = mpsc::Sender<SessionEvent>;
pub type EventReceiver = mpsc::Receiver<SessionEvent>;
