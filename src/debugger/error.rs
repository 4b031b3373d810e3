use crate::debugger::state::State;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- generic errors --------------------------------------------
    #[error(transparent)]
    IO(#[from] std::io::Error),

    // --------------------------------- session errors --------------------------------------------
    #[error("please start the debugger first")]
    NotStarted,
    #[error("debugger already started")]
    AlreadyStarted,
    #[error("debugger is busy ({0})")]
    Busy(State),
    #[error("checkpoints are disabled, backward execution is not available")]
    CheckpointsDisabled,
    #[error("invalid expression `{0}`: {1}")]
    InvalidExpression(String, String),

    // --------------------------------- process errors --------------------------------------------
    #[error("spawn `{0}`: {1}")]
    Spawn(String, std::io::Error),
    #[error("program `{0}` not found: {1}")]
    ProgramNotFound(String, which::Error),
    #[error("{0} syscall error: {1}")]
    Syscall(&'static str, nix::Error),
    #[error("process stdin closed")]
    StdinClosed,

    // --------------------------------- protocol errors -------------------------------------------
    #[error("incoherent state: debugger output `{1}` received in state {0}")]
    IncoherentState(State, String),
    #[error("unparsable {0} response: `{1}`")]
    UnparsableResponse(&'static str, String),

    // --------------------------------- registry errors -------------------------------------------
    #[error("breakpoint number {0} not found")]
    BreakpointNotFound(u32),

    // --------------------------------- configuration errors --------------------------------------
    #[error("configuration parsing error: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Return a hint to a host - continue the session after error or tear it down.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::IO(_) => false,
            Error::NotStarted => false,
            Error::AlreadyStarted => false,
            Error::Busy(_) => false,
            Error::CheckpointsDisabled => false,
            Error::InvalidExpression(_, _) => false,
            Error::IncoherentState(_, _) => false,
            Error::UnparsableResponse(_, _) => false,
            Error::BreakpointNotFound(_) => false,
            Error::Config(_) => false,

            // the debugger process is gone or never existed
            Error::Spawn(_, _) => true,
            Error::ProgramNotFound(_, _) => true,
            Error::Syscall(_, _) => true,
            Error::StdinClosed => true,
        }
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "debugger", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "debugger", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::debug, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and logs an internal error if it occurs.
#[macro_export]
macro_rules! internal_error {
    ($res: expr) => {
        $crate::_error!(log::error, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::error, $res, $msg)
    };
}
