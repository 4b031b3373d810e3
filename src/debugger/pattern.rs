//! Recognizers for the textual output of `ocamldebug`.
//!
//! Every pattern here is bound to the exact shape of the debugger output (ocamldebug 4.x),
//! whitespace included. All regular expressions are compiled once.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prompt printed by the debugger when it is ready for the next command.
pub const PROMPT: &str = "(ocd) ";
/// Tail of every yes/no question asked by the debugger.
pub const CONFIRMATION_SUFFIX: &str = "(y or n) ";

macro_rules! pattern {
    ($name: ident, $re: expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).expect("must compile"));
    };
}

pattern!(
    BREAKPOINT_RE,
    r"Breakpoint (\d+) at (\d+(?::\d+)?): file ([^,]+), line (\d+), characters (\d+)-(\d+)"
);
pattern!(
    FRAME_RE,
    r"#(\d+)\s+(?:Pc: (?:\d+:)?\d+\s+)?([A-Z][\w']*)\s+char\s+(\d+)"
);
pattern!(BACKTRACE_RE, r"(?m)^Backtrace:\s*$");
pattern!(BEGINNING_RE, r"Beginning of program\.");
pattern!(END_RE, r"Program (?:exit|end)\.");
pattern!(EXCEPTION_RE, r"Uncaught exception: ([^\r\n]*)");
pattern!(
    SOCKET_RE,
    r"Waiting for connection\.\.\.\s*\(the socket is ([^)\s]+)\)"
);
pattern!(DELETE_ALL_RE, r"Delete all breakpoints\s*\?\s*\(y or n\) $");
pattern!(QUIT_ANYWAY_RE, r"Quit anyway\s*\?\s*\(y or n\) $");
pattern!(NO_DEBUG_INFO_RE, r"has no debugging info");
pattern!(NOT_BYTECODE_RE, r"not a bytecode file");
pattern!(BIND_FAILED_RE, r"bind failed|Address already in use");
pattern!(LOST_CONNECTION_RE, r"Lost connection with process (\d+)");
pattern!(EVALUATION_RE, r"(?s)^[^:\s]+\s*:\s*(.+?)\s*$");

/// Debugger confirmation of a `break @ <module> <line> <col>` command.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointConfirmation {
    pub number: u32,
    pub address: String,
    pub file: String,
    /// One-based line.
    pub line: usize,
    pub char_start: usize,
    pub char_end: usize,
}

/// Single stack frame as reported by `frame` and `bt` commands.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLocation {
    pub number: u32,
    pub module: String,
    pub offset: usize,
}

/// Banners that interrupt the usual post-execution chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    ProgramBeginning,
    ProgramEnd,
    UncaughtException(String),
}

/// Fatal conditions reported by the debugger process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fatal {
    NoDebugInfo,
    NotBytecode,
    BindFailed,
    LostConnection(u32),
}

/// Yes/no questions asked by the debugger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirmation {
    DeleteAllBreakpoints,
    QuitAnyway,
    Unknown,
}

pub fn parse_breakpoint(output: &str) -> Option<BreakpointConfirmation> {
    let caps = BREAKPOINT_RE.captures(output)?;
    Some(BreakpointConfirmation {
        number: caps[1].parse().ok()?,
        address: caps[2].to_string(),
        file: caps[3].trim().to_string(),
        line: caps[4].parse().ok()?,
        char_start: caps[5].parse().ok()?,
        char_end: caps[6].parse().ok()?,
    })
}

fn frame_from_captures(caps: &regex::Captures) -> Option<FrameLocation> {
    Some(FrameLocation {
        number: caps[1].parse().ok()?,
        module: caps[2].to_string(),
        offset: caps[3].parse().ok()?,
    })
}

pub fn parse_frame(output: &str) -> Option<FrameLocation> {
    let caps = FRAME_RE.captures(output)?;
    frame_from_captures(&caps)
}

/// Parse `bt` output. Returns `None` if the backtrace header is missing.
pub fn parse_backtrace(output: &str) -> Option<Vec<FrameLocation>> {
    let header = BACKTRACE_RE.find(output)?;
    let block = &output[header.end()..];
    Some(
        FRAME_RE
            .captures_iter(block)
            .filter_map(|caps| frame_from_captures(&caps))
            .collect(),
    )
}

/// Find a banner in the output of an execution command.
/// An uncaught exception takes precedence over a program end (the debugger prints both).
pub fn detect_banner(output: &str) -> Option<Banner> {
    if let Some(caps) = EXCEPTION_RE.captures(output) {
        return Some(Banner::UncaughtException(caps[1].trim().to_string()));
    }
    if END_RE.is_match(output) {
        return Some(Banner::ProgramEnd);
    }
    if BEGINNING_RE.is_match(output) {
        return Some(Banner::ProgramBeginning);
    }
    None
}

pub fn detect_fatal(output: &str) -> Option<Fatal> {
    if NO_DEBUG_INFO_RE.is_match(output) {
        return Some(Fatal::NoDebugInfo);
    }
    if NOT_BYTECODE_RE.is_match(output) {
        return Some(Fatal::NotBytecode);
    }
    if BIND_FAILED_RE.is_match(output) {
        return Some(Fatal::BindFailed);
    }
    LOST_CONNECTION_RE
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
        .map(Fatal::LostConnection)
}

pub fn socket_address(output: &str) -> Option<String> {
    SOCKET_RE.captures(output).map(|caps| caps[1].to_string())
}

pub fn confirmation_kind(output: &str) -> Confirmation {
    if DELETE_ALL_RE.is_match(output) {
        Confirmation::DeleteAllBreakpoints
    } else if QUIT_ANYWAY_RE.is_match(output) {
        Confirmation::QuitAnyway
    } else {
        Confirmation::Unknown
    }
}

/// Reduce `print` output like `x: int = 5` to `int = 5`, keep anything else verbatim.
pub fn parse_evaluation(output: &str) -> String {
    let output = output.trim();
    match EVALUATION_RE.captures(output) {
        Some(caps) => caps[1].to_string(),
        None => output.to_string(),
    }
}
