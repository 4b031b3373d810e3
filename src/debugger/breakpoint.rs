/// Breakpoint confirmed by the debugger.
///
/// Breakpoint number is assigned by the debugger process, never by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub number: u32,
    /// Zero-based line.
    pub line: usize,
    /// Character offset of the breakpoint event end.
    pub end_offset: usize,
    /// Bare source file name (`foo.ml`), not a path.
    pub filename: String,
}

impl Breakpoint {
    pub fn new(number: u32, line: usize, end_offset: usize, filename: impl Into<String>) -> Self {
        Self {
            number,
            line,
            end_offset,
            filename: filename.into(),
        }
    }
}

/// The place where execution is currently stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPosition {
    pub filename: String,
    pub offset: usize,
}
