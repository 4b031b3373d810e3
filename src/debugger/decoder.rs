//! Buffered framing of the debugger output stream.
//!
//! The debugger output arrives in chunks of arbitrary size. A frame is complete only when the
//! accumulated text ends with the prompt (or a yes/no question, or - while the debugger waits
//! for the debuggee - contains a socket announcement).

use crate::debugger::pattern;
use crate::debugger::pattern::{Confirmation, CONFIRMATION_SUFFIX, PROMPT};

/// Decoded unit of the debugger output.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Output of the last command, the prompt itself stripped.
    Prompt(String),
    /// Debugger waits for a debuggee connection on the socket.
    SocketAnnounced { socket: String, output: String },
    /// Debugger asks a yes/no question.
    ConfirmationPrompt {
        kind: Confirmation,
        output: String,
    },
    /// Output is not complete yet.
    Incomplete,
}

#[derive(Default, Debug)]
pub struct OutputDecoder {
    buffer: String,
}

impl OutputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of the debugger output.
    pub fn push(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
    }

    /// Accumulated, not yet decoded output.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Try to decode a complete frame. The buffer is cleared only if a frame is returned.
    ///
    /// # Arguments
    ///
    /// * `expect_socket`: true when the debugger waits for a debuggee connection, socket
    ///   announcement is recognized only in this case
    pub fn decode(&mut self, expect_socket: bool) -> Frame {
        if expect_socket {
            if let Some(socket) = pattern::socket_address(&self.buffer) {
                let output = std::mem::take(&mut self.buffer);
                return Frame::SocketAnnounced { socket, output };
            }
        }

        if let Some(output) = self.buffer.strip_suffix(PROMPT) {
            let output = output.to_string();
            self.buffer.clear();
            return Frame::Prompt(output);
        }

        if self.buffer.ends_with(CONFIRMATION_SUFFIX) {
            let output = std::mem::take(&mut self.buffer);
            return Frame::ConfirmationPrompt {
                kind: pattern::confirmation_kind(&output),
                output,
            };
        }

        Frame::Incomplete
    }
}
