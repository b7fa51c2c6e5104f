//! Wire framing for the conversation stream.
//!
//! Every frame is a standard server-sent event carrying only a `data` field:
//!
//! ```text
//! data: <fragment text>
//!
//! data: [END]
//!
//! ```
//!
//! A fragment spanning several lines is sent as one `data:` line per text
//! line; SSE clients join them back with `\n`. Carriage returns cannot be
//! carried in a `data` field, so they are normalized to `\n`.

use std::borrow::Cow;

/// Payload of the terminal frame.
pub const END_MARKER: &str = "[END]";

/// Why a stream ended. Internal only; every reason encodes to the same
/// terminal marker on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Completed,
    Aborted,
    Failed,
}

/// One frame of a conversation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// A piece of assistant output.
    Fragment(String),
    /// A human-readable failure, sent as an ordinary fragment.
    Error(String),
    /// The terminal marker.
    End(EndReason),
}

impl StreamFrame {
    /// Text carried in the frame's `data` field, with line endings
    /// normalized to `\n`.
    pub fn data(&self) -> Cow<'_, str> {
        match self {
            StreamFrame::Fragment(text) => normalize_newlines(text),
            StreamFrame::Error(message) => {
                Cow::Owned(normalize_newlines(&format!("**Error**: {message}")).into_owned())
            }
            StreamFrame::End(_) => Cow::Borrowed(END_MARKER),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFrame::End(_))
    }
}

fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
