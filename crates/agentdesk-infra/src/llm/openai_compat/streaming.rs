//! Incremental-mode decoding of the chat-completions SSE body.
//!
//! The body is split into lines; only `data:` lines matter. `[DONE]` ends
//! the reply, anything else is parsed as a chunk and its
//! `choices[0].delta.content` is forwarded when non-empty. Comments,
//! keep-alives and unparseable payloads are skipped.

/// Sentinel payload that ends an OpenAI-style stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Classification of one SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaLine {
    Content(String),
    Done,
    Skip,
}

/// Classify a single line (without its line terminator).
pub fn parse_line(line: &str) -> DeltaLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return DeltaLine::Skip;
    };
    let payload = payload.trim();

    if payload == DONE_SENTINEL {
        return DeltaLine::Done;
    }
    if payload.is_empty() {
        return DeltaLine::Skip;
    }

    let Ok(chunk) = serde_json::from_str::<serde_json::Value>(payload) else {
        tracing::trace!("skipping unparseable stream line");
        return DeltaLine::Skip;
    };

    match chunk
        .pointer("/choices/0/delta/content")
        .and_then(|v| v.as_str())
    {
        Some(text) if !text.is_empty() => DeltaLine::Content(text.to_string()),
        _ => DeltaLine::Skip,
    }
}

/// Reassembles lines from arbitrarily split body chunks.
///
/// Bytes are buffered until a `\n` arrives, so a multi-byte character cut
/// across two network reads is decoded intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns every line completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            lines.push(decode_line(&raw[..raw.len() - 1]));
        }
        lines
    }

    /// Whatever is left after the body ends without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
