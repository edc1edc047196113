//! Server-sent event framing for the chat stream.
//!
//! The body is newline delimited. Content frames look like
//! `data: {"choices":[{"delta":{"content":"..."}}]}` and the stream may
//! end with `data: [DONE]`, which carries nothing.
use serde::Deserialize;

use super::error::FrameParseError;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Longest line kept, in bytes. Anything longer is dropped as malformed.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Joins decoded text into complete lines. A line cut off at the end of
/// one chunk is held until the rest of it arrives.
#[derive(Debug)]
pub struct LineBuffer {
    partial: String,
    max_len: usize,
    // Inside a line that already went over `max_len`
    discarding: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_limit(MAX_LINE_BYTES)
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_len: usize) -> Self {
        Self {
            partial: String::new(),
            max_len,
            discarding: false,
        }
    }

    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.partial.push_str(text);

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.find('\n') {
            let rest = self.partial.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.partial, rest);
            line.pop();
            if std::mem::take(&mut self.discarding) || line.len() > self.max_len {
                tracing::warn!("Dropping line longer than {} bytes", self.max_len);
                continue;
            }
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }

        if self.partial.len() > self.max_len {
            self.partial.clear();
            self.discarding = true;
        }
        lines
    }

    /// Whatever is left once the body ends, as a final line.
    pub fn finish(&mut self) -> Option<String> {
        if std::mem::take(&mut self.discarding) {
            self.partial.clear();
            tracing::warn!("Dropping line longer than {} bytes", self.max_len);
            return None;
        }
        if self.partial.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.partial);
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum StreamFrame<'a> {
    Data(&'a str),
    Done,
}

impl<'a> StreamFrame<'a> {
    /// Lines that don't start with `data: ` are not frames.
    pub fn parse(line: &'a str) -> Option<Self> {
        let data = line.strip_prefix(DATA_PREFIX)?;
        if data == DONE_SENTINEL {
            Some(StreamFrame::Done)
        } else {
            Some(StreamFrame::Data(data))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeltaChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

/// The JSON carried by a data frame. Only the first choice's delta
/// content is read; everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DeltaPayload {
    #[serde(default)]
    choices: Option<Vec<DeltaChoice>>,
}

impl DeltaPayload {
    pub fn parse(data: &str) -> Result<Self, FrameParseError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Content of `choices[0].delta.content` when present and non-empty.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .as_ref()?
            .first()?
            .delta
            .as_ref()?
            .content
            .as_deref()
            .filter(|c| !c.is_empty())
    }
}

/// Turns a single line into the content it contributes, if any.
/// Malformed frames are dropped; a frame split across chunks shows up
/// here as unparseable JSON and that is expected.
pub fn content_from_line(line: &str) -> Option<String> {
    match StreamFrame::parse(line)? {
        StreamFrame::Done => None,
        StreamFrame::Data(data) => match DeltaPayload::parse(data) {
            Ok(payload) => payload.content().map(str::to_string),
            Err(e) => {
                tracing::trace!("Dropping frame {}: {}", data, e);
                None
            }
        },
    }
}
