use std::io::{self, Write};

use crate::chat::{Role, Transcript};

/// Prints a streaming reply by writing only what changed since the last
/// snapshot.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    printed: String,
}

impl ReplyPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<W: Write>(&mut self, snapshot: &Transcript, out: &mut W) -> io::Result<()> {
        let Some(last) = snapshot.last() else {
            return Ok(());
        };
        if last.role != Role::Assistant {
            return Ok(());
        }

        match last.content.strip_prefix(self.printed.as_str()) {
            Some(suffix) => out.write_all(suffix.as_bytes())?,
            // Content was rewritten rather than extended, start over
            None => write!(out, "\n{}", last.content)?,
        }
        out.flush()?;
        self.printed = last.content.clone();

        Ok(())
    }

    pub fn has_output(&self) -> bool {
        !self.printed.is_empty()
    }
}
