//! Byte stream to content deltas.
use std::time::Duration;

use futures::stream::BoxStream;
use tokio_stream::StreamExt;

use super::decoder::Utf8Decoder;
use super::error::ExchangeError;
use super::frame::{LineBuffer, content_from_line};

/// Raw response body as delivered by the transport.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, ExchangeError>>;

/// Content deltas in arrival order.
pub type DeltaStream = BoxStream<'static, Result<String, ExchangeError>>;

/// Stateful decoder from body bytes to content deltas. The deltas it
/// produces do not depend on how the body was chunked.
#[derive(Debug, Default)]
pub struct SseDecoder {
    text: Utf8Decoder,
    lines: LineBuffer,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.text.decode(chunk);
        self.lines
            .push(&text)
            .iter()
            .filter_map(|line| content_from_line(line))
            .collect()
    }

    /// Flushes the unterminated last line. Bytes of a character that
    /// never completed are dropped, not appended to it.
    pub fn finish(&mut self) -> Vec<String> {
        let last = self.lines.finish();
        if self.text.has_pending() {
            tracing::debug!("Body ended inside a multi-byte character");
            self.text.finish();
        }
        last.iter()
            .filter_map(|line| content_from_line(line))
            .collect()
    }
}

/// Reads `body` until the transport closes it and yields each content
/// delta. Fails with `Stalled` if no chunk arrives within
/// `idle_timeout` and with `EmptyBody` if the body had no bytes at all.
pub fn content_deltas(body: ByteStream, idle_timeout: Duration) -> DeltaStream {
    Box::pin(async_stream::try_stream! {
        let mut decoder = SseDecoder::new();
        let mut chunks = Box::pin(body.timeout(idle_timeout));
        let mut received = 0usize;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|_| ExchangeError::Stalled(idle_timeout))??;
            received += chunk.len();
            for delta in decoder.push(&chunk) {
                yield delta;
            }
        }

        if received == 0 {
            Err::<(), _>(ExchangeError::EmptyBody)?;
        }

        for delta in decoder.finish() {
            yield delta;
        }
    })
}
