//! Server-Sent Events framing.
//!
//! Only `data:` fields matter to the discovery streams; `event:`, `id:`,
//! `retry:` and comment lines are skipped. Consecutive `data:` lines of one
//! event are joined with `\n`, and a blank line ends the event.

use std::collections::VecDeque;
use std::fmt::Display;
use std::mem;

use airmap_common::error::BackendError;
use futures_util::{Stream, StreamExt, stream};

#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Consumes raw bytes and returns every event they completed.
    ///
    /// Lines may be split anywhere across calls, including inside a UTF-8
    /// sequence.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut events = Vec::new();
        for &byte in bytes {
            if byte == b'\n' {
                let line = mem::take(&mut self.line);
                if let Some(event) = self.process_line(&line) {
                    events.push(event);
                }
            } else {
                self.line.push(byte);
            }
        }
        events
    }

    /// Flushes the event left open when the stream ends without a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.line.is_empty() {
            let line = mem::take(&mut self.line);
            self.process_line(&line);
        }
        self.flush()
    }

    fn process_line(&mut self, raw: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(raw);
        let line = text.strip_suffix('\r').unwrap_or(&*text);

        if line.is_empty() {
            return self.flush();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn flush(&mut self) -> Option<String> {
        let data = mem::take(&mut self.data);
        if data.iter().all(|line| line.trim().is_empty()) {
            return None;
        }
        Some(data.join("\n"))
    }
}

/// Turns a byte stream into a stream of event payloads.
///
/// A read error is yielded once as [`BackendError::Transport`] and ends the
/// stream.
pub fn events<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, BackendError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    let state = (Box::pin(bytes), SseDecoder::default(), VecDeque::new(), false);

    stream::unfold(state, |(mut bytes, mut decoder, mut pending, mut done)| async move {
        loop {
            if let Some(event) = pending.pop_front() {
                return Some((Ok(event), (bytes, decoder, pending, done)));
            }
            if done {
                return None;
            }

            match bytes.next().await {
                Some(Ok(chunk)) => pending.extend(decoder.feed(chunk.as_ref())),
                Some(Err(e)) => {
                    let error = BackendError::Transport(e.to_string());
                    return Some((Err(error), (bytes, decoder, pending, true)));
                }
                None => {
                    done = true;
                    pending.extend(decoder.finish());
                }
            }
        }
    })
}
