//! Async driver that turns a raw HTTP body stream into decoded events.
//!
//! Bytes arriving from the response body are reassembled into UTF-8 text
//! (carrying incomplete multi-byte sequences across chunk boundaries), split
//! into `data:` frames by [`EventLineParser`], decoded as JSON, and
//! dispatched to an [`EventConsumer`]. The reader owns the byte stream for
//! the duration of one call and drops it on every exit path, releasing the
//! underlying connection.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::util::snippet;

use super::parser::{is_end_sentinel, EventLineParser};

/// Flow-control decision returned by a consumer after each event.
///
/// `Stop` halts the read loop without any further callback: the consumer has
/// already delivered whatever terminal notification its policy calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    Continue,
    Stop,
}

/// How one invocation of the read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Natural stream end or a termination sentinel; `on_done` was invoked.
    Completed,
    /// The consumer returned [`EventFlow::Stop`]; no reader callback fired.
    Stopped,
    /// Transport or decode failure; `on_error` was invoked.
    Failed,
    /// The cancellation token fired; no callback was invoked.
    Cancelled,
}

/// Callbacks invoked by [`read_event_stream`] as the stream is consumed.
///
/// The reader guarantees at most one reader-invoked terminal callback per
/// stream: either `on_done` (natural end / sentinel) or `on_error`
/// (transport or decode failure), never both.
pub trait EventConsumer {
    type Event: DeserializeOwned;

    /// Handle one decoded event; the return value decides whether the
    /// reader keeps pulling frames.
    fn on_event(&mut self, event: Self::Event) -> EventFlow;

    /// Successful termination: the sentinel arrived or the stream closed.
    fn on_done(&mut self);

    /// Unrecoverable failure; no further callbacks follow.
    fn on_error(&mut self, message: &str);
}

/// Consume a byte stream to completion, dispatching decoded events.
///
/// Terminates on the first of: termination sentinel, natural stream end,
/// decode or transport failure, consumer `Stop`, or cancellation. An
/// unterminated trailing line at natural stream end is discarded, never
/// parsed.
pub async fn read_event_stream<S, E, C>(
    byte_stream: S,
    consumer: &mut C,
    cancel: &CancellationToken,
) -> StreamOutcome
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
    C: EventConsumer,
{
    let mut stream = Box::pin(byte_stream);
    let mut parser = EventLineParser::new();
    let mut remainder: Vec<u8> = Vec::new();
    let mut payloads: Vec<String> = Vec::with_capacity(8);

    loop {
        let next = tokio::select! {
            // Check cancellation first so an abort wins over buffered chunks.
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("event stream cancelled by caller");
                return StreamOutcome::Cancelled;
            }
            chunk = stream.next() => chunk,
        };

        let Some(chunk) = next else {
            if parser.has_carry() {
                tracing::debug!(
                    dropped = snippet(parser.carry()),
                    "discarding unterminated trailing line at stream end"
                );
            }
            consumer.on_done();
            return StreamOutcome::Completed;
        };

        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                consumer.on_error(&format!("stream read failed: {err}"));
                return StreamOutcome::Failed;
            }
        };

        if let Err(message) = feed_chunk(&mut parser, &mut remainder, &bytes, &mut payloads) {
            consumer.on_error(&message);
            return StreamOutcome::Failed;
        }

        for payload in payloads.drain(..) {
            if is_end_sentinel(&payload) {
                consumer.on_done();
                return StreamOutcome::Completed;
            }
            let event = match serde_json::from_str::<C::Event>(&payload) {
                Ok(event) => event,
                Err(err) => {
                    consumer.on_error(&format!(
                        "malformed event payload: {err}: {}",
                        snippet(&payload)
                    ));
                    return StreamOutcome::Failed;
                }
            };
            match consumer.on_event(event) {
                EventFlow::Continue => {}
                EventFlow::Stop => return StreamOutcome::Stopped,
            }
        }
    }
}

/// Decode one chunk of bytes as UTF-8 and feed it to the line parser.
///
/// An incomplete multi-byte sequence at the chunk boundary is kept in
/// `remainder` and prepended to the next chunk; a sequence that is invalid
/// outright is an error.
fn feed_chunk(
    parser: &mut EventLineParser,
    remainder: &mut Vec<u8>,
    bytes: &[u8],
    out: &mut Vec<String>,
) -> Result<(), String> {
    if remainder.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(text) => parser.feed_into(text, out),
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(invalid_utf8_message(&e));
                }
                let valid_up_to = e.valid_up_to();
                // Safety: valid_up_to is guaranteed to be a valid UTF-8 boundary.
                let text = unsafe { std::str::from_utf8_unchecked(&bytes[..valid_up_to]) };
                parser.feed_into(text, out);
                remainder.extend_from_slice(&bytes[valid_up_to..]);
            }
        }
        return Ok(());
    }

    remainder.extend_from_slice(bytes);
    match std::str::from_utf8(remainder.as_slice()) {
        Ok(text) => {
            parser.feed_into(text, out);
            remainder.clear();
        }
        Err(e) => {
            if e.error_len().is_some() {
                return Err(invalid_utf8_message(&e));
            }
            let valid_up_to = e.valid_up_to();
            // Safety: valid_up_to is guaranteed to be a valid UTF-8 boundary.
            let text = unsafe { std::str::from_utf8_unchecked(&remainder[..valid_up_to]) };
            parser.feed_into(text, out);
            if valid_up_to > 0 {
                let remain_len = remainder.len() - valid_up_to;
                remainder.copy_within(valid_up_to.., 0);
                remainder.truncate(remain_len);
            }
        }
    }
    Ok(())
}

fn invalid_utf8_message(e: &std::str::Utf8Error) -> String {
    format!("invalid UTF-8 in stream at byte offset {}", e.valid_up_to())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_chunk_plain_ascii() {
        let mut parser = EventLineParser::new();
        let mut remainder = Vec::new();
        let mut out = Vec::new();
        feed_chunk(&mut parser, &mut remainder, b"data:a\n", &mut out).expect("feed");
        assert_eq!(out, vec!["a"]);
        assert!(remainder.is_empty());
    }

    #[test]
    fn test_feed_chunk_carries_split_multibyte() {
        // "é" is 0xC3 0xA9; split it across two chunks.
        let mut parser = EventLineParser::new();
        let mut remainder = Vec::new();
        let mut out = Vec::new();
        feed_chunk(&mut parser, &mut remainder, b"data:\"caf\xc3", &mut out).expect("feed");
        assert_eq!(remainder, vec![0xc3]);
        assert!(out.is_empty());
        feed_chunk(&mut parser, &mut remainder, b"\xa9\"\n", &mut out).expect("feed");
        assert!(remainder.is_empty());
        assert_eq!(out, vec!["\"café\""]);
    }

    #[test]
    fn test_feed_chunk_rejects_invalid_utf8() {
        let mut parser = EventLineParser::new();
        let mut remainder = Vec::new();
        let mut out = Vec::new();
        let err = feed_chunk(&mut parser, &mut remainder, b"data:\xff\n", &mut out)
            .expect_err("invalid byte");
        assert!(err.contains("invalid UTF-8"));
    }

    #[test]
    fn test_feed_chunk_rejects_invalid_continuation_after_carry() {
        let mut parser = EventLineParser::new();
        let mut remainder = Vec::new();
        let mut out = Vec::new();
        feed_chunk(&mut parser, &mut remainder, b"data:\xc3", &mut out).expect("incomplete");
        // 0x41 is not a valid continuation byte for 0xC3.
        let err =
            feed_chunk(&mut parser, &mut remainder, b"\x41\n", &mut out).expect_err("invalid");
        assert!(err.contains("invalid UTF-8"));
    }
}
