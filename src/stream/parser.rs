//! Incremental line parser for the `data:`-framed event wire protocol.
//!
//! The backend streams newline-terminated lines; each event line carries the
//! literal marker `data:` followed by a JSON payload or a termination
//! sentinel. Chunks arrive at arbitrary byte boundaries, so the parser
//! buffers the unterminated tail of every chunk and replays it when the rest
//! of the line shows up.
use memchr::memchr_iter;

/// Frame marker prefixing every event line.
pub const DATA_MARKER: &str = "data:";

/// Sentinel payload signaling successful stream termination.
pub const NIL_SENTINEL: &str = "<nil>";

/// Alternate termination sentinel used by newer backend builds.
pub const DONE_SENTINEL: &str = "done";

/// Check whether a payload is a termination sentinel rather than JSON.
#[must_use]
pub fn is_end_sentinel(payload: &str) -> bool {
    payload == NIL_SENTINEL || payload == DONE_SENTINEL
}

/// Extract the payload from one complete line.
///
/// Returns `None` for blank (whitespace-only) lines and lines that do not
/// start with [`DATA_MARKER`]; the marker is stripped at its fixed length
/// and the payload trimmed, so `data:x`, `data: x`, and `data:  x ` all
/// yield `x`.
#[must_use]
pub fn extract_data_payload(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let payload = trimmed.strip_prefix(DATA_MARKER)?;
    Some(payload.trim())
}

/// Incremental event-line parser.
///
/// Feed it raw text chunks (potentially arriving at arbitrary byte
/// boundaries) and it yields the payload of every complete `data:` line.
/// The trailing unterminated segment stays buffered as the carry until the
/// terminating `\n` arrives; a carry left over at stream end is dropped by
/// the caller, never parsed.
pub struct EventLineParser {
    buffer: String,
    read_offset: usize,
}

impl EventLineParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            read_offset: 0,
        }
    }

    /// Feed raw text and return payloads of any complete event lines.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.feed_into(chunk, &mut out);
        out
    }

    /// Feed raw text and append complete event payloads into `out`.
    pub fn feed_into(&mut self, chunk: &str, out: &mut Vec<String>) {
        self.buffer.push_str(chunk);
        let mut processed_up_to = self.read_offset;
        let bytes = self.buffer.as_bytes();
        let scan_start = processed_up_to;
        for rel_pos in memchr_iter(b'\n', &bytes[scan_start..]) {
            let line_end = scan_start + rel_pos;
            let mut line = &self.buffer[processed_up_to..line_end];
            if let Some(stripped) = line.strip_suffix('\r') {
                line = stripped;
            }
            if let Some(payload) = extract_data_payload(line) {
                out.push(payload.to_string());
            }
            processed_up_to = line_end + 1;
        }

        self.read_offset = processed_up_to;
        if self.read_offset == self.buffer.len() {
            self.buffer.clear();
            self.read_offset = 0;
            return;
        }
        let should_compact = self.read_offset > 0
            && (self.read_offset >= self.buffer.len() / 2 || self.read_offset >= 8 * 1024);
        if should_compact {
            self.buffer.drain(..self.read_offset);
            self.read_offset = 0;
        }
    }

    /// True when an unterminated partial line is buffered.
    #[must_use]
    pub fn has_carry(&self) -> bool {
        self.read_offset < self.buffer.len()
    }

    /// The buffered unterminated tail, for diagnostics only.
    #[must_use]
    pub fn carry(&self) -> &str {
        &self.buffer[self.read_offset..]
    }
}

impl Default for EventLineParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed("data:{\"x\":1}\n");
        assert_eq!(payloads, vec!["{\"x\":1}"]);
        assert!(!parser.has_carry());
    }

    #[test]
    fn test_payload_is_trimmed_after_marker() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed("data: {\"x\":1}\ndata:  done  \n");
        assert_eq!(payloads, vec!["{\"x\":1}", "done"]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed("\n   \ndata:a\n\ndata:b\n");
        assert_eq!(payloads, vec!["a", "b"]);
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed(": keep-alive\nevent: ping\ndata:a\n");
        assert_eq!(payloads, vec!["a"]);
    }

    #[test]
    fn test_partial_line_carries_across_feeds() {
        let mut parser = EventLineParser::new();
        assert!(parser.feed("data:{\"agentNa").is_empty());
        assert!(parser.has_carry());
        let payloads = parser.feed("me\":\"A\"}\n");
        assert_eq!(payloads, vec!["{\"agentName\":\"A\"}"]);
        assert!(!parser.has_carry());
    }

    #[test]
    fn test_marker_split_across_feeds() {
        let mut parser = EventLineParser::new();
        assert!(parser.feed("da").is_empty());
        let payloads = parser.feed("ta:x\n");
        assert_eq!(payloads, vec!["x"]);
    }

    #[test]
    fn test_multiple_lines_in_one_feed() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed("data:a\ndata:b\ndata:c\n");
        assert_eq!(payloads, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed("data:a\r\ndata:b\r\n");
        assert_eq!(payloads, vec!["a", "b"]);
    }

    #[test]
    fn test_unterminated_tail_is_not_emitted() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed("data:a\ndata:trailing");
        assert_eq!(payloads, vec!["a"]);
        assert!(parser.has_carry());
        assert_eq!(parser.carry(), "data:trailing");
    }

    #[test]
    fn test_sentinels() {
        assert!(is_end_sentinel("<nil>"));
        assert!(is_end_sentinel("done"));
        assert!(!is_end_sentinel("Done"));
        assert!(!is_end_sentinel("{\"done\":true}"));
    }

    #[test]
    fn test_extract_data_payload_variants() {
        assert_eq!(extract_data_payload("data:x"), Some("x"));
        assert_eq!(extract_data_payload("data: x"), Some("x"));
        assert_eq!(extract_data_payload("  data:x  "), Some("x"));
        assert_eq!(extract_data_payload("data:"), Some(""));
        assert_eq!(extract_data_payload(""), None);
        assert_eq!(extract_data_payload("   "), None);
        assert_eq!(extract_data_payload("noise"), None);
        assert_eq!(extract_data_payload(": comment"), None);
    }

    #[test]
    fn test_feed_into_appends_without_clearing_output() {
        let mut parser = EventLineParser::new();
        let mut out = vec!["seed".to_string()];
        parser.feed_into("data:a\n", &mut out);
        assert_eq!(out, vec!["seed".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_long_stream_compacts_buffer() {
        let mut parser = EventLineParser::new();
        for _ in 0..1000 {
            let payloads = parser.feed("data:{\"content\":\"chunk of text\"}\n");
            assert_eq!(payloads.len(), 1);
        }
        assert!(!parser.has_carry());
    }
}
