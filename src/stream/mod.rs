pub mod parser;
pub mod reader;

pub use parser::{is_end_sentinel, EventLineParser, DATA_MARKER, DONE_SENTINEL, NIL_SENTINEL};
pub use reader::{read_event_stream, EventConsumer, EventFlow, StreamOutcome};
