use criterion::{black_box, criterion_group, criterion_main, Criterion};

use conclave_client::protocol::events::{BasicChatEvent, ReflectionChatEvent};
use conclave_client::stream::EventLineParser;

fn synthetic_wire(frames: usize) -> String {
    let mut wire = String::with_capacity(frames * 96);
    for idx in 0..frames {
        wire.push_str("data:{\"status\":[{\"agentName\":\"Scribe\",\"status\":\"responding\"}],");
        wire.push_str("\"agentResponses\":[{\"agentName\":\"Scribe\",\"content\":\"fragment ");
        wire.push_str(&idx.to_string());
        wire.push_str("\"}]}\n");
    }
    wire.push_str("data:done\n");
    wire
}

fn bench_parser_whole_stream(c: &mut Criterion) {
    let wire = synthetic_wire(256);
    c.bench_function("parser_feed_whole_stream", |b| {
        b.iter(|| {
            let mut parser = EventLineParser::new();
            let payloads = parser.feed(black_box(&wire));
            black_box(payloads.len())
        });
    });
}

fn bench_parser_chunked_stream(c: &mut Criterion) {
    // 48-byte chunks cut lines mid-payload, exercising the carry path.
    let wire = synthetic_wire(256);
    let chunks: Vec<&str> = wire
        .as_bytes()
        .chunks(48)
        .map(|chunk| std::str::from_utf8(chunk).expect("ascii wire"))
        .collect();
    c.bench_function("parser_feed_48_byte_chunks", |b| {
        b.iter(|| {
            let mut parser = EventLineParser::new();
            let mut out = Vec::with_capacity(8);
            let mut total = 0usize;
            for chunk in &chunks {
                parser.feed_into(black_box(chunk), &mut out);
                total += out.len();
                out.clear();
            }
            black_box(total)
        });
    });
}

fn bench_basic_event_decode(c: &mut Criterion) {
    let payload = "{\"status\":[{\"agentName\":\"Scribe\",\"status\":\"responding\"}],\
\"agentResponses\":[{\"agentName\":\"Scribe\",\"content\":\"a moderately sized fragment of agent output\"}]}";
    c.bench_function("decode_basic_event", |b| {
        b.iter(|| {
            let event: BasicChatEvent =
                serde_json::from_str(black_box(payload)).expect("decode");
            black_box(event.agent_responses.len())
        });
    });
}

fn bench_reflection_event_decode(c: &mut Criterion) {
    let payload = "{\"status\":[\"evaluating candidate 2\"],\"reflection\":{\"id\":\"r-1\",\
\"messages\":[{\"id\":\"m-1\",\"content\":\"candidate answer text\",\"senderName\":\"Sage\",\"isOptimal\":false},\
{\"id\":\"m-2\",\"content\":\"refined answer text\",\"senderName\":\"Sage\",\"isOptimal\":true}],\
\"evaluatorMessages\":[{\"id\":\"e-1\",\"content\":\"first draft is too vague\",\"messageId\":\"m-1\"}]}}";
    c.bench_function("decode_reflection_event", |b| {
        b.iter(|| {
            let event: ReflectionChatEvent =
                serde_json::from_str(black_box(payload)).expect("decode");
            black_box(event.reflection.is_some())
        });
    });
}

criterion_group!(
    benches,
    bench_parser_whole_stream,
    bench_parser_chunked_stream,
    bench_basic_event_decode,
    bench_reflection_event_decode
);
criterion_main!(benches);
