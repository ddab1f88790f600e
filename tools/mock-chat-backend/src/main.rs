//! Standalone mock of the chat backend's wire protocol, for manual runs of
//! the conclave CLI:
//!
//! ```text
//! MOCK_SCENARIO=happy cargo run
//! conclave --config config.yaml chat demo "hello"
//! ```
//!
//! Env knobs: `MOCK_PORT` (default 4000), `MOCK_SCENARIO`
//! (`happy` | `agent-error` | `terminal-error` | `reject`),
//! `MOCK_SENTINEL` (`nil` | `done`).

use std::convert::Infallible;
use std::env;
use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 4000;
const SESSION_COOKIE: &str = "conclave_session=mock-session; Path=/; HttpOnly";

#[derive(Copy, Clone)]
enum Scenario {
    Happy,
    AgentError,
    TerminalError,
    Reject,
}

#[derive(Copy, Clone)]
enum Sentinel {
    Nil,
    Done,
}

impl Sentinel {
    fn frame(self) -> &'static str {
        match self {
            Sentinel::Nil => "data:<nil>\n",
            Sentinel::Done => "data:done\n",
        }
    }
}

struct MockState {
    scenario: Scenario,
    sentinel: Sentinel,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let port = env::var("MOCK_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let state = Arc::new(MockState {
        scenario: parse_scenario(),
        sentinel: parse_sentinel(),
    });

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .unwrap_or_else(|err| panic!("failed to bind mock backend on 127.0.0.1:{port}: {err}"));
    eprintln!("mock chat backend listening on 127.0.0.1:{port}");

    loop {
        let (stream, remote_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                eprintln!("accept error: {err}");
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let service_state = Arc::clone(&state);
        let service = service_fn(move |request: Request<Incoming>| {
            let state_ref = Arc::clone(&service_state);
            async move { Ok::<_, Infallible>(handle_request(request, &state_ref).await) }
        });

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                eprintln!("mock backend connection error from {remote_addr}: {err}");
            }
        });
    }
}

fn parse_scenario() -> Scenario {
    match env::var("MOCK_SCENARIO").as_deref() {
        Ok("agent-error") => Scenario::AgentError,
        Ok("terminal-error") => Scenario::TerminalError,
        Ok("reject") => Scenario::Reject,
        Ok("happy") | Err(_) => Scenario::Happy,
        Ok(other) => {
            eprintln!("unknown MOCK_SCENARIO '{other}', fallback to happy");
            Scenario::Happy
        }
    }
}

fn parse_sentinel() -> Sentinel {
    match env::var("MOCK_SENTINEL").as_deref() {
        Ok("done") => Sentinel::Done,
        Ok("nil") | Err(_) => Sentinel::Nil,
        Ok(other) => {
            eprintln!("unknown MOCK_SENTINEL '{other}', fallback to nil");
            Sentinel::Nil
        }
    }
}

async fn handle_request(request: Request<Incoming>, state: &Arc<MockState>) -> Response<Full<Bytes>> {
    let (parts, body) = request.into_parts();
    drain_request_body(body).await;

    let method = parts.method;
    let path = parts.uri.path();

    if method == Method::POST && (path == "/guest-login" || path == "/login") {
        let mut response =
            simple_response(StatusCode::OK, "application/json", br#"{"data":null}"#);
        response.headers_mut().insert(
            header::SET_COOKIE,
            HeaderValue::from_static(SESSION_COOKIE),
        );
        return response;
    }
    if method == Method::GET && path == "/me" {
        return simple_response(
            StatusCode::OK,
            "application/json",
            br#"{"data":{"id":"u-mock","userName":"guest","fullName":"Guest User"}}"#,
        );
    }

    let is_basic = method == Method::POST
        && path.starts_with("/basic-chats/")
        && path.ends_with("/messages");
    let is_reflection = method == Method::POST
        && path.starts_with("/reflection-chats/")
        && path.ends_with("/messages");
    if !is_basic && !is_reflection {
        return simple_response(
            StatusCode::NOT_FOUND,
            "application/json",
            br#"{"error":"not found"}"#,
        );
    }

    if matches!(state.scenario, Scenario::Reject) {
        return simple_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "application/json",
            br#"{"error":"backend unavailable"}"#,
        );
    }

    let wire = if is_basic {
        basic_wire(state.scenario, state.sentinel)
    } else {
        reflection_wire(state.scenario, state.sentinel)
    };
    stream_response(wire)
}

async fn drain_request_body(mut body: Incoming) {
    while let Some(frame_result) = body.frame().await {
        if frame_result.is_err() {
            break;
        }
    }
}

fn basic_wire(scenario: Scenario, sentinel: Sentinel) -> String {
    let mut wire = String::new();
    wire.push_str(
        "data:{\"status\":[{\"agentName\":\"Scribe\",\"status\":\"thinking\"},{\"agentName\":\"Critic\",\"status\":\"thinking\"}],\"agentResponses\":[]}\n",
    );
    if matches!(scenario, Scenario::AgentError | Scenario::TerminalError) {
        wire.push_str(
            "data:{\"status\":[],\"agentResponses\":[],\"error\":\"agent Critic timed out\"}\n",
        );
    }
    wire.push_str(
        "data:{\"status\":[],\"agentResponses\":[{\"agentName\":\"Scribe\",\"content\":\"Here is \"}]}\n",
    );
    wire.push_str(
        "data:{\"status\":[],\"agentResponses\":[{\"agentName\":\"Scribe\",\"content\":\"the plan.\"}]}\n",
    );
    wire.push_str(sentinel.frame());
    wire
}

fn reflection_wire(scenario: Scenario, sentinel: Sentinel) -> String {
    let mut wire = String::new();
    wire.push_str("data:{\"status\":[\"drafting candidate 1\"]}\n");
    if matches!(scenario, Scenario::TerminalError) {
        wire.push_str("data:{\"error\":\"agent timeout\"}\n");
        // Deliberately keep streaming: a correct client stops at the error.
        wire.push_str("data:{\"status\":[\"should never be seen\"]}\n");
        wire.push_str(sentinel.frame());
        return wire;
    }
    wire.push_str("data:{\"status\":[\"evaluating candidate 1\"]}\n");
    wire.push_str(
        "data:{\"reflection\":{\"id\":\"r-mock\",\"messages\":[{\"id\":\"m-1\",\"content\":\"Draft answer.\",\"senderName\":\"Sage\",\"isOptimal\":false}],\"evaluatorMessages\":[{\"id\":\"e-1\",\"content\":\"Needs detail.\",\"messageId\":\"m-1\"}]}}\n",
    );
    wire.push_str(
        "data:{\"reflection\":{\"id\":\"r-mock\",\"messages\":[{\"id\":\"m-1\",\"content\":\"Draft answer.\",\"senderName\":\"Sage\",\"isOptimal\":false},{\"id\":\"m-2\",\"content\":\"Refined answer with detail.\",\"senderName\":\"Sage\",\"isOptimal\":true}],\"evaluatorMessages\":[{\"id\":\"e-1\",\"content\":\"Needs detail.\",\"messageId\":\"m-1\"}]}}\n",
    );
    wire.push_str(sentinel.frame());
    wire
}

fn simple_response(
    status: StatusCode,
    content_type: &'static str,
    body: &'static [u8],
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn stream_response(wire: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(wire)));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    response
}
