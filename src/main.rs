use std::env;
use std::process::ExitCode;

use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;

use conclave_client::api::{BasicChatHandler, ChatClient, ReflectionChatHandler};
use conclave_client::config::{load_config, ClientConfig};
use conclave_client::observability::init_tracing;
use conclave_client::protocol::events::BasicChatEvent;
use conclave_client::protocol::types::Reflection;
use conclave_client::stream::StreamOutcome;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

enum Command {
    Chat { chat_id: String, message: String },
    Reflect { chat_id: String, message: String },
}

fn main() -> ExitCode {
    let (config_path, command) = match parse_args(env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let config = load_config(&config_path).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Please copy 'config.example.yaml' to '{config_path}' and modify as needed.");
        std::process::exit(1);
    });

    init_tracing(&config.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize Tokio runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(run(config, command))
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<(String, Command), String> {
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();

    let command_name = loop {
        match args.next() {
            Some(arg) if arg == "--config" => {
                config_path = args
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
            }
            Some(arg) => break arg,
            None => return Err("missing command".to_string()),
        }
    };

    let chat_id = args
        .next()
        .ok_or_else(|| format!("{command_name} requires a chat id"))?;
    let message = args.collect::<Vec<_>>().join(" ");
    if message.is_empty() {
        return Err(format!("{command_name} requires a message"));
    }

    let command = match command_name.as_str() {
        "chat" => Command::Chat { chat_id, message },
        "reflect" => Command::Reflect { chat_id, message },
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok((config_path, command))
}

fn print_usage() {
    eprintln!("Usage: conclave [--config <path>] <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  chat <chat-id> <message...>      stream a multi-agent chat turn");
    eprintln!("  reflect <chat-id> <message...>   stream a reflection refinement turn");
}

async fn run(config: ClientConfig, command: Command) -> ExitCode {
    let client = match ChatClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to build client: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = client.guest_login().await {
        eprintln!("Guest login failed: {err}");
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling stream");
            signal_cancel.cancel();
        }
    });

    let result = match command {
        Command::Chat { chat_id, message } => {
            let mut handler = CliBasicHandler::default();
            client
                .send_basic_message(&chat_id, &message, &mut handler, &cancel)
                .await
        }
        Command::Reflect { chat_id, message } => {
            let mut handler = CliReflectionHandler::default();
            client
                .send_reflection_message(&chat_id, &message, &mut handler, &cancel)
                .await
        }
    };

    match result {
        Ok(StreamOutcome::Completed) => ExitCode::SUCCESS,
        Ok(StreamOutcome::Cancelled) => {
            eprintln!("cancelled");
            ExitCode::SUCCESS
        }
        Ok(StreamOutcome::Stopped | StreamOutcome::Failed) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Send failed: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Accumulates per-agent content keyed by agent name; the stream delivers
/// interleaved fragments and merging them is the caller's job.
#[derive(Default)]
struct CliBasicHandler {
    responses: FxHashMap<String, String>,
    arrival_order: Vec<String>,
}

impl BasicChatHandler for CliBasicHandler {
    fn on_response(&mut self, event: BasicChatEvent) {
        for status in &event.status {
            tracing::info!(agent = %status.agent_name, status = %status.status, "agent status");
        }
        if let Some(error) = event.error.as_deref() {
            eprintln!("[agent error] {error}");
        }
        for response in event.agent_responses {
            if !self.responses.contains_key(&response.agent_name) {
                self.arrival_order.push(response.agent_name.clone());
            }
            self.responses
                .entry(response.agent_name)
                .or_default()
                .push_str(&response.content);
        }
    }

    fn on_done(&mut self) {
        for agent_name in &self.arrival_order {
            if let Some(content) = self.responses.get(agent_name) {
                println!("{agent_name}: {content}");
            }
        }
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("stream error: {message}");
    }
}

#[derive(Default)]
struct CliReflectionHandler {
    latest: Option<Reflection>,
}

impl ReflectionChatHandler for CliReflectionHandler {
    fn on_status(&mut self, status: Vec<String>) {
        for line in status {
            tracing::info!(status = %line, "reflection status");
        }
    }

    fn on_reflection(&mut self, reflection: Reflection) {
        self.latest = Some(reflection);
    }

    fn on_done(&mut self) {
        let Some(reflection) = self.latest.take() else {
            eprintln!("stream ended without a reflection");
            return;
        };
        for message in &reflection.messages {
            let marker = if message.is_optimal { " [optimal]" } else { "" };
            println!("{}{}: {}", message.sender_name, marker, message.content);
        }
        for evaluation in &reflection.evaluator_messages {
            tracing::debug!(
                evaluation = %evaluation.content,
                candidate = evaluation.message_id.as_deref().unwrap_or(""),
                "evaluator commentary"
            );
        }
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("stream error: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_chat() {
        let (config_path, command) = parse_args(
            ["chat", "c-1", "hello", "world"]
                .iter()
                .map(ToString::to_string),
        )
        .expect("parse");
        assert_eq!(config_path, DEFAULT_CONFIG_PATH);
        match command {
            Command::Chat { chat_id, message } => {
                assert_eq!(chat_id, "c-1");
                assert_eq!(message, "hello world");
            }
            Command::Reflect { .. } => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_parse_args_config_override() {
        let (config_path, _) = parse_args(
            ["--config", "prod.yaml", "reflect", "r-1", "hi"]
                .iter()
                .map(ToString::to_string),
        )
        .expect("parse");
        assert_eq!(config_path, "prod.yaml");
    }

    #[test]
    fn test_parse_args_rejects_missing_message() {
        assert!(parse_args(["chat", "c-1"].iter().map(ToString::to_string)).is_err());
    }

    #[test]
    fn test_parse_args_rejects_unknown_command() {
        assert!(parse_args(["ponder", "c-1", "hi"].iter().map(ToString::to_string)).is_err());
    }
}
