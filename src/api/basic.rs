//! Basic (multi-agent) chat: CRUD plus the streaming message send.

use bytes::Bytes;
use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::protocol::events::BasicChatEvent;
use crate::protocol::types::{BasicChat, BasicChatSpec};
use crate::stream::{read_event_stream, EventConsumer, EventFlow, StreamOutcome};

use super::ChatClient;

/// Callbacks for one basic-chat streaming turn.
///
/// Error policy: an `error` field inside a decoded event describes one
/// agent's failure and arrives through `on_response` like any other data —
/// the rest of the agents keep streaming. `on_error` fires only for
/// transport and decode failures, and exactly one of `on_error`/`on_done`
/// ends a turn (cancellation ends it with neither).
pub trait BasicChatHandler {
    /// One decoded event: status updates and/or incremental agent content.
    /// Merging fragments into per-agent running state (keyed by agent name)
    /// is the caller's job.
    fn on_response(&mut self, event: BasicChatEvent);

    fn on_done(&mut self);

    fn on_error(&mut self, message: &str);
}

struct BasicEventConsumer<'a, H: BasicChatHandler> {
    handler: &'a mut H,
    events: u64,
}

impl<H: BasicChatHandler> EventConsumer for BasicEventConsumer<'_, H> {
    type Event = BasicChatEvent;

    fn on_event(&mut self, event: BasicChatEvent) -> EventFlow {
        self.events += 1;
        if let Some(error) = event.error.as_deref() {
            tracing::debug!(error, "agent-scoped error forwarded as data");
        }
        self.handler.on_response(event);
        EventFlow::Continue
    }

    fn on_done(&mut self) {
        tracing::debug!(events = self.events, "basic-chat stream completed");
        self.handler.on_done();
    }

    fn on_error(&mut self, message: &str) {
        tracing::warn!(error = message, "basic-chat stream failed");
        self.handler.on_error(message);
    }
}

/// Drive a raw byte stream of basic-chat events into a handler.
///
/// Exposed separately from [`ChatClient::send_basic_message`] so the
/// dispatch logic can run against any byte source.
pub async fn drive_basic_events<S, E, H>(
    byte_stream: S,
    handler: &mut H,
    cancel: &CancellationToken,
) -> StreamOutcome
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
    H: BasicChatHandler,
{
    let mut consumer = BasicEventConsumer { handler, events: 0 };
    read_event_stream(byte_stream, &mut consumer, cancel).await
}

impl ChatClient {
    /// Send a message to a basic chat and stream the agents' replies.
    ///
    /// Returns `Err` for failures before streaming begins (request rejected,
    /// non-success status); once the stream is open, failures surface
    /// through the handler and the returned [`StreamOutcome`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the POST itself fails.
    pub async fn send_basic_message<H: BasicChatHandler>(
        &self,
        chat_id: &str,
        message: &str,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, ClientError> {
        let url = self.routes().basic_chat_messages(chat_id);
        let byte_stream = self.open_event_stream(&url, message).await?;
        Ok(drive_basic_events(byte_stream, handler, cancel).await)
    }

    /// Create a basic chat with its agent personas.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn create_basic_chat(&self, spec: &BasicChatSpec) -> Result<BasicChat, ClientError> {
        let body = serde_json::to_value(spec)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        self.request_data(http::Method::POST, &self.routes().basic_chats(), Some(&body))
            .await
    }

    /// List the signed-in user's basic chats.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn basic_chats(&self) -> Result<Vec<BasicChat>, ClientError> {
        self.request_data(http::Method::GET, &self.routes().basic_chats(), None)
            .await
    }

    /// Replace a basic chat's name and agent set.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn update_basic_chat(
        &self,
        chat_id: &str,
        spec: &BasicChatSpec,
    ) -> Result<BasicChat, ClientError> {
        let body = serde_json::to_value(spec)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        self.request_data(
            http::Method::PUT,
            &self.routes().basic_chat(chat_id),
            Some(&body),
        )
        .await
    }

    /// Delete a basic chat.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn delete_basic_chat(&self, chat_id: &str) -> Result<(), ClientError> {
        self.request_unit(http::Method::DELETE, &self.routes().basic_chat(chat_id), None)
            .await
    }
}
