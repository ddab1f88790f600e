//! Reflection chat: CRUD plus the streaming refinement turn.

use bytes::Bytes;
use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::protocol::events::ReflectionChatEvent;
use crate::protocol::types::{Reflection, ReflectionChat, ReflectionChatSpec};
use crate::stream::{read_event_stream, EventConsumer, EventFlow, StreamOutcome};

use super::ChatClient;

/// Callbacks for one reflection streaming turn.
///
/// Error policy: an `error` field inside a decoded event is terminal — the
/// single refining agent has failed, so `on_error` fires, no later events
/// are processed, and `on_done` is **not** called. Reset any "sending"
/// state in both `on_done` and `on_error`.
pub trait ReflectionChatHandler {
    /// Progress notices for the refinement loop.
    fn on_status(&mut self, status: Vec<String>);

    /// The refinement cycle so far: candidate messages, evaluator
    /// commentary, and the optimal flag once chosen.
    fn on_reflection(&mut self, reflection: Reflection);

    fn on_error(&mut self, message: &str);

    fn on_done(&mut self);
}

struct ReflectionEventConsumer<'a, H: ReflectionChatHandler> {
    handler: &'a mut H,
}

impl<H: ReflectionChatHandler> EventConsumer for ReflectionEventConsumer<'_, H> {
    type Event = ReflectionChatEvent;

    fn on_event(&mut self, event: ReflectionChatEvent) -> EventFlow {
        if event.is_empty() {
            self.handler
                .on_error("event carried no status, reflection, or error");
            return EventFlow::Stop;
        }
        if let Some(error) = event.error {
            tracing::warn!(%error, "reflection stream reported an error, stopping");
            self.handler.on_error(&error);
            return EventFlow::Stop;
        }
        if let Some(status) = event.status {
            self.handler.on_status(status);
        }
        if let Some(reflection) = event.reflection {
            self.handler.on_reflection(reflection);
        }
        EventFlow::Continue
    }

    fn on_done(&mut self) {
        tracing::debug!("reflection stream completed");
        self.handler.on_done();
    }

    fn on_error(&mut self, message: &str) {
        tracing::warn!(error = message, "reflection stream failed");
        self.handler.on_error(message);
    }
}

/// Drive a raw byte stream of reflection events into a handler.
pub async fn drive_reflection_events<S, E, H>(
    byte_stream: S,
    handler: &mut H,
    cancel: &CancellationToken,
) -> StreamOutcome
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
    H: ReflectionChatHandler,
{
    let mut consumer = ReflectionEventConsumer { handler };
    read_event_stream(byte_stream, &mut consumer, cancel).await
}

impl ChatClient {
    /// Send a prompt to a reflection chat and stream the refinement cycle.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the POST itself fails; once streaming
    /// begins, failures surface through the handler.
    pub async fn send_reflection_message<H: ReflectionChatHandler>(
        &self,
        chat_id: &str,
        content: &str,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, ClientError> {
        let url = self.routes().reflection_chat_messages(chat_id);
        let byte_stream = self.open_event_stream(&url, content).await?;
        Ok(drive_reflection_events(byte_stream, handler, cancel).await)
    }

    /// Create a reflection chat.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn create_reflection_chat(
        &self,
        chat_name: &str,
    ) -> Result<ReflectionChat, ClientError> {
        let spec = ReflectionChatSpec {
            chat_name: chat_name.to_string(),
        };
        let body = serde_json::to_value(&spec)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        self.request_data(
            http::Method::POST,
            &self.routes().reflection_chats(),
            Some(&body),
        )
        .await
    }

    /// List the signed-in user's reflection chats.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn reflection_chats(&self) -> Result<Vec<ReflectionChat>, ClientError> {
        self.request_data(http::Method::GET, &self.routes().reflection_chats(), None)
            .await
    }

    /// Delete a reflection chat.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn delete_reflection_chat(&self, chat_id: &str) -> Result<(), ClientError> {
        self.request_unit(
            http::Method::DELETE,
            &self.routes().reflection_chat(chat_id),
            None,
        )
        .await
    }
}
