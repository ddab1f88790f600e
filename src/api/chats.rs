//! CRUD for free-form chats plus the plain (non-streaming) message append.

use serde_json::json;

use crate::error::ClientError;
use crate::protocol::types::{Chat, ChatSpec, ChatUpdate};

use super::ChatClient;

impl ChatClient {
    /// Create a free-form chat.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn create_chat(&self, spec: &ChatSpec) -> Result<Chat, ClientError> {
        let body = serde_json::to_value(spec)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        self.request_data(http::Method::POST, &self.routes().chats(), Some(&body))
            .await
    }

    /// List the signed-in user's chats.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn chats(&self) -> Result<Vec<Chat>, ClientError> {
        self.request_data(http::Method::GET, &self.routes().chats(), None)
            .await
    }

    /// Fetch one chat with its message history.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn chat(&self, chat_id: &str) -> Result<Chat, ClientError> {
        self.request_data(http::Method::GET, &self.routes().chat(chat_id), None)
            .await
    }

    /// Append a message without streaming the agents' replies.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn add_message(&self, chat_id: &str, content: &str) -> Result<(), ClientError> {
        let body = json!({ "content": content });
        self.request_unit(
            http::Method::POST,
            &self.routes().chat_messages(chat_id),
            Some(&body),
        )
        .await
    }

    /// Rename a chat or reconfigure its agents.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or envelope decoding fails.
    pub async fn update_chat(&self, chat_id: &str, update: &ChatUpdate) -> Result<Chat, ClientError> {
        let body = serde_json::to_value(update)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        self.request_data(http::Method::PUT, &self.routes().chat(chat_id), Some(&body))
            .await
    }

    /// Delete a chat and its history.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn delete_chat(&self, chat_id: &str) -> Result<(), ClientError> {
        self.request_unit(http::Method::DELETE, &self.routes().chat(chat_id), None)
            .await
    }
}
