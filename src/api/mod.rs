//! Client surface for the chat backend: one [`ChatClient`] carrying the
//! transport, route table, and session store, with resource methods split
//! per surface (`auth`, `chats`, `basic`, `reflection`).

pub mod auth;
pub mod basic;
pub mod chats;
pub mod reflection;
pub mod routes;

pub use basic::{drive_basic_events, BasicChatHandler};
pub use reflection::{drive_reflection_events, ReflectionChatHandler};
pub use routes::Routes;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionStore;
use crate::transport::HttpTransport;

/// Client for the chat backend.
///
/// Cheap to share behind an `Arc`; all interior state (cookie jar, URL
/// cache, session store) is synchronized. The caller is responsible for not
/// issuing a second streaming send for the same chat while one is in flight.
pub struct ChatClient {
    transport: HttpTransport,
    routes: Routes,
    session: Arc<SessionStore>,
}

/// Backend response envelope: `{"data": ...}` on success, `{"error": "..."}`
/// on failure.
#[derive(Debug, serde::Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ApiEnvelope<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
}

impl ChatClient {
    /// Create a client with a fresh session store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the configured base URL is invalid.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_session(config, Arc::new(SessionStore::new()))
    }

    /// Create a client sharing an existing session store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the configured base URL is invalid.
    pub fn with_session(
        config: &ClientConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            transport: HttpTransport::new(config),
            routes: Routes::new(&config.base_url)?,
            session,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Issue a request and fail on any non-success status, preferring the
    /// backend envelope's error message.
    pub(crate) async fn request(
        &self,
        method: http::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self.transport.send_json(method, url, body).await?;
        Self::check_status(response).await
    }

    /// Issue a request and decode the envelope's `data` field.
    pub(crate) async fn request_data<T: DeserializeOwned>(
        &self,
        method: http::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ClientError> {
        let response = self.request(method, url, body).await?;
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|err| ClientError::Decode(format!("malformed response body: {err}")))?;
        if let Some(error) = envelope.error {
            return Err(ClientError::Api {
                status: 200,
                message: error,
            });
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response envelope carried no data".to_string()))
    }

    /// Issue a request, expecting no meaningful body back.
    pub(crate) async fn request_unit(
        &self,
        method: http::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(), ClientError> {
        let _ = self.request(method, url, body).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body_error = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|env| env.error);
        Err(ClientError::from_response_status(status, body_error))
    }

    /// POST a message to a streaming endpoint and hand back the response
    /// body as a byte stream.
    ///
    /// Transport failures and non-success statuses surface here, before any
    /// stream parsing begins. The returned stream is exclusively owned by
    /// the caller's read loop.
    pub(crate) async fn open_event_stream(
        &self,
        url: &str,
        message: &str,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>>, ClientError> {
        let body = json!({ "message": message });
        let response = self
            .transport
            .send_stream(http::Method::POST, url, Some(&body))
            .await?;
        let response = Self::check_status(response).await?;
        tracing::debug!(%url, "event stream opened");
        Ok(response.bytes_stream())
    }
}
