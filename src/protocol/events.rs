//! Stream event payloads carried inside `data:` frames.
//!
//! Shapes are validated strictly at the parse boundary: unknown top-level
//! fields are a decode error rather than a silently-ignored payload, so a
//! backend schema drift surfaces as `onError` instead of empty UI state.

use serde::Deserialize;

use crate::protocol::types::Reflection;

/// Per-agent activity notice ("thinking", "responding", ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub agent_name: String,
    pub status: String,
}

/// Incremental content from one agent. Successive fragments for the same
/// `agent_name` are additive; merging them is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub agent_name: String,
    pub content: String,
}

/// One decoded event on the basic (multi-agent) chat stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BasicChatEvent {
    #[serde(default)]
    pub status: Vec<AgentStatus>,
    #[serde(default)]
    pub agent_responses: Vec<AgentResponse>,
    /// A failure scoped to one agent. Non-terminal on this stream: the
    /// remaining agents keep talking, so this rides along as data.
    #[serde(default)]
    pub error: Option<String>,
}

/// One decoded event on the reflection chat stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReflectionChatEvent {
    #[serde(default)]
    pub status: Option<Vec<String>>,
    #[serde(default)]
    pub reflection: Option<Reflection>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ReflectionChatEvent {
    /// True when the event carries none of its recognized fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.reflection.is_none() && self.error.is_none()
    }
}
