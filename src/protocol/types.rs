//! Domain model shared by the REST service layer and the stream adapters.
//!
//! All wire shapes are camelCase JSON; ids are minted by the backend.

use serde::{Deserialize, Serialize};

/// Signed-in account, as returned by `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub full_name: String,
}

/// Persona attached to a free-form chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<AgentMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetadata {
    pub lingo: String,
    #[serde(default)]
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderType {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender_type: SenderType,
    #[serde(default)]
    pub sender_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Default,
    Basic,
    Reflection,
}

/// Free-form chat with its full message history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub chat_name: String,
    #[serde(rename = "type", default)]
    pub chat_type: Option<ChatType>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub agents: Vec<Agent>,
}

/// Agent persona configuration for a basic (multi-agent) chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAgentConfig {
    pub agent_name: String,
    #[serde(default)]
    pub agent_traits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicChat {
    pub id: String,
    pub chat_name: String,
    #[serde(default)]
    pub agents: Vec<BasicAgentConfig>,
}

/// One candidate answer inside a reflection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionMessage {
    pub id: String,
    pub content: String,
    pub sender_name: String,
    pub is_optimal: bool,
}

/// Evaluator commentary attached to one candidate message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorMessage {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// One full iterative refinement cycle for a single user prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<ReflectionMessage>,
    #[serde(default)]
    pub evaluator_messages: Vec<EvaluatorMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionChat {
    pub id: String,
    pub chat_name: String,
    #[serde(default)]
    pub reflections: Vec<Reflection>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for creating or updating a basic chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicChatSpec {
    pub chat_name: String,
    pub agents: Vec<BasicAgentConfig>,
}

/// Body for creating a reflection chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionChatSpec {
    pub chat_name: String,
}

/// Agent payload for creating or updating a free-form chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AgentMetadata>,
}

/// Body for creating a free-form chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSpec {
    pub chat_name: String,
    pub agents: Vec<AgentSpec>,
}

/// Body for updating a free-form chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatUpdate {
    pub chat_name: String,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    pub agents: Vec<AgentSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_decodes_camel_case() {
        let user: User = serde_json::from_str(
            r#"{"id":"u-1","userName":"ada","fullName":"Ada Lovelace"}"#,
        )
        .expect("decode");
        assert_eq!(user.user_name, "ada");
        assert_eq!(user.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_chat_tolerates_missing_collections() {
        let chat: Chat =
            serde_json::from_str(r#"{"id":"c-1","chatName":"planning"}"#).expect("decode");
        assert!(chat.messages.is_empty());
        assert!(chat.agents.is_empty());
        assert!(chat.chat_type.is_none());
    }

    #[test]
    fn test_reflection_decodes_nested_messages() {
        let reflection: Reflection = serde_json::from_str(
            r#"{
                "id":"r-1",
                "messages":[
                    {"id":"m-1","content":"draft","senderName":"Sage","isOptimal":false},
                    {"id":"m-2","content":"final","senderName":"Sage","isOptimal":true}
                ],
                "evaluatorMessages":[
                    {"id":"e-1","content":"too vague","messageId":"m-1"}
                ]
            }"#,
        )
        .expect("decode");
        assert_eq!(reflection.messages.len(), 2);
        assert!(reflection.messages[1].is_optimal);
        assert_eq!(
            reflection.evaluator_messages[0].message_id.as_deref(),
            Some("m-1")
        );
    }

    #[test]
    fn test_basic_chat_spec_serializes_camel_case() {
        let spec = BasicChatSpec {
            chat_name: "standup".to_string(),
            agents: vec![BasicAgentConfig {
                agent_name: "Scribe".to_string(),
                agent_traits: vec!["concise".to_string()],
            }],
        };
        let json = serde_json::to_value(&spec).expect("serialize");
        assert_eq!(json["chatName"], "standup");
        assert_eq!(json["agents"][0]["agentName"], "Scribe");
        assert_eq!(json["agents"][0]["agentTraits"][0], "concise");
    }

    #[test]
    fn test_chat_update_renames_type_field() {
        let update = ChatUpdate {
            chat_name: "renamed".to_string(),
            chat_type: ChatType::Default,
            agents: vec![],
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json["type"], "default");
    }
}
