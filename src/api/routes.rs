//! Endpoint table for the chat backend.
//!
//! Routes are plain strings rooted at the configured base URL; the transport
//! layer caches the parsed form. Resource ids are backend-minted UUIDs, so
//! they embed directly into the path.

use crate::error::ClientError;

/// Route builder rooted at a validated base URL.
#[derive(Debug, Clone)]
pub struct Routes {
    base: String,
}

impl Routes {
    /// Build a route table from the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the base URL does not parse or
    /// uses a scheme other than http/https.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = url::Url::parse(trimmed)
            .map_err(|err| ClientError::Config(format!("invalid base_url: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(
                "base_url must use http:// or https://".to_string(),
            ));
        }
        Ok(Self {
            base: trimmed.to_string(),
        })
    }

    // -- auth --

    #[must_use]
    pub fn login(&self) -> String {
        format!("{}/login", self.base)
    }

    #[must_use]
    pub fn guest_login(&self) -> String {
        format!("{}/guest-login", self.base)
    }

    #[must_use]
    pub fn sign_up(&self) -> String {
        format!("{}/signup", self.base)
    }

    #[must_use]
    pub fn sign_out(&self) -> String {
        format!("{}/logout", self.base)
    }

    #[must_use]
    pub fn me(&self) -> String {
        format!("{}/me", self.base)
    }

    // -- free-form chats --

    #[must_use]
    pub fn chats(&self) -> String {
        format!("{}/chats", self.base)
    }

    #[must_use]
    pub fn chat(&self, chat_id: &str) -> String {
        format!("{}/chats/{chat_id}", self.base)
    }

    #[must_use]
    pub fn chat_messages(&self, chat_id: &str) -> String {
        format!("{}/chats/{chat_id}/messages", self.base)
    }

    // -- basic (multi-agent) chats --

    #[must_use]
    pub fn basic_chats(&self) -> String {
        format!("{}/basic-chats", self.base)
    }

    #[must_use]
    pub fn basic_chat(&self, chat_id: &str) -> String {
        format!("{}/basic-chats/{chat_id}", self.base)
    }

    #[must_use]
    pub fn basic_chat_messages(&self, chat_id: &str) -> String {
        format!("{}/basic-chats/{chat_id}/messages", self.base)
    }

    // -- reflection chats --

    #[must_use]
    pub fn reflection_chats(&self) -> String {
        format!("{}/reflection-chats", self.base)
    }

    #[must_use]
    pub fn reflection_chat(&self, chat_id: &str) -> String {
        format!("{}/reflection-chats/{chat_id}", self.base)
    }

    #[must_use]
    pub fn reflection_chat_messages(&self, chat_id: &str) -> String {
        format!("{}/reflection-chats/{chat_id}/messages", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_strip_trailing_slash() {
        let routes = Routes::new("http://localhost:4000/").expect("routes");
        assert_eq!(routes.me(), "http://localhost:4000/me");
    }

    #[test]
    fn test_streaming_message_routes() {
        let routes = Routes::new("https://chat.example.com").expect("routes");
        assert_eq!(
            routes.basic_chat_messages("b-1"),
            "https://chat.example.com/basic-chats/b-1/messages"
        );
        assert_eq!(
            routes.reflection_chat_messages("r-1"),
            "https://chat.example.com/reflection-chats/r-1/messages"
        );
    }

    #[test]
    fn test_chat_routes() {
        let routes = Routes::new("http://localhost:4000").expect("routes");
        assert_eq!(routes.chats(), "http://localhost:4000/chats");
        assert_eq!(routes.chat("c-9"), "http://localhost:4000/chats/c-9");
        assert_eq!(
            routes.chat_messages("c-9"),
            "http://localhost:4000/chats/c-9/messages"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(Routes::new("ftp://chat.example.com").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Routes::new("not a url").is_err());
    }
}
