use serde::{Deserialize, Serialize};

/// One turn of a conversation, as exchanged with both the caller and the
/// completion provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        ChatMessage {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Inbound body of `POST /api/v1/chat`.
///
/// `message` stays an `Option` so that an absent or null field reaches the
/// handler and gets the specific validation error instead of a generic
/// deserialization failure. `context` and `history` default to empty.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_to_empty() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message.as_deref(), Some("hi"));
        assert!(req.context.is_empty());
        assert!(req.history.is_empty());
    }

    #[test]
    fn null_message_deserializes_to_none() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": null}"#).unwrap();
        assert!(req.message.is_none());
    }

    #[test]
    fn history_preserves_order() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"message": "m", "history": [
                {"role": "user", "content": "a"},
                {"role": "assistant", "content": "b"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(req.history.len(), 2);
        assert_eq!(req.history[0].content, "a");
        assert_eq!(req.history[1].role, "assistant");
    }
}
