//! API request and response models (OpenAI compatible)

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Chat completion request (OpenAI compatible)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChatCompletionRequest {
    /// The model whose configured backend webhook handles this request
    pub model: String,

    /// Conversation messages; only the latest turn is forwarded
    pub messages: Vec<ChatMessage>,

    /// Caller-supplied end-user identifier, forwarded as the backend session id
    #[serde(default)]
    pub user: Option<String>,

    /// Stream the response as server-sent events instead of one JSON object
    #[serde(default)]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Whether the caller asked for a streamed response
    pub fn is_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }

    /// Session id forwarded to the backend, empty when the caller sent none
    pub fn session_id(&self) -> String {
        self.user.clone().unwrap_or_default()
    }

    /// Text of the last content part of the last message, if any.
    ///
    /// Only this single turn reaches the backend; earlier messages are kept
    /// client-side.
    pub fn latest_input(&self) -> Option<&str> {
        self.messages
            .last()
            .and_then(|message| message.content.last_text())
    }
}

/// One conversation message
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChatMessage {
    /// Message author role ("system", "user", "assistant")
    pub role: String,

    /// Message body, in either of the shapes OpenAI clients send
    pub content: MessageContent,
}

/// Message content, either a plain string or a list of typed parts
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum MessageContent {
    /// `"content": "hello"`
    Text(String),
    /// `"content": [{"type": "text", "text": "hello"}]`
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Text of the last part, treating plain string content as a single part
    pub fn last_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(parts) => parts.last().map(|part| part.text.as_str()),
        }
    }
}

/// One unit of text within a message
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ContentPart {
    /// Part type tag (e.g. "text"); not interpreted by the gateway
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Text payload of the part
    #[serde(default)]
    pub text: String,
}

/// Chat completion response (non-streaming)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChatCompletionResponse {
    /// Unique completion identifier
    pub id: String,

    /// Always "chat.completion"
    pub object: String,

    /// Unix timestamp of creation
    pub created: i64,

    /// Model that produced the completion
    pub model: String,

    /// Completion choices (always exactly one)
    pub choices: Vec<CompletionChoice>,
}

impl ChatCompletionResponse {
    /// Assemble the single-choice response around aggregated backend output
    pub fn assistant(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: completion_id(),
            object: "chat.completion".to_string(),
            created: Utc::now().timestamp(),
            model: model.into(),
            choices: vec![CompletionChoice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content: content.into(),
                },
                finish_reason: "stop".to_string(),
            }],
        }
    }
}

/// One completion choice
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: String,
}

/// The assistant message inside a completion choice
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

/// One streamed completion chunk (the body of a single SSE frame)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChatCompletionChunk {
    /// Completion identifier, shared by every chunk of one stream
    pub id: String,

    /// Always "chat.completion.chunk"
    pub object: String,

    /// Unix timestamp shared by every chunk of one stream
    pub created: i64,

    /// Model that produced the completion
    pub model: String,

    /// Chunk choices (always exactly one)
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// First frame of a stream: announces the assistant role, carries no content
    pub fn role_chunk(id: &str, created: i64, model: &str) -> Self {
        Self::with_choice(
            id,
            created,
            model,
            ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    role: Some("assistant".to_string()),
                    content: None,
                },
                finish_reason: None,
            },
        )
    }

    /// One incremental content delta
    pub fn content_chunk(id: &str, created: i64, model: &str, content: impl Into<String>) -> Self {
        Self::with_choice(
            id,
            created,
            model,
            ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    role: None,
                    content: Some(content.into()),
                },
                finish_reason: None,
            },
        )
    }

    /// Terminal frame: empty delta, finish reason "stop"
    pub fn finish_chunk(id: &str, created: i64, model: &str) -> Self {
        Self::with_choice(
            id,
            created,
            model,
            ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    role: None,
                    content: None,
                },
                finish_reason: Some("stop".to_string()),
            },
        )
    }

    fn with_choice(id: &str, created: i64, model: &str, choice: ChunkChoice) -> Self {
        Self {
            id: id.to_string(),
            object: "chat.completion.chunk".to_string(),
            created,
            model: model.to_string(),
            choices: vec![choice],
        }
    }
}

/// One choice within a streamed chunk
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Incremental message fields; absent fields are omitted from the frame
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Model list response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ModelListResponse {
    /// Always "list"
    pub object: String,

    /// All configured models
    pub data: Vec<ModelInfo>,
}

/// One configured model
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ModelInfo {
    /// Model name as configured in the mapping
    pub id: String,

    /// Always "model"
    pub object: String,

    /// Unix timestamp the registry was built; model entries carry no
    /// persisted lifecycle of their own
    pub created: i64,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of configured models
    pub models: usize,
}

/// Fresh `chatcmpl-` prefixed identifier, shared by all chunks of one completion
pub fn completion_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json(body: serde_json::Value) -> ChatCompletionRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_request_accepts_string_content() {
        let request = request_json(serde_json::json!({
            "model": "assistant",
            "messages": [{"role": "user", "content": "hello"}]
        }));
        assert_eq!(request.latest_input(), Some("hello"));
        assert!(!request.is_stream());
        assert_eq!(request.session_id(), "");
    }

    #[test]
    fn test_request_accepts_content_parts() {
        let request = request_json(serde_json::json!({
            "model": "assistant",
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "first"},
                    {"type": "text", "text": "second"}
                ]
            }],
            "user": "u-1",
            "stream": true
        }));
        assert_eq!(request.latest_input(), Some("second"));
        assert!(request.is_stream());
        assert_eq!(request.session_id(), "u-1");
    }

    #[test]
    fn test_latest_input_uses_last_message() {
        let request = request_json(serde_json::json!({
            "model": "assistant",
            "messages": [
                {"role": "user", "content": "earlier turn"},
                {"role": "assistant", "content": "reply"},
                {"role": "user", "content": "latest turn"}
            ]
        }));
        assert_eq!(request.latest_input(), Some("latest turn"));
    }

    #[test]
    fn test_latest_input_absent_without_messages_or_parts() {
        let request = request_json(serde_json::json!({
            "model": "assistant",
            "messages": []
        }));
        assert_eq!(request.latest_input(), None);

        let request = request_json(serde_json::json!({
            "model": "assistant",
            "messages": [{"role": "user", "content": []}]
        }));
        assert_eq!(request.latest_input(), None);
    }

    #[test]
    fn test_completion_response_shape() {
        let response = ChatCompletionResponse::assistant("assistant", "hi there");
        assert!(response.id.starts_with("chatcmpl-"));
        assert_eq!(response.object, "chat.completion");
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.role, "assistant");
        assert_eq!(response.choices[0].message.content, "hi there");
        assert_eq!(response.choices[0].finish_reason, "stop");
    }

    #[test]
    fn test_role_chunk_omits_content_and_finish() {
        let chunk = ChatCompletionChunk::role_chunk("chatcmpl-1", 1, "assistant");
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["object"], "chat.completion.chunk");
        assert_eq!(json["choices"][0]["delta"]["role"], "assistant");
        assert!(json["choices"][0]["delta"].get("content").is_none());
        assert!(json["choices"][0].get("finish_reason").is_none());
    }

    #[test]
    fn test_content_chunk_carries_only_content() {
        let chunk = ChatCompletionChunk::content_chunk("chatcmpl-1", 1, "assistant", "tok");
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["choices"][0]["delta"]["content"], "tok");
        assert!(json["choices"][0]["delta"].get("role").is_none());
        assert!(json["choices"][0].get("finish_reason").is_none());
    }

    #[test]
    fn test_finish_chunk_has_empty_delta_and_stop_reason() {
        let chunk = ChatCompletionChunk::finish_chunk("chatcmpl-1", 1, "assistant");
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(json["choices"][0]["delta"], serde_json::json!({}));
    }

    #[test]
    fn test_completion_ids_are_unique() {
        assert_ne!(completion_id(), completion_id());
    }
}
