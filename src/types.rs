//! OpenAI chat-completions wire types
//!
//! Inbound request shapes are deliberately lenient: unknown roles and
//! unexpected content shapes must be skipped by the normalizer, not rejected
//! at deserialization time.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// `owned_by` tag advertised for every model
pub const MODEL_OWNER: &str = "duckduckgo";

// ============================================================================
// Request types
// ============================================================================

/// Chat completion request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub stream: Option<bool>,
}

/// One conversational turn as sent by the client.
///
/// Deserialization never fails: a turn that is not an object, or whose
/// `role` is not a string, comes out with the offending fields unset and is
/// later skipped by the normalizer.
#[derive(Debug, Clone, Default)]
pub struct ChatMessage {
    pub role: Option<String>,
    pub content: Option<MessageContent>,
}

impl ChatMessage {
    /// Read a turn from arbitrary JSON
    pub fn from_value(value: &Value) -> Self {
        let content = match value.get("content") {
            None | Some(Value::Null) => None,
            Some(content) => MessageContent::deserialize(content).ok(),
        };

        Self {
            role: value.get("role").and_then(Value::as_str).map(str::to_string),
            content,
        }
    }
}

impl<'de> Deserialize<'de> for ChatMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Message content: plain text or an ordered list of parts
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    /// Any other JSON shape; carries no usable text
    Other(Value),
}

/// A single content part. Only parts with a string `text` field contribute.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text { text: String },
    Other(Value),
}

impl ContentPart {
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::Other(_) => None,
        }
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Incremental content of a streaming chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

/// One `chat.completion.chunk` SSE payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

/// Assistant message of a buffered completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// Buffered `chat.completion` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
}

impl ChatCompletion {
    /// Wrap fully aggregated assistant text
    pub fn new(model: &str, content: String) -> Self {
        Self {
            id: completion_id(),
            object: "chat.completion".to_string(),
            created: unix_now(),
            model: model.to_string(),
            choices: vec![CompletionChoice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content,
                },
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

/// Model information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

/// Models list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<Model>,
}

/// Generate a `chatcmpl-` identifier
pub fn completion_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("chatcmpl-{}", &uuid[..9])
}

/// Current Unix timestamp in seconds
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
