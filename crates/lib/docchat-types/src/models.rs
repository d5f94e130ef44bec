use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{
    CONTENT_KIND_TEXT,
    JSONRPC_VERSION,
    METHOD_TOOLS_CALL,
    REPLY_GREETING,
};

/// Author of a chat transcript entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A single turn of the chat transcript. Held in memory only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Ai,
        }
    }

    /// Opening message shown before the user has asked anything.
    #[must_use]
    pub fn greeting() -> Self {
        Self::ai(REPLY_GREETING)
    }
}

/// Inbound chat request body.
///
/// `message` is kept as a raw JSON value so that a non-string message is
/// treated the same way as a missing one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(Value::String(message.into())),
        }
    }

    /// Returns the message when it is a string with visible content.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
    }
}

/// Successful chat response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Outbound JSON-RPC `tools/call` request sent to the documentation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocQueryEnvelope {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: ToolCallParams,
}

impl DocQueryEnvelope {
    #[must_use]
    pub fn tools_call(
        id: impl Into<String>,
        tool: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: METHOD_TOOLS_CALL.to_string(),
            params: ToolCallParams {
                name: tool.into(),
                arguments: ToolArguments {
                    question: question.into(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: ToolArguments,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolArguments {
    pub question: String,
}

/// JSON-RPC response carried in the documentation service's event line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocResultEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// Result of a tool call: an ordered list of tagged content parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub content: Vec<ContentPart>,
    #[serde(
        default,
        rename = "isError",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_error: bool,
}

impl ToolResult {
    /// Concatenates every non-empty text part, in order, separated by a blank line.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// One unit of a tool result. Only `kind == "text"` parts carry usable text.
/// A part with a missing or non-string field still deserializes, and
/// [`ContentPart::text`] skips it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
}

impl ContentPart {
    #[must_use]
    pub fn text_part(text: impl Into<String>) -> Self {
        Self {
            kind: Value::from(CONTENT_KIND_TEXT),
            text: Some(Value::String(text.into())),
        }
    }

    /// Returns the text of a non-empty text part.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        if self.kind.as_str() != Some(CONTENT_KIND_TEXT) {
            return None;
        }
        self.text
            .as_ref()
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Context and question handed to a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub context: String,
    pub question: String,
}

impl SynthesisRequest {
    #[must_use]
    pub fn new(context: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            question: question.into(),
        }
    }

    /// User-facing prompt body shared by every provider.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "Context:\n{}\n\nQuestion:\n{}",
            self.context, self.question
        )
    }
}
