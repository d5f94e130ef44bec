use chrono::Utc;

pub const JSONRPC_VERSION: &str = "2.0";
pub const JSONRPC_MARKER: &str = "\"jsonrpc\"";
pub const METHOD_TOOLS_CALL: &str = "tools/call";
pub const EVENT_DATA_PREFIX: &str = "data:";

pub const CONTENT_KIND_TEXT: &str = "text";

pub const DEFAULT_DOCS_URL: &str = "https://learn.microsoft.com/api/mcp";
pub const DEFAULT_DOCS_TOOL: &str = "microsoft_docs_search";
pub const DEFAULT_DOCS_USER_AGENT: &str = "mcp-remote-client";
pub const DOCS_ACCEPT: &str = "application/json, text/event-stream";

pub const REPLY_NO_READABLE_TEXT: &str =
    "I found some documentation, but it didn't contain any readable text to analyze.";
pub const REPLY_FALLBACK: &str = "I'm sorry, I couldn't generate a response.";
pub const REPLY_GREETING: &str =
    "Hello! I can search the official Microsoft Learn documentation. What would you like to know?";

pub const ERROR_MESSAGE_REQUIRED: &str = "Message is required";
pub const ERROR_PROCESSING_FAILED: &str = "Failed to process the request.";

/// Builds the JSON-RPC request id for a chat turn.
#[must_use]
pub fn make_request_id() -> String {
    format!("chat-{}", Utc::now().timestamp_millis())
}

/// Wraps a raw user message in the instruction sent to the search tool.
#[must_use]
pub fn make_search_question(message: &str) -> String {
    format!(
        "Please provide a comprehensive and detailed explanation about: {message}. \
         Include practical examples, best practices, and step-by-step guidance where applicable."
    )
}
