//! Documentation-service client.
//!
//! Issues a single JSON-RPC `tools/call` against the search tool and extracts
//! the tool result from the event-stream framed response.

use std::{error::Error, fmt};

use docchat_types::models::{DocQueryEnvelope, DocResultEnvelope, RpcError, ToolResult};
use docchat_types::schema::{
    DEFAULT_DOCS_TOOL,
    DEFAULT_DOCS_URL,
    DEFAULT_DOCS_USER_AGENT,
    DOCS_ACCEPT,
    make_request_id,
    make_search_question,
};
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, warn};

use crate::parsers::{EventStreamError, EventStreamParser};
use crate::secret::ApiKey;

#[derive(Debug)]
pub enum DocsError {
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Format { source: EventStreamError, body: String },
    Rpc(RpcError),
    MissingResult,
}

impl DocsError {
    fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

impl fmt::Display for DocsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "documentation service request failed: {err}"),
            Self::Status { status, body } => {
                write!(f, "documentation service responded with status {status}: {body}")
            }
            Self::Format { source, body } => {
                write!(f, "invalid documentation service response ({source}): {body}")
            }
            Self::Rpc(err) => match err.code {
                Some(code) => write!(f, "documentation service error {code}: {}", err.message),
                None => write!(f, "documentation service error: {}", err.message),
            },
            Self::MissingResult => {
                write!(f, "documentation service response has neither result nor error")
            }
        }
    }
}

impl Error for DocsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Format { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Connection settings for the documentation service.
#[derive(Debug, Clone)]
pub struct DocsConfig {
    pub url: String,
    pub tool: String,
    pub user_agent: String,
    pub token: Option<ApiKey>,
}

impl DocsConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tool: DEFAULT_DOCS_TOOL.to_string(),
            user_agent: DEFAULT_DOCS_USER_AGENT.to_string(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<ApiKey>) -> Self {
        self.token = token;
        self
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DOCS_URL)
    }
}

/// Client for the documentation search tool.
#[derive(Debug, Clone)]
pub struct DocsClient {
    http: Client,
    config: DocsConfig,
}

impl DocsClient {
    #[must_use]
    pub fn new(config: DocsConfig) -> Self {
        Self::with_http(Client::new(), config)
    }

    /// Creates a client sharing an existing connection pool.
    #[must_use]
    pub const fn with_http(http: Client, config: DocsConfig) -> Self {
        Self { http, config }
    }

    #[must_use]
    pub const fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Searches the documentation for `message` and returns the tool result.
    ///
    /// # Errors
    /// Returns `DocsError` on transport failure, a non-success status, a
    /// malformed event stream, or a JSON-RPC error response.
    pub async fn search(&self, message: &str) -> Result<ToolResult, DocsError> {
        let envelope = DocQueryEnvelope::tools_call(
            make_request_id(),
            &self.config.tool,
            make_search_question(message),
        );
        debug!(id = %envelope.id, tool = %self.config.tool, "querying documentation service");

        let mut request = self
            .http
            .post(&self.config.url)
            .header(ACCEPT, DOCS_ACCEPT)
            .header(USER_AGENT, &self.config.user_agent)
            .json(&envelope);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await.map_err(DocsError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(DocsError::transport)?;
        if !status.is_success() {
            return Err(DocsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = match EventStreamParser::parse(&body) {
            Ok(envelope) => envelope,
            Err(source) => return Err(DocsError::Format { source, body }),
        };
        let result = into_tool_result(envelope)?;
        if result.is_error {
            warn!(tool = %self.config.tool, "documentation tool reported an error result");
        }
        Ok(result)
    }
}

/// Splits a decoded envelope into its tool result or error.
///
/// # Errors
/// Returns `DocsError::Rpc` when the envelope carries an error object and
/// `DocsError::MissingResult` when it carries neither.
pub fn into_tool_result(envelope: DocResultEnvelope) -> Result<ToolResult, DocsError> {
    if let Some(error) = envelope.error {
        return Err(DocsError::Rpc(error));
    }
    envelope.result.ok_or(DocsError::MissingResult)
}
