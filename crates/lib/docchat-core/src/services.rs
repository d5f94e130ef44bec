use std::error::Error;
use std::fmt;

use docchat_types::models::SynthesisRequest;
use docchat_types::schema::{REPLY_FALLBACK, REPLY_NO_READABLE_TEXT};
use reqwest::Client;
use tracing::{debug, warn};

use crate::docs::{DocsClient, DocsConfig, DocsError};
use crate::synthesis::{SynthesisClient, SynthesisError, SynthesisProvider};

#[derive(Debug)]
pub enum ChatError {
    EmptyMessage,
    Docs(DocsError),
    Synthesis(SynthesisError),
}

impl ChatError {
    /// Whether the caller, not an upstream, caused the failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "message is required"),
            Self::Docs(err) => write!(f, "{err}"),
            Self::Synthesis(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ChatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyMessage => None,
            Self::Docs(err) => Some(err),
            Self::Synthesis(err) => Some(err),
        }
    }
}

impl From<DocsError> for ChatError {
    fn from(err: DocsError) -> Self {
        Self::Docs(err)
    }
}

impl From<SynthesisError> for ChatError {
    fn from(err: SynthesisError) -> Self {
        Self::Synthesis(err)
    }
}

/// How a chat turn concluded. Every variant carries a reply for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The completion service produced an answer.
    Answered(String),
    /// The completion response had no text at the expected path.
    Fallback,
    /// The documentation search returned no readable text; synthesis was skipped.
    NoReadableText,
}

impl ChatOutcome {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Answered(_) => "answered",
            Self::Fallback => "fallback",
            Self::NoReadableText => "no_readable_text",
        }
    }

    #[must_use]
    pub fn reply(&self) -> &str {
        match self {
            Self::Answered(text) => text,
            Self::Fallback => REPLY_FALLBACK,
            Self::NoReadableText => REPLY_NO_READABLE_TEXT,
        }
    }

    #[must_use]
    pub fn into_reply(self) -> String {
        match self {
            Self::Answered(text) => text,
            other => other.reply().to_string(),
        }
    }
}

/// Orchestrates one chat turn: documentation search, then synthesis.
///
/// Built once from configuration and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct ChatService {
    docs: DocsClient,
    synthesis: SynthesisClient,
}

impl ChatService {
    #[must_use]
    pub const fn new(docs: DocsClient, synthesis: SynthesisClient) -> Self {
        Self { docs, synthesis }
    }

    /// Builds both clients over a single connection pool.
    #[must_use]
    pub fn from_config(docs: DocsConfig, provider: SynthesisProvider) -> Self {
        let http = Client::new();
        Self::new(
            DocsClient::with_http(http.clone(), docs),
            SynthesisClient::with_http(http, provider),
        )
    }

    #[must_use]
    pub const fn docs(&self) -> &DocsClient {
        &self.docs
    }

    #[must_use]
    pub const fn synthesis(&self) -> &SynthesisClient {
        &self.synthesis
    }

    /// Answers `message` using the documentation service and the completion provider.
    ///
    /// Each upstream is called at most once, in order. An empty documentation
    /// result ends the turn early with [`ChatOutcome::NoReadableText`].
    ///
    /// # Errors
    /// Returns `ChatError::EmptyMessage` for a blank message without contacting
    /// either upstream, and the upstream error for any failed step.
    pub async fn reply(&self, message: &str) -> Result<ChatOutcome, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let result = self.docs.search(message).await?;
        let context = result.text();
        if context.trim().is_empty() {
            debug!("documentation result has no readable text");
            return Ok(ChatOutcome::NoReadableText);
        }
        debug!(context_len = context.len(), "documentation context retrieved");

        let request = SynthesisRequest::new(context, message);
        match self.synthesis.synthesize(&request).await? {
            Some(answer) => Ok(ChatOutcome::Answered(answer)),
            None => {
                warn!(
                    provider = self.synthesis.provider().name(),
                    "completion response carried no text"
                );
                Ok(ChatOutcome::Fallback)
            }
        }
    }
}
