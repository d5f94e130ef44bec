//! Completion providers used to synthesize the final answer.
//!
//! Every backend takes the same [`SynthesisRequest`] and yields the generated
//! text when the provider's response carries it at the expected path.

mod gemini;
mod openai;

use std::{error::Error, fmt};

use docchat_types::models::SynthesisRequest;
use reqwest::{Client, Response};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

pub use gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiConfig};
pub use openai::{
    AzureOpenAiConfig,
    DEFAULT_AZURE_API_VERSION,
    DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL,
    OpenAiConfig,
};

pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert assistant. Synthesize helpful answers based on the provided context.";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug)]
pub enum SynthesisError {
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(reqwest::Error),
}

impl SynthesisError {
    fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }

    fn decode(err: reqwest::Error) -> Self {
        Self::Decode(err.without_url())
    }
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "completion service request failed: {err}"),
            Self::Status { status, body } => {
                write!(f, "completion service responded with status {status}: {body}")
            }
            Self::Decode(err) => write!(f, "invalid completion service response: {err}"),
        }
    }
}

impl Error for SynthesisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) | Self::Decode(err) => Some(err),
            Self::Status { .. } => None,
        }
    }
}

/// Completion backend selected at startup.
#[derive(Debug, Clone)]
pub enum SynthesisProvider {
    Gemini(GeminiConfig),
    AzureOpenAi(AzureOpenAiConfig),
    OpenAi(OpenAiConfig),
}

impl SynthesisProvider {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gemini(_) => "gemini",
            Self::AzureOpenAi(_) => "azure-openai",
            Self::OpenAi(_) => "openai",
        }
    }
}

/// Client for the configured completion provider.
#[derive(Debug, Clone)]
pub struct SynthesisClient {
    http: Client,
    provider: SynthesisProvider,
}

impl SynthesisClient {
    #[must_use]
    pub fn new(provider: SynthesisProvider) -> Self {
        Self::with_http(Client::new(), provider)
    }

    /// Creates a client sharing an existing connection pool.
    #[must_use]
    pub const fn with_http(http: Client, provider: SynthesisProvider) -> Self {
        Self { http, provider }
    }

    #[must_use]
    pub const fn provider(&self) -> &SynthesisProvider {
        &self.provider
    }

    /// Sends the prompt to the provider and extracts the generated text.
    ///
    /// Returns `Ok(None)` when the response lacks text at the provider's
    /// expected path.
    ///
    /// # Errors
    /// Returns `SynthesisError` on transport failure, a non-success status, or
    /// a body that is not the provider's JSON shape.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Option<String>, SynthesisError> {
        debug!(provider = self.provider.name(), "requesting completion");
        match &self.provider {
            SynthesisProvider::Gemini(config) => {
                gemini::complete(&self.http, config, request).await
            }
            SynthesisProvider::AzureOpenAi(config) => {
                openai::complete_azure(&self.http, config, request).await
            }
            SynthesisProvider::OpenAi(config) => {
                openai::complete_openai(&self.http, config, request).await
            }
        }
    }
}

/// Fails on a non-success status, keeping the upstream body for the logs.
async fn ensure_success(response: Response) -> Result<Response, SynthesisError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|err| {
        warn!(
            status = status.as_u16(),
            error = %err.without_url(),
            "failed to read completion error body"
        );
        String::new()
    });
    Err(SynthesisError::Status {
        status: status.as_u16(),
        body,
    })
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.is_empty())
}

/// Reads a missing or `null` list as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
