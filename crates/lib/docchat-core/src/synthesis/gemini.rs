use docchat_types::models::SynthesisRequest;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_TEMPERATURE, SynthesisError, ensure_success, non_empty};
use crate::secret::ApiKey;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
const MAX_OUTPUT_TOKENS: u32 = 800;
const INSTRUCTION: &str =
    "You are an expert assistant. Synthesize a helpful answer based on the provided context.";

/// Settings for the Generative Language API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim()
        )
    }
}

pub(super) async fn complete(
    http: &Client,
    config: &GeminiConfig,
    request: &SynthesisRequest,
) -> Result<Option<String>, SynthesisError> {
    let response = http
        .post(config.endpoint())
        .query(&[("key", config.api_key.expose())])
        .json(&GenerateContentRequest::from_request(request))
        .send()
        .await
        .map_err(SynthesisError::transport)?;

    let output: GenerateContentResponse = ensure_success(response)
        .await?
        .json()
        .await
        .map_err(SynthesisError::decode)?;

    Ok(output.into_text())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_request(request: &SynthesisRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(format!("{INSTRUCTION}\n\n{}", request.prompt())),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: DEFAULT_TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    candidates: Vec<GeminiCandidate>,
}

impl GenerateContentResponse {
    /// Text at `candidates[0].content.parts[0].text`.
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let part = candidate.content?.parts.into_iter().next()?;
        non_empty(part.text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}
