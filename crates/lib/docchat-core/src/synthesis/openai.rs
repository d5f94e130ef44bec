use docchat_types::models::SynthesisRequest;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_TEMPERATURE, SYSTEM_INSTRUCTION, SynthesisError, ensure_success, non_empty};
use crate::secret::ApiKey;

pub const DEFAULT_AZURE_API_VERSION: &str = "2025-01-01-preview";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
const MAX_TOKENS: u32 = 500;

/// Settings for an Azure OpenAI chat-completions deployment.
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    pub endpoint: String,
    pub api_key: ApiKey,
    pub deployment: String,
    pub api_version: String,
}

impl AzureOpenAiConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: ApiKey, deployment: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            deployment: deployment.into(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        )
    }
}

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
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

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

pub(super) async fn complete_azure(
    http: &Client,
    config: &AzureOpenAiConfig,
    request: &SynthesisRequest,
) -> Result<Option<String>, SynthesisError> {
    let response = http
        .post(config.url())
        .query(&[("api-version", config.api_version.as_str())])
        .header("api-key", config.api_key.expose())
        .json(&ChatCompletionsRequest::from_request(None, request))
        .send()
        .await
        .map_err(SynthesisError::transport)?;

    read_reply(response).await
}

pub(super) async fn complete_openai(
    http: &Client,
    config: &OpenAiConfig,
    request: &SynthesisRequest,
) -> Result<Option<String>, SynthesisError> {
    let response = http
        .post(config.url())
        .bearer_auth(config.api_key.expose())
        .json(&ChatCompletionsRequest::from_request(
            Some(config.model.clone()),
            request,
        ))
        .send()
        .await
        .map_err(SynthesisError::transport)?;

    read_reply(response).await
}

async fn read_reply(response: reqwest::Response) -> Result<Option<String>, SynthesisError> {
    let output: ChatCompletionsResponse = ensure_success(response)
        .await?
        .json()
        .await
        .map_err(SynthesisError::decode)?;
    Ok(output.into_text())
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<ChatCompletionsMessage>,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionsRequest {
    fn from_request(model: Option<String>, request: &SynthesisRequest) -> Self {
        Self {
            model,
            messages: vec![
                ChatCompletionsMessage {
                    role: "system".to_owned(),
                    content: SYSTEM_INSTRUCTION.to_owned(),
                },
                ChatCompletionsMessage {
                    role: "user".to_owned(),
                    content: request.prompt(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    choices: Vec<ChatCompletionsChoice>,
}

impl ChatCompletionsResponse {
    /// Text at `choices[0].message.content`.
    fn into_text(self) -> Option<String> {
        let choice = self.choices.into_iter().next()?;
        non_empty(choice.message?.content)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsChoice {
    #[serde(default)]
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn azure_payload_has_system_and_user_messages_without_model() {
        let request = SynthesisRequest::new("ctx", "q?");
        let payload = serde_json::to_value(ChatCompletionsRequest::from_request(None, &request))
            .expect("serialize payload");

        assert_eq!(
            payload,
            json!({
                "messages": [
                    { "role": "system", "content": SYSTEM_INSTRUCTION },
                    { "role": "user", "content": "Context:\nctx\n\nQuestion:\nq?" }
                ],
                "max_tokens": 500,
                "temperature": 0.7_f32
            })
        );
    }

    #[test]
    fn openai_payload_names_model() {
        let request = SynthesisRequest::new("ctx", "q?");
        let payload = serde_json::to_value(ChatCompletionsRequest::from_request(
            Some("gpt-4".to_string()),
            &request,
        ))
        .expect("serialize payload");

        assert_eq!(payload["model"], "gpt-4");
    }

    #[test]
    fn extracts_first_choice_content() {
        let response: ChatCompletionsResponse = serde_json::from_value(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "done" } }]
        }))
        .expect("parse response");

        assert_eq!(response.into_text().as_deref(), Some("done"));
    }

    #[test]
    fn missing_content_yields_none() {
        for body in [
            json!({}),
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": { "role": "assistant", "content": null } }] }),
            json!({ "choices": [{ "finish_reason": "content_filter" }] }),
            json!({ "choices": null }),
            json!({ "choices": [{ "message": null }] }),
        ] {
            let response: ChatCompletionsResponse =
                serde_json::from_value(body.clone()).expect("parse response");
            assert_eq!(response.into_text(), None, "body: {body}");
        }
    }

    #[test]
    fn azure_url_uses_deployment_path() {
        let config = AzureOpenAiConfig::new(
            "https://example.openai.azure.com/",
            ApiKey::new("k"),
            "gpt4o",
        );

        assert_eq!(
            config.url(),
            "https://example.openai.azure.com/openai/deployments/gpt4o/chat/completions"
        );
        assert_eq!(config.api_version, "2025-01-01-preview");
    }
}
