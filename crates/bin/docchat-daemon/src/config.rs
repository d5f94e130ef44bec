use clap::{Parser, ValueEnum, builder::BoolishValueParser};
use docchat_core::synthesis::{
    AzureOpenAiConfig,
    DEFAULT_AZURE_API_VERSION,
    DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL,
    DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL,
    GeminiConfig,
    OpenAiConfig,
};
use docchat_core::{ApiKey, DocsConfig, SynthesisProvider};
use docchat_http::DEFAULT_MAX_BODY_BYTES;
use docchat_types::schema::{DEFAULT_DOCS_TOOL, DEFAULT_DOCS_URL, DEFAULT_DOCS_USER_AGENT};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use url::Url;

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Gemini,
    #[value(name = "azure-openai")]
    AzureOpenAi,
    #[value(name = "openai")]
    OpenAi,
}

#[derive(Parser, Debug)]
#[command(name = "docchatd", version, about = "Documentation chat daemon.")]
struct CliArgs {
    #[arg(long, env = "DOCCHAT_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(
        long,
        env = "DOCCHAT_MAX_BODY_BYTES",
        default_value_t = DEFAULT_MAX_BODY_BYTES
    )]
    max_body_bytes: usize,

    #[arg(long, env = "DOCCHAT_DOCS_URL", default_value = DEFAULT_DOCS_URL)]
    docs_url: String,

    #[arg(long, env = "DOCCHAT_DOCS_TOOL", default_value = DEFAULT_DOCS_TOOL)]
    docs_tool: String,

    #[arg(long, env = "DOCCHAT_DOCS_USER_AGENT", default_value = DEFAULT_DOCS_USER_AGENT)]
    docs_user_agent: String,

    #[arg(long, env = "DOCCHAT_DOCS_TOKEN", hide_env_values = true)]
    docs_token: Option<String>,

    #[arg(long, env = "DOCCHAT_PROVIDER", value_enum, default_value_t = ProviderKind::Gemini)]
    provider: ProviderKind,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "DOCCHAT_GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    gemini_model: String,

    #[arg(long, env = "DOCCHAT_GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    gemini_base_url: String,

    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    azure_endpoint: Option<String>,

    #[arg(long, env = "AZURE_OPENAI_KEY", hide_env_values = true)]
    azure_key: Option<String>,

    #[arg(long, env = "AZURE_OPENAI_DEPLOYMENT_NAME")]
    azure_deployment: Option<String>,

    #[arg(
        long,
        env = "AZURE_OPENAI_API_VERSION",
        default_value = DEFAULT_AZURE_API_VERSION
    )]
    azure_api_version: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "DOCCHAT_OPENAI_MODEL", default_value = DEFAULT_OPENAI_MODEL)]
    openai_model: String,

    #[arg(long, env = "DOCCHAT_OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    #[arg(
        long,
        env = "DOCCHAT_LOG_JSON",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    log_json: bool,
}

/// Runtime configuration loaded once from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct DocchatConfig {
    pub http_addr: SocketAddr,
    pub max_body_bytes: usize,
    pub docs: DocsConfig,
    pub provider: SynthesisProvider,
    pub log_json: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl DocchatConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for DocchatConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let docs_url = require_url("DOCCHAT_DOCS_URL", args.docs_url)?;
        if args.docs_tool.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "DOCCHAT_DOCS_TOOL",
                value: args.docs_tool,
            });
        }
        if args.max_body_bytes == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "DOCCHAT_MAX_BODY_BYTES",
                value: args.max_body_bytes.to_string(),
            });
        }

        let docs = DocsConfig::new(docs_url)
            .with_tool(args.docs_tool)
            .with_user_agent(args.docs_user_agent)
            .with_token(non_blank(args.docs_token).map(ApiKey::from));

        let provider = match args.provider {
            ProviderKind::Gemini => {
                let api_key = require("GEMINI_API_KEY", args.gemini_api_key)?;
                SynthesisProvider::Gemini(
                    GeminiConfig::new(ApiKey::from(api_key))
                        .with_model(args.gemini_model)
                        .with_base_url(require_url(
                            "DOCCHAT_GEMINI_BASE_URL",
                            args.gemini_base_url,
                        )?),
                )
            }
            ProviderKind::AzureOpenAi => {
                let endpoint = require("AZURE_OPENAI_ENDPOINT", args.azure_endpoint)?;
                let endpoint = require_url("AZURE_OPENAI_ENDPOINT", endpoint)?;
                let api_key = require("AZURE_OPENAI_KEY", args.azure_key)?;
                let deployment = require("AZURE_OPENAI_DEPLOYMENT_NAME", args.azure_deployment)?;
                SynthesisProvider::AzureOpenAi(
                    AzureOpenAiConfig::new(endpoint, ApiKey::from(api_key), deployment)
                        .with_api_version(args.azure_api_version),
                )
            }
            ProviderKind::OpenAi => {
                let api_key = require("OPENAI_API_KEY", args.openai_api_key)?;
                SynthesisProvider::OpenAi(
                    OpenAiConfig::new(ApiKey::from(api_key))
                        .with_model(args.openai_model)
                        .with_base_url(require_url(
                            "DOCCHAT_OPENAI_BASE_URL",
                            args.openai_base_url,
                        )?),
                )
            }
        };

        Ok(Self {
            http_addr: args.http_addr,
            max_body_bytes: args.max_body_bytes,
            docs,
            provider,
            log_json: args.log_json,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn require(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    non_blank(value).ok_or(ConfigError::MissingSetting(name))
}

/// Parses `value` as an absolute `http`/`https` URL with a host and returns its
/// normalized form.
fn require_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    parse_http_url(&value)
        .map(String::from)
        .ok_or(ConfigError::InvalidSetting { name, value })
}

fn parse_http_url(value: &str) -> Option<Url> {
    let url = Url::parse(value).ok()?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(url)
}
