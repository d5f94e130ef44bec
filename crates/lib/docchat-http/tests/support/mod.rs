#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use docchat_core::synthesis::{AzureOpenAiConfig, GeminiConfig, OpenAiConfig};
use docchat_core::{
    ApiKey,
    ChatService,
    DocsClient,
    DocsConfig,
    SynthesisClient,
    SynthesisProvider,
};
use serde_json::Value;
use tower::ServiceExt;
use tracing::subscriber::DefaultGuard;

pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// One request received by a fake upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Value,
}

struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: String,
    hits: Mutex<Vec<Recorded>>,
}

/// Upstream stand-in answering every request with a canned response.
pub struct FakeUpstream {
    pub base_url: String,
    canned: Arc<Canned>,
}

impl FakeUpstream {
    pub async fn start(status: StatusCode, content_type: &'static str, body: impl Into<String>) -> Self {
        let canned = Arc::new(Canned {
            status,
            content_type,
            body: body.into(),
            hits: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(respond).with_state(canned.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake upstream");
        let addr = listener.local_addr().expect("fake upstream addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake upstream serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            canned,
        }
    }

    /// Documentation service answering with a single event line.
    pub async fn docs_event(payload: &Value) -> Self {
        Self::start(
            StatusCode::OK,
            "text/event-stream",
            format!("event: message\ndata: {payload}\n\n"),
        )
        .await
    }

    pub async fn json(status: StatusCode, payload: &Value) -> Self {
        Self::start(status, "application/json", payload.to_string()).await
    }

    pub fn hits(&self) -> Vec<Recorded> {
        self.canned.hits.lock().expect("hits lock").clone()
    }
}

async fn respond(
    State(canned): State<Arc<Canned>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(ToString::to_string)
        .unwrap_or_default();
    canned.hits.lock().expect("hits lock").push(Recorded {
        path_and_query,
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    (
        canned.status,
        [(header::CONTENT_TYPE, canned.content_type)],
        canned.body.clone(),
    )
        .into_response()
}

pub fn tool_result(parts: &Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": "chat-1",
        "result": { "content": parts }
    })
}

pub fn gemini_answer(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

pub fn gemini_service(docs: &FakeUpstream, llm: &FakeUpstream) -> Arc<ChatService> {
    let provider = SynthesisProvider::Gemini(
        GeminiConfig::new(ApiKey::new("gemini-test-key")).with_base_url(llm.base_url.clone()),
    );
    service(docs, provider)
}

pub fn azure_service(docs: &FakeUpstream, llm: &FakeUpstream) -> Arc<ChatService> {
    let provider = SynthesisProvider::AzureOpenAi(AzureOpenAiConfig::new(
        llm.base_url.clone(),
        ApiKey::new("azure-test-key"),
        "gpt4o",
    ));
    service(docs, provider)
}

pub fn openai_service(docs: &FakeUpstream, llm: &FakeUpstream) -> Arc<ChatService> {
    let provider = SynthesisProvider::OpenAi(
        OpenAiConfig::new(ApiKey::new("openai-test-key"))
            .with_model("gpt-4o-mini")
            .with_base_url(format!("{}/v1", llm.base_url)),
    );
    service(docs, provider)
}

fn service(docs: &FakeUpstream, provider: SynthesisProvider) -> Arc<ChatService> {
    let http = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build http client");
    let docs = DocsConfig::new(format!("{}/api/mcp", docs.base_url));
    Arc::new(ChatService::new(
        DocsClient::with_http(http.clone(), docs),
        SynthesisClient::with_http(http, provider),
    ))
}

/// Sends one request through the router and returns status, headers and body.
pub async fn call(
    service: Arc<ChatService>,
    method: &str,
    body: Option<&str>,
) -> (StatusCode, HeaderMap, Bytes) {
    let app = docchat_http::build_router(service, MAX_BODY_BYTES);
    let request = Request::builder()
        .method(method)
        .uri(docchat_http::CHAT_ROUTE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
        .expect("build request");

    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, headers, body)
}

pub fn json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).expect("response body is JSON")
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes events on the current thread into a fresh capture until the guard drops.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
