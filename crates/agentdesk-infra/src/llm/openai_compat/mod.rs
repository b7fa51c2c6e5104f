//! OpenAI-compatible chat-completions client.
//!
//! Sends `POST {base_url}/chat/completions` with a bearer credential and
//! exposes the reply as a fragment stream in one of two modes:
//!
//! - incremental: `stream: true`, deltas forwarded as they arrive
//! - whole-response: `stream: false`, full reply re-chunked locally
//!
//! The API key is wrapped in [`SecretString`] and is only exposed when the
//! `Authorization` header is built. The client does not derive `Debug`.

pub mod config;
pub mod credentials;
pub mod streaming;

use std::time::Duration;

use async_stream::stream;
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use agentdesk_core::source::{FragmentSource, FragmentStream};
use agentdesk_types::config::UpstreamConfig;
use agentdesk_types::error::ConfigurationError;
use agentdesk_types::llm::{ChatMessage, CompletionRequest, MessageRole, RetrievalMode, UpstreamError};

use self::config::OpenAiCompatConfig;
use self::credentials::ProcessEnv;
use self::streaming::{DeltaLine, LineBuffer, parse_line};

/// Longest error body kept in `UpstreamError::Status`.
const MAX_ERROR_BODY: usize = 500;

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatCompletionPayload<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    stream: bool,
}

pub struct OpenAiCompatClient {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    mode: RetrievalMode,
    chunk_size: usize,
    request_timeout: Duration,
    stream_timeout: Duration,
}

impl OpenAiCompatClient {
    /// Build a client from resolved configuration.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            endpoint: format!("{}/chat/completions", config.base_url),
            mode: config.mode,
            chunk_size: config.chunk_size,
            request_timeout: config.request_timeout,
            stream_timeout: config.stream_timeout,
        })
    }

    /// Build a client from the process environment.
    ///
    /// Fails here, not on first use, when no credential is set.
    pub fn from_env(upstream: &UpstreamConfig) -> Result<Self, ConfigurationError> {
        Self::new(OpenAiCompatConfig::resolve(upstream, &ProcessEnv)?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn mode(&self) -> RetrievalMode {
        self.mode
    }

    /// Ask for the whole reply in one response and return its content.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        fetch_whole(self.post(request, false)).await
    }

    /// Whole-response mode as a fragment stream: one request, then slices
    /// of `chunk_size` characters.
    pub fn stream_whole(&self, request: CompletionRequest) -> FragmentStream {
        let builder = self.post(&request, false);
        let chunk_size = self.chunk_size;

        Box::pin(stream! {
            match fetch_whole(builder).await {
                Ok(content) => {
                    for piece in rechunk(&content, chunk_size) {
                        yield Ok(piece);
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }

    /// Incremental mode: forward each non-empty delta, stop at `[DONE]`.
    pub fn stream_incremental(&self, request: CompletionRequest) -> FragmentStream {
        let builder = self.post(&request, true);

        Box::pin(stream! {
            let response = match builder.send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(transport_error(e)),
            };

            match response {
                Err(e) => yield Err(e),
                Ok(response) => {
                    let mut body = response.bytes_stream();
                    let mut lines = LineBuffer::new();
                    let mut done = false;

                    'read: while let Some(chunk) = body.next().await {
                        let chunk = match chunk {
                            Ok(chunk) => chunk,
                            Err(e) => {
                                yield Err(if e.is_timeout() {
                                    UpstreamError::Timeout
                                } else {
                                    UpstreamError::Stream(e.to_string())
                                });
                                done = true;
                                break 'read;
                            }
                        };

                        for line in lines.push(&chunk) {
                            match parse_line(&line) {
                                DeltaLine::Content(text) => yield Ok(text),
                                DeltaLine::Done => {
                                    done = true;
                                    break 'read;
                                }
                                DeltaLine::Skip => {}
                            }
                        }
                    }

                    if !done {
                        if let Some(DeltaLine::Content(text)) = lines.finish().map(|l| parse_line(&l)) {
                            yield Ok(text);
                        }
                    }
                }
            }
        })
    }

    fn post(&self, request: &CompletionRequest, stream: bool) -> reqwest::RequestBuilder {
        let timeout = if stream {
            self.stream_timeout
        } else {
            self.request_timeout
        };

        self.client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(timeout)
            .json(&build_payload(request, stream))
    }
}

impl FragmentSource for OpenAiCompatClient {
    fn name(&self) -> &str {
        "openai_compat"
    }

    fn open(&self, request: CompletionRequest) -> FragmentStream {
        tracing::debug!(
            gen_ai.request.model = %request.model,
            mode = %self.mode,
            messages = request.messages.len(),
            "calling upstream model"
        );

        match self.mode {
            RetrievalMode::Incremental => self.stream_incremental(request),
            RetrievalMode::WholeResponse => self.stream_whole(request),
        }
    }
}

/// Leading system entry (if any) followed by history, minus empty entries.
fn build_payload(request: &CompletionRequest, stream: bool) -> ChatCompletionPayload<'_> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system) = request.system.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage {
            role: MessageRole::System,
            content: system.to_string(),
        });
    }

    messages.extend(
        request
            .messages
            .iter()
            .filter(|m| !m.content.is_empty())
            .cloned(),
    );

    ChatCompletionPayload {
        model: &request.model,
        messages,
        temperature: request.temperature,
        stream,
    }
}

async fn fetch_whole(builder: reqwest::RequestBuilder) -> Result<String, UpstreamError> {
    let response = builder.send().await.map_err(transport_error)?;
    let response = check_status(response).await?;
    let body = response.text().await.map_err(transport_error)?;
    extract_message_content(&body)
}

/// Map non-2xx responses to errors, reading (a prefix of) the body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => UpstreamError::AuthenticationFailed {
            status: status.as_u16(),
        },
        429 => UpstreamError::RateLimited,
        code => UpstreamError::Status {
            status: code,
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        },
    })
}

fn transport_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Network(e.to_string())
    }
}

/// Pull `choices[0].message.content` out of a whole-response body.
pub fn extract_message_content(body: &str) -> Result<String, UpstreamError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| UpstreamError::InvalidJson(e.to_string()))?;

    let content = value
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or(UpstreamError::MissingContent)?;

    if content.is_empty() {
        return Err(UpstreamError::EmptyContent);
    }
    Ok(content.to_string())
}

/// Split `text` into slices of at most `size` characters.
///
/// Slices never split a character; concatenating them gives back `text`.
pub fn rechunk(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_types::conversation::{ConversationId, Message};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str, mode: RetrievalMode, chunk_size: usize) -> OpenAiCompatClient {
        OpenAiCompatClient::new(OpenAiCompatConfig {
            base_url: base_url.to_string(),
            api_key: SecretString::from("test-key"),
            credential_source: "TEST".to_string(),
            mode,
            chunk_size,
            request_timeout: Duration::from_secs(5),
            stream_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    fn request() -> CompletionRequest {
        let conv = ConversationId::new();
        CompletionRequest::from_history(
            "qwen-plus",
            "You are terse.",
            &[Message::user(conv.clone(), "hi"), Message::assistant(conv, "")],
            0.7,
        )
    }

    async fn collect(stream: FragmentStream) -> Vec<Result<String, UpstreamError>> {
        stream.collect().await
    }

    #[test]
    fn test_rechunk_hello_world() {
        assert_eq!(rechunk("hello world", 5), ["hello", " worl", "d"]);
    }

    #[test]
    fn test_rechunk_count_and_concatenation() {
        let text = "Streaming relays deliver text in pieces, ünïcödé included.";
        let len = text.chars().count();
        for size in [1, 7, 80] {
            let pieces = rechunk(text, size);
            assert_eq!(pieces.len(), len.div_ceil(size));
            assert_eq!(pieces.concat(), text);
        }
        assert!(rechunk("", 80).is_empty());
    }

    #[test]
    fn test_payload_puts_system_first_and_skips_empty_content() {
        let req = request();
        let payload = serde_json::to_value(build_payload(&req, true)).unwrap();
        assert_eq!(
            payload,
            json!({
                "model": "qwen-plus",
                "messages": [
                    {"role": "system", "content": "You are terse."},
                    {"role": "user", "content": "hi"}
                ],
                "temperature": 0.7,
                "stream": true
            })
        );
    }

    #[test]
    fn test_extract_message_content_errors() {
        assert!(matches!(
            extract_message_content("<html>"),
            Err(UpstreamError::InvalidJson(_))
        ));
        assert!(matches!(
            extract_message_content(r#"{"choices":[]}"#),
            Err(UpstreamError::MissingContent)
        ));
        assert!(matches!(
            extract_message_content(r#"{"choices":[{"message":{"content":""}}]}"#),
            Err(UpstreamError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_whole_response_is_rechunked() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "qwen-plus", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "hello world"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), RetrievalMode::WholeResponse, 5);
        let fragments: Vec<String> = collect(client.open(request()))
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(fragments, ["hello", " worl", "d"]);
    }

    #[tokio::test]
    async fn test_complete_returns_full_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "full answer"}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), RetrievalMode::WholeResponse, 80);
        assert_eq!(client.complete(&request()).await.unwrap(), "full answer");
    }

    #[tokio::test]
    async fn test_incremental_forwards_deltas_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n",
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), RetrievalMode::Incremental, 80);
        let fragments: Vec<String> = collect(client.open(request()))
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(fragments, ["Hi"]);
    }

    #[tokio::test]
    async fn test_done_sentinel_stops_even_with_trailing_lines() {
        let server = MockServer::start().await;
        let body = concat!(
            ": keep-alive\n\n",
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: not json\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"one\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), RetrievalMode::Incremental, 80);
        let fragments: Vec<String> = collect(client.open(request()))
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(fragments, ["one"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_single_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
            .mount(&server)
            .await;

        for mode in [RetrievalMode::Incremental, RetrievalMode::WholeResponse] {
            let client = client_for(&server.uri(), mode, 80);
            let items = collect(client.open(request())).await;
            assert_eq!(items.len(), 1);
            match &items[0] {
                Err(UpstreamError::Status { status, body }) => {
                    assert_eq!(*status, 500);
                    assert_eq!(body, "model overloaded");
                }
                other => panic!("unexpected item: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), RetrievalMode::WholeResponse, 80);
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::AuthenticationFailed { status: 401 }));
    }

    #[tokio::test]
    async fn test_whole_response_missing_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), RetrievalMode::WholeResponse, 80);
        let items = collect(client.open(request())).await;
        assert!(matches!(items.as_slice(), [Err(UpstreamError::MissingContent)]));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 1.
        let client = client_for("http://127.0.0.1:1", RetrievalMode::Incremental, 80);
        let items = collect(client.open(request())).await;
        assert!(matches!(items.as_slice(), [Err(UpstreamError::Network(_))]));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut client = client_for(&server.uri(), RetrievalMode::WholeResponse, 80);
        client.request_timeout = Duration::from_millis(100);
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout));
    }

    #[test]
    fn test_from_env_without_credential_fails_at_construction() {
        let upstream = UpstreamConfig {
            credential_vars: vec!["AGENTDESK_TEST_SURELY_UNSET_KEY".to_string()],
            ..Default::default()
        };
        let err = OpenAiCompatClient::from_env(&upstream).err().unwrap();
        assert!(matches!(err, ConfigurationError::MissingCredential { .. }));
    }
}
