// OpenAI-compatible chat completion provider

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{debug, warn};
use trendline_core::domain::{ChatCompletion, ChatRequest};
use trendline_core::port::{CompletionProvider, UpstreamError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Longest provider error body kept in `UpstreamError::Status`
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

pub struct OpenAiProvider {
    client: HttpClient,
    api_key: String,
    endpoint: String,
    timeout_secs: u64,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::NotConfigured);
        }

        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout_secs)
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, UpstreamError> {
        debug!(model = %request.model, messages = request.messages.len(), "Sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Provider returned an error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

        if completion.choices.is_empty() {
            return Err(UpstreamError::InvalidResponse(
                "Response contained no choices".to_string(),
            ));
        }

        debug!(
            id = %completion.id,
            total_tokens = completion.usage.total_tokens,
            "Completion received"
        );
        Ok(completion)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Raw HTTP request as received (headers + body)
    pub struct Captured {
        pub head: String,
        pub body: String,
    }

    /// Serves a single canned HTTP response; returns base URL and the captured request
    pub async fn serve_once(
        status: u16,
        body: &'static str,
    ) -> (String, oneshot::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let (head, body_start) = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break (String::from_utf8_lossy(&buf[..pos]).to_string(), pos + 4);
                }
            };
            let content_length = head
                .lines()
                .find_map(|l| {
                    let lower = l.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap())
                })
                .unwrap_or(0);
            while buf.len() < body_start + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
            }
            let request_body = String::from_utf8_lossy(&buf[body_start..]).to_string();

            let response = format!(
                "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(Captured {
                head,
                body: request_body,
            });
        });

        (format!("http://{}", addr), rx)
    }
}
