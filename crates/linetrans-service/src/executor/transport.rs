use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::TranslateConfig;

/// Why a single attempt did not yield text. Every variant is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("request timed out")]
    Timeout,
    #[error("API returned non-success status code: {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One outbound completion call. Implementations are shared across field threads.
pub trait CompletionTransport: Send + Sync {
    fn send(&self, payload: &serde_json::Value) -> Result<TransportReply, AttemptFailure>;
}

/// Posts JSON payloads to the configured endpoint over one pooled client.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &TranslateConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            // 中文注释：总超时覆盖连接到读完 body 的全过程，超时后由重试状态机接管。
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout.min(config.request_timeout))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.api_endpoint.trim().to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

impl CompletionTransport for HttpTransport {
    fn send(&self, payload: &serde_json::Value) -> Result<TransportReply, AttemptFailure> {
        let mut builder = self.client.post(&self.endpoint).json(payload);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().map_err(classify_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(classify_error)?;
        Ok(TransportReply {
            status,
            body: body.to_vec(),
        })
    }
}

fn classify_error(err: reqwest::Error) -> AttemptFailure {
    if err.is_timeout() {
        AttemptFailure::Timeout
    } else {
        AttemptFailure::Transport(err.to_string())
    }
}
