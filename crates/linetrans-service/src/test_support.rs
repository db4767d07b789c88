use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::TranslateConfig;
use crate::executor::{AttemptFailure, CompletionTransport, TransportReply};

const TEMPERATURE_TOLERANCE: f64 = 1e-9;

pub(crate) fn assert_temps_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "actual={actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a - e).abs() < TEMPERATURE_TOLERANCE,
            "actual={actual:?} expected={expected:?}"
        );
    }
}

pub(crate) fn fast_config() -> TranslateConfig {
    TranslateConfig {
        retry_delay: Duration::ZERO,
        show_progress: false,
        ..TranslateConfig::default()
    }
}

pub(crate) fn ok_reply(text: &str) -> Result<TransportReply, AttemptFailure> {
    let body = serde_json::json!({ "message": { "content": text } });
    Ok(TransportReply {
        status: 200,
        body: serde_json::to_vec(&body).unwrap_or_default(),
    })
}

pub(crate) fn status_reply(status: u16) -> Result<TransportReply, AttemptFailure> {
    Ok(TransportReply {
        status,
        body: b"{}".to_vec(),
    })
}

#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub content: String,
    pub temperature: f64,
}

/// Replies chosen per request by a closure over the (unquoted) message content
/// and the number of earlier requests with the same content.
pub(crate) struct ScriptedTransport<F> {
    respond: F,
    sent: Mutex<Vec<SentRequest>>,
}

impl<F> ScriptedTransport<F>
where
    F: Fn(&str, usize) -> Result<TransportReply, AttemptFailure> + Send + Sync,
{
    pub(crate) fn new(respond: F) -> Self {
        Self {
            respond,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl<F> CompletionTransport for ScriptedTransport<F>
where
    F: Fn(&str, usize) -> Result<TransportReply, AttemptFailure> + Send + Sync,
{
    fn send(&self, payload: &serde_json::Value) -> Result<TransportReply, AttemptFailure> {
        let content = payload["messages"]
            .as_array()
            .and_then(|messages| messages.last())
            .and_then(|message| message["content"].as_str())
            .unwrap_or_default()
            .trim_matches('"')
            .to_string();
        let temperature = payload["temperature"].as_f64().unwrap_or(f64::NAN);
        let previous = {
            let mut sent = self.sent.lock().expect("lock sent");
            let previous = sent.iter().filter(|r| r.content == content).count();
            sent.push(SentRequest {
                content: content.clone(),
                temperature,
            });
            previous
        };
        (self.respond)(&content, previous)
    }
}

/// Plays back a fixed list of replies regardless of content.
pub(crate) struct QueueTransport {
    replies: Mutex<VecDeque<Result<TransportReply, AttemptFailure>>>,
}

impl QueueTransport {
    pub(crate) fn new(replies: Vec<Result<TransportReply, AttemptFailure>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.replies.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl CompletionTransport for QueueTransport {
    fn send(&self, _payload: &serde_json::Value) -> Result<TransportReply, AttemptFailure> {
        self.replies
            .lock()
            .expect("lock replies")
            .pop_front()
            .unwrap_or(Err(AttemptFailure::Transport("script exhausted".to_string())))
    }
}
