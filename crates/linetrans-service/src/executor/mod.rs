use linetrans_core::payload::{build_chat_payload, extract_generated_text};
use linetrans_core::{remove_start_tag, Field, LineEvent, LineStatus};
use std::thread;

use crate::config::TranslateConfig;
use crate::status_log::StatusLog;

mod transport;

pub use transport::{AttemptFailure, CompletionTransport, HttpTransport, TransportReply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformResult {
    Success(String),
    Abandoned,
}

impl TransformResult {
    pub fn into_option(self) -> Option<String> {
        match self {
            TransformResult::Success(text) => Some(text),
            TransformResult::Abandoned => None,
        }
    }
}

/// State of one field transformation between attempts.
#[derive(Debug, Clone, Copy)]
struct RequestAttempt<'a> {
    content: &'a str,
    role: &'a str,
    line_number: u64,
    field: Field,
    attempt: u32,
    temperature: f64,
}

/// Runs one field through the endpoint with bounded retries.
///
/// Attempt `n` sends temperature `default + n * increment` (capped). Each attempt
/// writes exactly one status line: success, the failure cause followed by a retry,
/// or, on the last allowed attempt, "Max retries reached".
pub struct RequestExecutor<'a> {
    config: &'a TranslateConfig,
    transport: &'a dyn CompletionTransport,
    status_log: &'a dyn StatusLog,
}

impl<'a> RequestExecutor<'a> {
    pub fn new(
        config: &'a TranslateConfig,
        transport: &'a dyn CompletionTransport,
        status_log: &'a dyn StatusLog,
    ) -> Self {
        Self {
            config,
            transport,
            status_log,
        }
    }

    pub fn transform(
        &self,
        content: &str,
        role: &str,
        line_number: u64,
        field: Field,
    ) -> TransformResult {
        let mut state = RequestAttempt {
            content,
            role,
            line_number,
            field,
            attempt: 0,
            temperature: self.config.attempt_temperature(0),
        };
        loop {
            let failure = match self.attempt_once(&state) {
                Ok(text) => {
                    self.record(&state, LineStatus::Translated);
                    return TransformResult::Success(text);
                }
                Err(failure) => failure,
            };

            if state.attempt >= self.config.max_retries {
                // the MaxRetries record below carries the warn
                log::debug!(
                    "giving up: line={} field={} attempts={} last_err={}",
                    state.line_number,
                    state.field,
                    state.attempt + 1,
                    failure
                );
                self.record(&state, LineStatus::MaxRetries);
                return TransformResult::Abandoned;
            }

            let status = match &failure {
                AttemptFailure::Timeout => LineStatus::Timeout,
                other => LineStatus::Error(other.to_string()),
            };
            self.record(&state, status);
            if !self.config.retry_delay.is_zero() {
                thread::sleep(self.config.retry_delay);
            }
            state.attempt += 1;
            state.temperature = self.config.attempt_temperature(state.attempt);
        }
    }

    fn attempt_once(&self, state: &RequestAttempt<'_>) -> Result<String, AttemptFailure> {
        let payload = build_chat_payload(
            &self.config.chat_template(),
            state.role,
            state.content,
            state.temperature,
        );
        log::debug!(
            "request: line={} field={} attempt={} temperature={}",
            state.line_number,
            state.field,
            state.attempt,
            state.temperature
        );
        let reply = self.transport.send(&payload)?;
        if !reply.is_success() {
            return Err(AttemptFailure::Status(reply.status));
        }
        let raw = extract_generated_text(&reply.body, &self.config.response_text_pointer)
            .map_err(AttemptFailure::MalformedResponse)?;
        Ok(remove_start_tag(&raw))
    }

    fn record(&self, state: &RequestAttempt<'_>, status: LineStatus) {
        self.status_log
            .record(&LineEvent::for_field(state.line_number, state.field, status));
    }
}
