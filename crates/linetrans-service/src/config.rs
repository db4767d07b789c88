use linetrans_core::payload::{ApiFlavor, ChatTemplate};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PipelineError;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Translate the quoted text into English. \
Reply with <edited_text> followed by the translation only.";
pub const DEFAULT_INPUT_FILE: &str = "input_dataset.jsonl";
pub const DEFAULT_OUTPUT_FILE: &str = "output_dataset.jsonl";
pub const DEFAULT_LOG_FILE: &str = "process_log.txt";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_TEMPERATURE: f64 = 0.0;
const DEFAULT_MAX_TEMPERATURE: f64 = 0.8;
const DEFAULT_TEMPERATURE_INCREMENT: f64 = 0.1;

const ENV_API_ENDPOINT: &str = "LINETRANS_API_ENDPOINT";
const ENV_API_KEY: &str = "LINETRANS_API_KEY";
const ENV_API_FLAVOR: &str = "LINETRANS_API_FLAVOR";
const ENV_MODEL: &str = "LINETRANS_MODEL";
const ENV_SYSTEM_PROMPT: &str = "LINETRANS_SYSTEM_PROMPT";
const ENV_RESPONSE_TEXT_POINTER: &str = "LINETRANS_RESPONSE_TEXT_POINTER";
const ENV_QUOTE_CONTENT: &str = "LINETRANS_QUOTE_CONTENT";
const ENV_INPUT_FILE: &str = "LINETRANS_INPUT_FILE";
const ENV_OUTPUT_FILE: &str = "LINETRANS_OUTPUT_FILE";
const ENV_LOG_FILE: &str = "LINETRANS_LOG_FILE";
const ENV_MAX_RETRIES: &str = "LINETRANS_MAX_RETRIES";
const ENV_RETRY_DELAY_MS: &str = "LINETRANS_RETRY_DELAY_MS";
const ENV_TIMEOUT_MS: &str = "LINETRANS_TIMEOUT_MS";
const ENV_CONNECT_TIMEOUT_MS: &str = "LINETRANS_CONNECT_TIMEOUT_MS";
const ENV_DEFAULT_TEMP: &str = "LINETRANS_DEFAULT_TEMP";
const ENV_MAX_TEMP: &str = "LINETRANS_MAX_TEMP";
const ENV_TEMP_INCREMENT: &str = "LINETRANS_TEMP_INCREMENT";
const ENV_CONCURRENT_FIELDS: &str = "LINETRANS_CONCURRENT_FIELDS";
const ENV_SHOW_PROGRESS: &str = "LINETRANS_SHOW_PROGRESS";

/// Run configuration. Built once at startup and shared by reference; nothing
/// mutates it afterwards.
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub api_flavor: ApiFlavor,
    pub model: String,
    pub system_prompt: String,
    pub response_text_pointer: String,
    pub quote_content: bool,
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub log_file: PathBuf,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub default_temperature: f64,
    pub max_temperature: f64,
    pub temperature_increment: f64,
    pub concurrent_fields: bool,
    pub show_progress: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_key: None,
            api_flavor: ApiFlavor::Ollama,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            response_text_pointer: ApiFlavor::Ollama.default_text_pointer().to_string(),
            quote_content: true,
            input_file: PathBuf::from(DEFAULT_INPUT_FILE),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            default_temperature: DEFAULT_TEMPERATURE,
            max_temperature: DEFAULT_MAX_TEMPERATURE,
            temperature_increment: DEFAULT_TEMPERATURE_INCREMENT,
            concurrent_fields: false,
            show_progress: true,
        }
    }
}

impl TranslateConfig {
    /// Defaults overlaid with `LINETRANS_*` variables, then validated.
    pub fn from_env() -> Result<Self, PipelineError> {
        let base = Self::default();
        let api_flavor = match env_string(ENV_API_FLAVOR) {
            Some(raw) => ApiFlavor::parse(&raw).ok_or_else(|| {
                PipelineError::Config(format!("{ENV_API_FLAVOR}: unknown flavor {raw:?}"))
            })?,
            None => base.api_flavor,
        };
        let config = Self {
            api_endpoint: env_string(ENV_API_ENDPOINT).unwrap_or(base.api_endpoint),
            api_key: env_string(ENV_API_KEY),
            api_flavor,
            model: env_string(ENV_MODEL).unwrap_or(base.model),
            system_prompt: env_string(ENV_SYSTEM_PROMPT).unwrap_or(base.system_prompt),
            // 中文注释：未显式配置时跟随 flavor 的默认路径，避免切换 openai 后仍去读 ollama 的字段。
            response_text_pointer: env_string(ENV_RESPONSE_TEXT_POINTER)
                .unwrap_or_else(|| api_flavor.default_text_pointer().to_string()),
            quote_content: env_bool_or(ENV_QUOTE_CONTENT, base.quote_content),
            input_file: env_string(ENV_INPUT_FILE)
                .map(PathBuf::from)
                .unwrap_or(base.input_file),
            output_file: env_string(ENV_OUTPUT_FILE)
                .map(PathBuf::from)
                .unwrap_or(base.output_file),
            log_file: env_string(ENV_LOG_FILE)
                .map(PathBuf::from)
                .unwrap_or(base.log_file),
            max_retries: env_u32_or(ENV_MAX_RETRIES, base.max_retries),
            retry_delay: Duration::from_millis(env_u64_or(
                ENV_RETRY_DELAY_MS,
                DEFAULT_RETRY_DELAY_MS,
            )),
            request_timeout: Duration::from_millis(env_u64_or(ENV_TIMEOUT_MS, DEFAULT_TIMEOUT_MS)),
            connect_timeout: Duration::from_millis(env_u64_or(
                ENV_CONNECT_TIMEOUT_MS,
                DEFAULT_CONNECT_TIMEOUT_MS,
            )),
            default_temperature: env_f64_or(ENV_DEFAULT_TEMP, base.default_temperature),
            max_temperature: env_f64_or(ENV_MAX_TEMP, base.max_temperature),
            temperature_increment: env_f64_or(ENV_TEMP_INCREMENT, base.temperature_increment),
            concurrent_fields: env_bool_or(ENV_CONCURRENT_FIELDS, base.concurrent_fields),
            show_progress: env_bool_or(ENV_SHOW_PROGRESS, base.show_progress),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let endpoint = url::Url::parse(self.api_endpoint.trim()).map_err(|err| {
            PipelineError::Config(format!("api endpoint {:?}: {err}", self.api_endpoint))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(PipelineError::Config(format!(
                "api endpoint must be http(s), got {}",
                endpoint.scheme()
            )));
        }
        if self.model.trim().is_empty() {
            return Err(PipelineError::Config("model must not be empty".to_string()));
        }
        if !self.response_text_pointer.starts_with('/') {
            return Err(PipelineError::Config(format!(
                "response text pointer must start with '/', got {:?}",
                self.response_text_pointer
            )));
        }
        let temps = [
            self.default_temperature,
            self.max_temperature,
            self.temperature_increment,
        ];
        if temps.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(PipelineError::Config(
                "temperatures must be finite and non-negative".to_string(),
            ));
        }
        if self.max_temperature < self.default_temperature {
            return Err(PipelineError::Config(format!(
                "max temperature {} is below default temperature {}",
                self.max_temperature, self.default_temperature
            )));
        }
        Ok(())
    }

    pub fn chat_template(&self) -> ChatTemplate<'_> {
        ChatTemplate {
            flavor: self.api_flavor,
            model: &self.model,
            system_prompt: &self.system_prompt,
            quote_content: self.quote_content,
        }
    }

    /// Temperature for 0-based `attempt`: escalates by the increment and stops at
    /// the configured maximum. Computed from `attempt`, not accumulated.
    pub fn attempt_temperature(&self, attempt: u32) -> f64 {
        let raw = self.default_temperature + self.temperature_increment * f64::from(attempt);
        raw.min(self.max_temperature)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64_or(name: &str, default: u64) -> u64 {
    env_string(name)
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32_or(name: &str, default: u32) -> u32 {
    env_string(name)
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_f64_or(name: &str, default: f64) -> f64 {
    env_string(name)
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_bool_or(name: &str, default: bool) -> bool {
    match env_string(name).map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
