use serde_json::{json, Value};

/// Request/response shape of the completion endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `/api/chat` style: top-level `system`, reply text at `message.content`.
    Ollama,
    /// `/v1/chat/completions` style: system prompt as the first message, reply at
    /// `choices[0].message.content`.
    OpenAi,
}

impl ApiFlavor {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(ApiFlavor::Ollama),
            "openai" | "openai_chat" => Some(ApiFlavor::OpenAi),
            _ => None,
        }
    }

    pub fn default_text_pointer(self) -> &'static str {
        match self {
            ApiFlavor::Ollama => "/message/content",
            ApiFlavor::OpenAi => "/choices/0/message/content",
        }
    }
}

/// The request-invariant part of every chat payload.
#[derive(Clone, Copy, Debug)]
pub struct ChatTemplate<'a> {
    pub flavor: ApiFlavor,
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub quote_content: bool,
}

pub fn build_chat_payload(
    template: &ChatTemplate<'_>,
    role: &str,
    content: &str,
    temperature: f64,
) -> Value {
    let content = if template.quote_content {
        format!("\"{content}\"")
    } else {
        content.to_string()
    };
    match template.flavor {
        ApiFlavor::Ollama => json!({
            "model": template.model,
            "system": template.system_prompt,
            "messages": [{ "role": role, "content": content }],
            "stream": false,
            "temperature": temperature,
        }),
        ApiFlavor::OpenAi => json!({
            "model": template.model,
            "messages": [
                { "role": "system", "content": template.system_prompt },
                { "role": role, "content": content },
            ],
            "stream": false,
            "temperature": temperature,
        }),
    }
}

/// Pulls the generated text out of a response body at `pointer` (RFC 6901).
pub fn extract_generated_text(body: &[u8], pointer: &str) -> Result<String, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| format!("invalid response json: {err}"))?;
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("response has no text at {pointer}"))
}
