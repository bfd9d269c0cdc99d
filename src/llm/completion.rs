use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LlmConfig;

/// Answers can take a while on large hosted models.
const COMPLETION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Send one non-streaming chat completion and return the answer text.
pub async fn complete(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<ChatMessage>,
) -> Result<String> {
    let base = config.base_url.trim_end_matches('/');
    match config.provider.as_str() {
        "openai" => {
            let body = json!({
                "model": config.chat_model,
                "messages": messages,
                "temperature": config.temperature,
                "stream": false,
            });
            let url = format!("{base}/v1/chat/completions");
            let reply: OpenAiReply =
                post_json(client, &url, config.api_key.as_deref(), &body).await?;
            reply.answer()
        }
        "ollama" => {
            let body = json!({
                "model": config.chat_model,
                "messages": messages,
                "stream": false,
                "options": { "temperature": config.temperature },
            });
            let url = format!("{base}/api/chat");
            let reply: OllamaReply = post_json(client, &url, None, &body).await?;
            Ok(reply.message.content)
        }
        other => anyhow::bail!("Unsupported LLM provider for chat: {other}"),
    }
}

async fn post_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    body: &serde_json::Value,
) -> Result<T> {
    let mut request = client
        .post(url)
        .timeout(Duration::from_secs(COMPLETION_TIMEOUT_SECS))
        .json(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let resp = request
        .send()
        .await
        .with_context(|| format!("Failed to call chat completion API at {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("Chat completion API returned {status}: {text}");
    }

    resp.json()
        .await
        .context("Failed to parse chat completion response")
}

#[derive(Deserialize)]
struct OpenAiReply {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiContent,
}

#[derive(Deserialize)]
struct OpenAiContent {
    content: Option<String>,
}

impl OpenAiReply {
    fn answer(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Chat completion returned no content")
    }
}

#[derive(Deserialize)]
struct OllamaReply {
    message: ChatMessage,
}
