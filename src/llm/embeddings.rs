use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::EmbeddingConfig;

/// Maximum bytes sent per text. jina-embeddings-v2 takes 8 192 tokens and
/// paper prose averages more than 3 characters a token.
const MAX_EMBED_CHARS: usize = 8_000;

/// Wire dialect of the embedding endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    /// `/v1/embeddings` with a bearer key (Jina, OpenAI, ...)
    OpenAi,
    /// Local Ollama `/api/embed`
    Ollama,
}

impl Provider {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => anyhow::bail!("Unknown embedding provider: {other}"),
        }
    }

    fn endpoint(self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::OpenAi => format!("{base}/v1/embeddings"),
            Self::Ollama => format!("{base}/api/embed"),
        }
    }

    /// Inputs per request.
    fn batch_size(self) -> usize {
        match self {
            Self::OpenAi => 64,
            Self::Ollama => 32,
        }
    }

    fn body(self, model: &str, input: &[&str]) -> Value {
        match self {
            Self::OpenAi => json!({ "model": model, "input": input }),
            Self::Ollama => json!({ "model": model, "input": input, "truncate": true }),
        }
    }

    fn vectors(self, body: &[u8]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::OpenAi => {
                let parsed: OpenAiEmbeddings =
                    serde_json::from_slice(body).context("Failed to parse embeddings response")?;
                Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
            }
            Self::Ollama => {
                let parsed: OllamaEmbeddings = serde_json::from_slice(body)
                    .context("Failed to parse Ollama embed response")?;
                Ok(parsed.embeddings)
            }
        }
    }
}

#[derive(Deserialize)]
struct OpenAiEmbeddings {
    data: Vec<OpenAiVector>,
}

#[derive(Deserialize)]
struct OpenAiVector {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct OllamaEmbeddings {
    embeddings: Vec<Vec<f32>>,
}

/// Longest prefix of `text` within `MAX_EMBED_CHARS` bytes ending on a char boundary.
fn clip(text: &str) -> &str {
    let mut end = text.len().min(MAX_EMBED_CHARS);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Embed `texts` in order, one vector per input.
pub async fn embed_batch(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let provider = Provider::parse(&config.provider)?;
    let url = provider.endpoint(&config.base_url);
    let clipped: Vec<&str> = texts.iter().map(|t| clip(t)).collect();

    let mut vectors = Vec::with_capacity(texts.len());
    for batch in clipped.chunks(provider.batch_size()) {
        let mut request = client.post(&url).json(&provider.body(&config.model, batch));
        if let Some(key) = config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .with_context(|| format!("Failed to call embeddings API at {url}"))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .context("Failed to read embeddings response")?;
        if !status.is_success() {
            anyhow::bail!(
                "Embeddings API returned {status}: {}",
                String::from_utf8_lossy(&body)
            );
        }

        vectors.extend(provider.vectors(&body)?);
    }

    if vectors.len() != texts.len() {
        anyhow::bail!(
            "Embedding API returned {} vectors for {} inputs",
            vectors.len(),
            texts.len()
        );
    }
    Ok(vectors)
}

/// Embed one query string.
pub async fn embed_single(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    text: &str,
) -> Result<Vec<f32>> {
    embed_batch(client, config, &[text.to_string()])
        .await?
        .pop()
        .context("No embedding returned")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_short_text_untouched() {
        assert_eq!(clip("transit photometry"), "transit photometry");
    }

    #[test]
    fn test_clip_respects_char_boundary() {
        let text = "é".repeat(MAX_EMBED_CHARS);
        let cut = clip(&text);
        assert!(cut.len() <= MAX_EMBED_CHARS);
        assert!(text.is_char_boundary(cut.len()));
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            Provider::OpenAi.endpoint("https://api.jina.ai/"),
            "https://api.jina.ai/v1/embeddings"
        );
        assert_eq!(
            Provider::Ollama.endpoint("http://localhost:11434"),
            "http://localhost:11434/api/embed"
        );
    }

    #[test]
    fn test_request_bodies() {
        let body = Provider::OpenAi.body("jina-embeddings-v2-base-en", &["a", "b"]);
        assert_eq!(body["input"], json!(["a", "b"]));
        assert!(body.get("truncate").is_none());
        assert_eq!(Provider::Ollama.body("nomic", &["a"])["truncate"], true);
    }

    #[test]
    fn test_parse_vectors() {
        let openai = br#"{"data":[{"embedding":[0.1,0.2]},{"embedding":[0.3,0.4]}]}"#;
        let vectors = Provider::OpenAi.vectors(openai).unwrap();
        assert_eq!(vectors[1], vec![0.3, 0.4]);

        let ollama = br#"{"embeddings":[[1.0,0.0]]}"#;
        assert_eq!(Provider::Ollama.vectors(ollama).unwrap(), vec![vec![1.0, 0.0]]);

        assert!(Provider::OpenAi.vectors(b"{}").is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let client = reqwest::Client::new();
        let config = EmbeddingConfig::default();
        assert!(embed_batch(&client, &config, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_is_error() {
        let client = reqwest::Client::new();
        let config = EmbeddingConfig {
            provider: "carrier-pigeon".to_string(),
            ..EmbeddingConfig::default()
        };
        let err = embed_batch(&client, &config, &["x".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
