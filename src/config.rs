use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where uploaded PDFs and the default knowledge base live
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Path or http(s) URL of the Kepler catalog CSV
    pub catalog_source: String,
    /// Prediction backend endpoints
    pub backend: BackendConfig,
    /// Retrieval-augmented chat configuration
    pub rag: RagConfig,
}

/// The external FastAPI service that owns the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub predict_url: String,
    pub retrain_url: String,
    /// Request timeout in seconds for upstream calls.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            predict_url: "https://fastapi-backend-production-b25a.up.railway.app/predict"
                .to_string(),
            retrain_url: "https://fastapi-backend-production-b25a.up.railway.app/retrain"
                .to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    /// Maximum characters per indexed chunk
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "openai" (any OpenAI-compatible API, e.g. Jina) or "ollama"
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.jina.ai".to_string(),
            model: "jina-embeddings-v2-base-en".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" (any OpenAI-compatible API, e.g. Groq) or "ollama"
    pub provider: String,
    pub base_url: String,
    pub chat_model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.groq.com/openai".to_string(),
            chat_model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            temperature: 0.3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:3000".to_string(),
            catalog_source: "./data/kepler_data.csv".to_string(),
            backend: BackendConfig::default(),
            rag: RagConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Overwrite fields from `lookup` (an environment). Unparsable numbers
    /// leave the current value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;

        if let Some(dir) = lookup("ORBITIFY_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        set_text(lookup, "ORBITIFY_BIND_ADDR", &mut self.bind_addr);
        set_text(lookup, "ORBITIFY_CATALOG_SOURCE", &mut self.catalog_source);

        // Backend
        set_text(lookup, "BACKEND_URL", &mut self.backend.predict_url);
        set_text(lookup, "RETRAIN_URL", &mut self.backend.retrain_url);
        set_parsed(lookup, "BACKEND_TIMEOUT_SECS", &mut self.backend.timeout_secs);

        // Embeddings
        let embedding = &mut self.rag.embedding;
        set_text(lookup, "EMBEDDING_PROVIDER", &mut embedding.provider);
        set_text(lookup, "EMBEDDING_BASE_URL", &mut embedding.base_url);
        set_text(lookup, "EMBEDDING_MODEL", &mut embedding.model);
        set_key(lookup, "JINA_API_KEY", &mut embedding.api_key);

        // Chat completion
        let llm = &mut self.rag.llm;
        set_text(lookup, "LLM_PROVIDER", &mut llm.provider);
        set_text(lookup, "LLM_BASE_URL", &mut llm.base_url);
        set_text(lookup, "LLM_CHAT_MODEL", &mut llm.chat_model);
        set_key(lookup, "GROQ_API_KEY", &mut llm.api_key);
        set_parsed(lookup, "LLM_TEMPERATURE", &mut llm.temperature);

        // Retrieval tuning
        set_parsed(lookup, "RAG_CHUNK_SIZE", &mut self.rag.chunk_size);
        set_parsed(lookup, "RAG_CHUNK_OVERLAP", &mut self.rag.chunk_overlap);
        set_parsed(lookup, "RAG_TOP_K", &mut self.rag.top_k);
    }

    /// Bundled exoplanet papers indexed at startup.
    pub fn knowledge_dir(&self) -> PathBuf {
        self.data_dir.join("exoplanets")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn set_text(lookup: Lookup<'_>, name: &str, slot: &mut String) {
    if let Some(value) = lookup(name) {
        *slot = value;
    }
}

fn set_key(lookup: Lookup<'_>, name: &str, slot: &mut Option<String>) {
    if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
        *slot = Some(value);
    }
}

fn set_parsed<T: FromStr>(lookup: Lookup<'_>, name: &str, slot: &mut T) {
    if let Some(value) = lookup(name) {
        match value.trim().parse() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!("Ignoring unparsable {name}={value}"),
        }
    }
}
