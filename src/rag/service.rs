use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::RagConfig;
use crate::llm::completion::{complete, ChatMessage};
use crate::llm::embeddings::{embed_batch, embed_single};
use crate::rag::pdf::{list_pdfs, load_pdf_text};
use crate::rag::splitter::TextSplitter;
use crate::rag::store::VectorStore;

const NO_CONTEXT: &str = "No relevant documents found in the knowledge base. \
     You can upload exoplanet research papers to expand my knowledge.";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Question answering over indexed exoplanet papers.
///
/// Built explicitly and shared through `AppState`. Nothing is loaded until
/// [`RagService::initialize`] succeeds; queries before that fail. A failed
/// initialization leaves the store untouched and can be retried.
pub struct RagService {
    config: RagConfig,
    client: reqwest::Client,
    store: Arc<VectorStore>,
    splitter: TextSplitter,
    /// Directories whose PDFs form the startup corpus.
    corpus_dirs: Vec<PathBuf>,
    /// Serializes initialization attempts.
    init_lock: Mutex<()>,
}

/// Outcome of indexing a batch of files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
}

/// Knowledge base contents, per source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeStatus {
    pub ready: bool,
    pub chunks: usize,
    pub documents: Vec<DocumentChunks>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentChunks {
    pub source: String,
    pub chunks: usize,
}

/// A document's chunks with their embeddings, not yet stored.
struct EmbeddedDocument {
    source: String,
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl RagService {
    pub fn new(
        config: RagConfig,
        client: reqwest::Client,
        store: Arc<VectorStore>,
        corpus_dirs: Vec<PathBuf>,
    ) -> Result<Self> {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            config,
            client,
            store,
            splitter,
            corpus_dirs,
            init_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    pub fn status(&self) -> KnowledgeStatus {
        let mut documents: Vec<DocumentChunks> = self
            .store
            .source_counts()
            .into_iter()
            .map(|(source, chunks)| DocumentChunks { source, chunks })
            .collect();
        documents.sort_by(|a, b| a.source.cmp(&b.source));
        KnowledgeStatus {
            ready: self.is_ready(),
            chunks: self.store.chunk_count(),
            documents,
        }
    }

    /// Index every PDF in the corpus directories and mark the store ready.
    ///
    /// Unreadable PDFs are skipped with a warning. An empty corpus still
    /// yields a ready, empty store. An embedding failure aborts with nothing
    /// stored and the store still unready, so the call can be repeated.
    /// Returns an empty report if the store was already ready.
    pub async fn initialize(&self) -> Result<IndexReport> {
        let _guard = self.init_lock.lock().await;
        if self.is_ready() {
            return Ok(IndexReport::default());
        }

        tracing::info!("Initializing knowledge base...");
        let mut documents = Vec::new();
        for dir in &self.corpus_dirs {
            let pdfs = list_pdfs(dir);
            tracing::info!("Found {} PDFs in {}", pdfs.len(), dir.display());

            for path in pdfs {
                match load_pdf_text(&path).await {
                    Ok(text) => documents.push((source_name(&path), text)),
                    Err(e) => tracing::warn!("Skipping {}: {e:#}", path.display()),
                }
            }
        }

        let report = self.initialize_documents(documents).await?;
        tracing::info!(
            "Knowledge base ready: {} documents, {} chunks",
            report.documents,
            report.chunks
        );
        Ok(report)
    }

    async fn initialize_documents(&self, documents: Vec<(String, String)>) -> Result<IndexReport> {
        let report = self.index_documents(documents).await?;
        self.store.mark_ready();
        Ok(report)
    }

    /// Load, split, embed and store uploaded PDFs, replacing earlier copies
    /// of the same file name. Any unreadable file aborts before the store
    /// changes. Initializes the knowledge base first if a previous attempt
    /// failed.
    pub async fn index_pdfs(&self, paths: &[PathBuf]) -> Result<IndexReport> {
        self.initialize()
            .await
            .context("Knowledge base is not initialized")?;

        tracing::info!("Processing {} new PDFs...", paths.len());

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = load_pdf_text(path).await?;
            documents.push((source_name(path), text));
        }

        let report = self.index_documents(documents).await?;
        tracing::info!(
            "Indexed {} PDFs into {} chunks",
            report.documents,
            report.chunks
        );
        Ok(report)
    }

    /// Drop every chunk of `source`. Returns how many were removed.
    pub fn forget(&self, source: &str) -> usize {
        let removed = self.store.remove_source(source);
        if removed > 0 {
            tracing::info!("Removed {source} from the knowledge base ({removed} chunks)");
        }
        removed
    }

    /// Embed everything first, then store. A failure leaves the store as it was.
    async fn index_documents(&self, documents: Vec<(String, String)>) -> Result<IndexReport> {
        let mut embedded = Vec::with_capacity(documents.len());
        for (source, text) in documents {
            let chunks = self.splitter.split(&text);
            if chunks.is_empty() {
                tracing::warn!("{source} contains no extractable text");
                continue;
            }
            let embeddings = embed_batch(&self.client, &self.config.embedding, &chunks)
                .await
                .with_context(|| format!("Failed to embed {source}"))?;
            embedded.push(EmbeddedDocument {
                source,
                chunks,
                embeddings,
            });
        }

        let mut report = IndexReport::default();
        let mut added = Vec::with_capacity(embedded.len());
        for doc in embedded {
            self.store.remove_source(&doc.source);
            match self.store.add_document(&doc.source, &doc.chunks, doc.embeddings) {
                Ok(id) => added.push(id),
                Err(e) => {
                    for id in &added {
                        self.store.remove_document(id);
                    }
                    return Err(e);
                }
            }
            tracing::debug!("Indexed {}: {} chunks", doc.source, doc.chunks.len());
            report.documents += 1;
            report.chunks += doc.chunks.len();
        }
        Ok(report)
    }

    /// Answer a question from the most similar paper chunks.
    pub async fn query(&self, question: &str) -> Result<String> {
        if !self.is_ready() {
            anyhow::bail!("Knowledge base is not initialized");
        }

        let query_embedding = embed_single(&self.client, &self.config.embedding, question)
            .await
            .context("Failed to embed question")?;
        let hits = self.store.search(&query_embedding, self.config.top_k)?;
        tracing::info!("Found {} relevant chunks", hits.len());

        let contents: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
        let prompt = build_prompt(&build_context(&contents), question);

        complete(&self.client, &self.config.llm, vec![ChatMessage::user(prompt)]).await
    }
}

/// Store key for a file: its name without directories.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn build_context(chunks: &[&str]) -> String {
    if chunks.is_empty() {
        NO_CONTEXT.to_string()
    } else {
        chunks.join(CONTEXT_SEPARATOR)
    }
}

fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an expert on exoplanets and astronomy. Answer the question using the \
         context taken from scientific papers.\n\n\
         Context from research papers:\n{context}\n\n\
         Question: {question}\n\n\
         Give a detailed, scientifically accurate answer. If the context is not enough, \
         you may add general astronomical knowledge, but say clearly when you do.\n\
         If the message is not a specific question, reply casually.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn service(dirs: Vec<PathBuf>) -> RagService {
        RagService::new(
            RagConfig::default(),
            reqwest::Client::new(),
            Arc::new(VectorStore::new()),
            dirs,
        )
        .unwrap()
    }

    #[test]
    fn test_context_joins_chunks() {
        let ctx = build_context(&["first", "second"]);
        assert_eq!(ctx, "first\n\n---\n\nsecond");
    }

    #[test]
    fn test_context_empty_uses_placeholder() {
        assert!(build_context(&[]).contains("No relevant documents found"));
    }

    #[test]
    fn test_prompt_contains_context_and_question() {
        let prompt = build_prompt("Kepler-452b orbits a G star", "What is Kepler-452b?");
        assert!(prompt.contains("Context from research papers:\nKepler-452b orbits a G star"));
        assert!(prompt.contains("Question: What is Kepler-452b?"));
    }

    #[test]
    fn test_new_rejects_bad_splitter_settings() {
        let config = RagConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..RagConfig::default()
        };
        let result = RagService::new(
            config,
            reqwest::Client::new(),
            Arc::new(VectorStore::new()),
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_query_before_initialize_fails() {
        let rag = service(Vec::new());
        let err = rag.query("hello").await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    #[tokio::test]
    async fn test_index_initializes_first() {
        let rag = service(Vec::new());
        let report = rag.index_pdfs(&[]).await.unwrap();
        assert_eq!(report, IndexReport::default());
        assert!(rag.is_ready());
    }

    #[tokio::test]
    async fn test_initialize_empty_corpus_is_ready() {
        let dir = tempfile::tempdir().unwrap();
        let rag = service(vec![dir.path().to_path_buf(), dir.path().join("missing")]);
        let report = rag.initialize().await.unwrap();
        assert_eq!(report, IndexReport::default());
        assert!(rag.is_ready());
        assert_eq!(rag.store().chunk_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_skips_unreadable_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("corrupt.pdf"), b"garbage").unwrap();
        let rag = service(vec![dir.path().to_path_buf()]);
        let report = rag.initialize().await.unwrap();
        assert_eq!(report.documents, 0);
        assert!(rag.is_ready());
    }

    #[tokio::test]
    async fn test_index_unreadable_upload_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.pdf");
        std::fs::write(&path, b"garbage").unwrap();
        let rag = service(Vec::new());
        rag.initialize().await.unwrap();
        assert!(rag.index_pdfs(&[path]).await.is_err());
        assert_eq!(rag.store().chunk_count(), 0);
    }

    // ─── Embedding failures ──────────────────────────────

    /// Embedding endpoint that fails its `fail_on`-th call (0-based).
    async fn flaky_embedder(fail_on: usize) -> (String, Arc<AtomicUsize>) {
        async fn embed(
            State((calls, fail_on)): State<(Arc<AtomicUsize>, usize)>,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            if calls.fetch_add(1, Ordering::SeqCst) == fail_on {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "overloaded"})),
                );
            }
            let n = body["input"].as_array().map_or(0, Vec::len);
            let data: Vec<Value> = (0..n)
                .map(|i| json!({"embedding": [1.0, i as f32]}))
                .collect();
            (StatusCode::OK, Json(json!({ "data": data })))
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v1/embeddings", post(embed))
            .with_state((calls.clone(), fail_on));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}"), calls)
    }

    fn service_against(base_url: String) -> RagService {
        let mut config = RagConfig::default();
        config.embedding.base_url = base_url;
        config.embedding.api_key = None;
        RagService::new(
            config,
            reqwest::Client::new(),
            Arc::new(VectorStore::new()),
            Vec::new(),
        )
        .unwrap()
    }

    fn papers() -> Vec<(String, String)> {
        vec![
            ("kepler.pdf".to_string(), "Kepler stared at Cygnus.".to_string()),
            ("tess.pdf".to_string(), "TESS scans the whole sky.".to_string()),
        ]
    }

    #[tokio::test]
    async fn test_failed_initialize_leaves_store_empty_and_retries() {
        // First document embeds, second one fails
        let (base_url, calls) = flaky_embedder(1).await;
        let rag = service_against(base_url);

        assert!(rag.initialize_documents(papers()).await.is_err());
        assert!(!rag.is_ready());
        assert_eq!(rag.store().chunk_count(), 0);

        let report = rag.initialize_documents(papers()).await.unwrap();
        assert_eq!(report.documents, 2);
        assert!(rag.is_ready());
        assert_eq!(rag.store().chunk_count(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_reindexing_a_source_replaces_it() {
        let (base_url, _calls) = flaky_embedder(usize::MAX).await;
        let rag = service_against(base_url);
        rag.initialize_documents(papers()).await.unwrap();
        rag.index_documents(vec![("kepler.pdf".to_string(), "Revised.".to_string())])
            .await
            .unwrap();

        let status = rag.status();
        assert_eq!(status.chunks, 2);
        assert_eq!(status.documents[0].source, "kepler.pdf");
        assert_eq!(status.documents[0].chunks, 1);
        assert_eq!(rag.forget("kepler.pdf"), 1);
        assert_eq!(rag.forget("kepler.pdf"), 0);
        assert_eq!(rag.status().documents.len(), 1);
    }
}
