use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One embedded chunk of a source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    document_id: Uuid,
    source: String,
    chunk_index: usize,
    content: String,
    embedding: Vec<f32>,
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone)]
pub struct ChunkHit {
    pub document_id: Uuid,
    pub source: String,
    pub chunk_index: usize,
    pub content: String,
    pub score: f32,
}

/// In-memory vector store with cosine-similarity search.
///
/// Starts not-ready; the owner loads the initial corpus and then calls
/// [`VectorStore::mark_ready`]. Searching an unready store is an error.
pub struct VectorStore {
    entries: RwLock<Vec<StoredChunk>>,
    ready: AtomicBool,
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Add the chunks of one document. `embeddings` must be parallel with `chunks`.
    pub fn add_document(
        &self,
        source: &str,
        chunks: &[String],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Uuid> {
        if chunks.len() != embeddings.len() {
            anyhow::bail!(
                "Got {} embeddings for {} chunks of {source}",
                embeddings.len(),
                chunks.len()
            );
        }

        let document_id = Uuid::new_v4();
        let mut entries = self.entries.write();
        for (chunk_index, (content, embedding)) in chunks.iter().zip(embeddings).enumerate() {
            entries.push(StoredChunk {
                document_id,
                source: source.to_string(),
                chunk_index,
                content: content.clone(),
                embedding,
            });
        }

        Ok(document_id)
    }

    /// Delete all chunks of a document. Returns how many were removed.
    pub fn remove_document(&self, document_id: &Uuid) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| &e.document_id != document_id);
        before - entries.len()
    }

    /// Delete every chunk that came from `source`. Returns how many were removed.
    pub fn remove_source(&self, source: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.source != source);
        before - entries.len()
    }

    /// Top `limit` chunks by cosine similarity to `query_embedding`.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ChunkHit>> {
        if !self.is_ready() {
            anyhow::bail!("Vector store is not initialized");
        }

        let entries = self.entries.read();

        let mut scored: Vec<(f32, &StoredChunk)> = entries
            .iter()
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        // Sort descending by score
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, e)| ChunkHit {
                document_id: e.document_id,
                source: e.source.clone(),
                chunk_index: e.chunk_index,
                content: e.content.clone(),
                score,
            })
            .collect())
    }

    pub fn chunk_count(&self) -> usize {
        self.entries.read().len()
    }

    /// Chunk counts grouped by source name.
    pub fn source_counts(&self) -> HashMap<String, usize> {
        let entries = self.entries.read();
        let mut counts = HashMap::new();
        for e in entries.iter() {
            *counts.entry(e.source.clone()).or_insert(0) += 1;
        }
        counts
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
