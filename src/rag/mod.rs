//! Retrieval-augmented answers over exoplanet research papers.
//!
//! PDF text is split into overlapping chunks, embedded through the
//! configured embeddings API and kept in an in-memory [`store::VectorStore`].
//! Questions retrieve the closest chunks and go to the chat model with them
//! as context.

pub mod pdf;
pub mod service;
pub mod splitter;
pub mod store;

pub use service::{DocumentChunks, IndexReport, KnowledgeStatus, RagService};
pub use store::VectorStore;
