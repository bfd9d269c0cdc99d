//! # orbitify
//!
//! An exoplanet exploration server. It serves the Kepler catalog as star
//! systems ready for 3D rendering, relays CSV uploads to an external
//! classification model, and answers astronomy questions from a PDF
//! knowledge base.
//!
//! ## Architecture
//!
//! ```text
//!   CSV upload ──► /api/predict ──► model backend ──► latest prediction ──► /api/analysis
//!                  /api/retrain ──► model backend
//!
//!   catalog CSV ──► Catalog::parse ──► planets ─┬─► group_systems ──► /api/catalog
//!                                               └─► CatalogStats       │
//!                                                                      ▼
//!                                                           SystemScene (viewer)
//!
//!   PDFs ──► pdf text ──► TextSplitter ──► embeddings ──► VectorStore
//!                                                            │ top-k
//!   question ──► /api/chat ──► embed ──► search ─────────────┘
//!                                  └──► prompt ──► chat completion ──► markdown
//!
//!   /api/knowledge ──► status, retry initialize, delete uploaded paper
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, backend, and RAG settings
//! - [`catalog`] - Kepler catalog parsing, star-system grouping, and summary statistics
//! - [`viewer`] - Orbit radius, display size, and colour descriptors for a system scene
//! - [`prediction`] - Normalization of model backend prediction results
//! - [`analysis`] - Dashboard figures and CSV export for the latest prediction
//! - [`rag`] - PDF loading, text splitting, in-memory vector store, and question answering
//! - [`llm`] - Embedding and chat completion clients (OpenAI-compatible or Ollama)
//! - [`markdown`] - Escaping markdown renderer for chat answers
//! - [`api`] - Axum HTTP handlers and the router
//! - [`state`] - Shared application state

pub mod analysis;
pub mod api;
pub mod catalog;
pub mod config;
pub mod llm;
pub mod markdown;
pub mod models;
pub mod prediction;
pub mod rag;
pub mod state;
pub mod viewer;
