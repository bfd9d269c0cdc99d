//! Clients for the hosted embedding and chat-completion APIs.

pub mod completion;
pub mod embeddings;
