//! Embedding and similarity store for botloom.
//!
//! - [`EmbeddingStore`]: thread-safe content index with filtered cosine search
//! - [`Embedder`]: text-to-vector abstraction with local implementations
//! - [`vector`]: cosine similarity and normalization helpers

pub mod embedding;
pub mod store;
pub mod vector;

pub use embedding::{create_embedder, Embedder, HashingEmbedder, RandomEmbedder};
pub use store::{EmbeddingStore, VectorProvider};
pub use vector::{cosine_similarity, l2_norm, l2_normalize};
