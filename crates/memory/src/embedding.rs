//! Embedders: text in, fixed-length unit vector out.
//!
//! Two local implementations ship with the store:
//! - [`RandomEmbedder`]: uniform noise, L2-normalized. Carries no meaning;
//!   it only satisfies the shape contract so the pipeline can run end to end.
//! - [`HashingEmbedder`]: feature-hashed bag of words. Deterministic, and
//!   texts sharing vocabulary score higher, which makes retrieval testable.
//!
//! A production deployment plugs a real embedding model in behind
//! [`Embedder`] without touching the store.

use async_trait::async_trait;
use botloom_core::error::MemoryError;
use rand::Rng;
use std::sync::Arc;

use crate::vector::l2_normalize;

/// Converts text into an embedding of fixed dimensionality.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A short name for logs (e.g. "hashing").
    fn name(&self) -> &str;

    /// Length of every vector this embedder produces.
    fn dimensions(&self) -> usize;

    /// Embed one text. The result has `dimensions()` entries and unit norm.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;
}

/// Placeholder embedder producing random unit vectors.
pub struct RandomEmbedder {
    dimensions: usize,
}

impl RandomEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl Embedder for RandomEmbedder {
    fn name(&self) -> &str {
        "random"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, MemoryError> {
        let mut v: Vec<f32> = {
            let mut rng = rand::rng();
            (0..self.dimensions)
                .map(|_| rng.random_range(-1.0f32..1.0))
                .collect()
        };
        l2_normalize(&mut v);
        Ok(v)
    }
}

/// Deterministic feature-hashing embedder.
///
/// Each lower-cased alphanumeric token is hashed (FNV-1a) into a bucket with
/// a hash-derived sign. Empty input maps to the first basis vector so the
/// unit-norm contract still holds.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn fnv1a(token: &str) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        if self.dimensions == 0 {
            return Err(MemoryError::EmbeddingFailed(
                "embedder configured with zero dimensions".into(),
            ));
        }

        let mut v = vec![0.0f32; self.dimensions];
        let mut any = false;
        for token in Self::tokens(text) {
            let hash = Self::fnv1a(&token);
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
            any = true;
        }

        if !any || v.iter().all(|x| *x == 0.0) {
            v[0] = 1.0;
        }

        l2_normalize(&mut v);
        Ok(v)
    }
}

/// Build the embedder named in configuration.
pub fn create_embedder(name: &str, dimensions: usize) -> Result<Arc<dyn Embedder>, MemoryError> {
    match name {
        "random" => Ok(Arc::new(RandomEmbedder::new(dimensions))),
        "hashing" => Ok(Arc::new(HashingEmbedder::new(dimensions))),
        other => Err(MemoryError::EmbeddingFailed(format!(
            "unknown embedder '{other}'"
        ))),
    }
}
