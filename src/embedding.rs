//! Embedding provider trait, the lexical hash embedder, and vector math.
//!
//! [`HashEmbedder`] is a deterministic, dependency-free stand-in for a
//! learned embedding model: tokens are hashed into a fixed number of
//! dimensions weighted by log term frequency. It captures lexical overlap,
//! not meaning. A neural provider can be substituted by implementing
//! [`Embedder`] without touching the chunker or storage code.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Default embedding dimensionality.
pub const EMBEDDING_DIMS: usize = 384;

/// Minimum token length (in characters) to participate in an embedding.
const MIN_TOKEN_LEN: usize = 3;

/// Trait for embedding providers.
pub trait Embedder: Send + Sync {
    /// Identifier of the embedding scheme (e.g. `"hash-tf-384"`).
    fn name(&self) -> &str;
    /// Vector dimensionality every [`embed`](Embedder::embed) call returns.
    fn dims(&self) -> usize;
    /// Map text to a fixed-length vector.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic term-frequency hash embedding.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    name: String,
    dims: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::with_dims(EMBEDDING_DIMS)
    }

    pub fn with_dims(dims: usize) -> Self {
        Self {
            name: format!("hash-tf-{}", dims),
            dims: dims.max(1),
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    /// Lowercase, split on whitespace, drop tokens shorter than
    /// [`MIN_TOKEN_LEN`], count term frequency in first-seen order, then
    /// bucket up to `dims` distinct tokens by hash and set each bucket to
    /// `ln(1 + tf)`. A later token hashing into an occupied bucket
    /// overwrites it. The result is L2-normalized; if no token qualifies
    /// the all-zero vector is returned unchanged.
    fn embed(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();

        // Term frequencies, preserving first-seen order of distinct tokens.
        let mut order: Vec<&str> = Vec::new();
        let mut freq: HashMap<&str, u32> = HashMap::new();
        for token in lowered.split_whitespace() {
            if token.chars().count() < MIN_TOKEN_LEN {
                continue;
            }
            let count = freq.entry(token).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }

        let mut vector = vec![0.0f32; self.dims];
        for token in order.into_iter().take(self.dims) {
            let dim = (token_hash(token) as usize) % self.dims;
            let tf = freq[token] as f32;
            vector[dim] = (1.0 + tf).ln();
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }
}

/// Deterministic 32-bit hash of a token: the first four bytes of its
/// SHA-256 digest, big endian.
fn token_hash(token: &str) -> u32 {
    let digest = Sha256::digest(token.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Returns `0.0` for empty vectors,
/// vectors of different lengths, or when either norm is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
