//! Deterministic offline embeddings.

use async_trait::async_trait;
use seinfeld_error::RetrievalError;
use seinfeld_interface::Embeddings;
use sha2::{Digest, Sha256};

/// Embeds text by hashing it with SHA-256.
///
/// Vectors are L2-normalized and identical inputs always produce identical
/// vectors. There is no semantic signal: only exact text matches score 1.0.
/// Intended for tests and for precomputing a local corpus without a provider.
#[derive(Debug, Clone)]
pub struct HashEmbeddings {
    dims: usize,
}

impl HashEmbeddings {
    /// Create a provider producing `dims`-dimensional vectors.
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    /// Dimensionality of the produced vectors.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Embed synchronously.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        let mut vector: Vec<f32> = (0..self.dims)
            .map(|i| (f32::from(hash[i % hash.len()]) / 127.5) - 1.0)
            .collect();

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl Embeddings for HashEmbeddings {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        Ok(inputs.iter().map(|text| self.vector_for(text)).collect())
    }

    fn model_name(&self) -> &str {
        "sha256-hash"
    }
}
