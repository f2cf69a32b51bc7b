// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedding model seam.
//!
//! The broker cares about the job's contract, not the math: any model
//! that turns a batch of texts into fixed-dimension vectors fits behind
//! [`EmbeddingModel`]. The built-in [`HashEmbedding`] hashes character
//! trigrams into a fixed number of buckets and L2-normalizes — cheap,
//! deterministic, and good enough to keep the pipeline real in tests and
//! default deployments.

use thiserror::Error;

/// Vector width of the built-in model.
pub const DEFAULT_EMBED_DIM: usize = 256;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding failed: {0}")]
    Failed(String),
}

pub trait EmbeddingModel: Send + Sync {
    fn dim(&self) -> usize;

    /// One vector per input text, each of length `dim()`.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Hashed character-trigram embedding, L2-normalized.
pub struct HashEmbedding {
    dim: usize,
}

impl HashEmbedding {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dim];
        let chars: Vec<char> = text.chars().collect();

        if chars.len() < 3 {
            if !chars.is_empty() {
                let bucket = (hash_chars(&chars) % self.dim as u64) as usize;
                vector[bucket] = 1.0;
            }
            return vector;
        }

        for window in chars.windows(3) {
            let bucket = (hash_chars(window) % self.dim as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedding {
    fn default() -> Self {
        Self::new(DEFAULT_EMBED_DIM)
    }
}

impl EmbeddingModel for HashEmbedding {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// FNV-1a over the code points of a char window.
fn hash_chars(chars: &[char]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for c in chars {
        for byte in (*c as u32).to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
    hash
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
