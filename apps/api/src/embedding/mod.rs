//! Embedding Provider: maps text to a fixed-length vector.
//!
//! Every vector in the service is produced through `EmbeddingProvider`, so the
//! role index and the resume query always share one dimensionality for the
//! process lifetime. `AppState` carries an `Arc<dyn EmbeddingProvider>`,
//! chosen at startup via `EMBEDDING_PROVIDER`.

pub mod openai;

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use crate::errors::EngineError;

pub use openai::OpenAiEmbedder;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short backend label for logs and reports.
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    /// Embeds one text. Identical input must produce an identical vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Scales `vector` to unit L2 length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector
        .iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v = (f64::from(*v) / norm) as f32;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashEmbedder: deterministic local backend
// ────────────────────────────────────────────────────────────────────────────

// Changing either key changes every vector.
const HASH_KEY_0: u64 = 0x0123_4567_89ab_cdef;
const HASH_KEY_1: u64 = 0xfedc_ba98_7654_3210;

const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder over word unigrams and bigrams.
///
/// SipHash-1-3 with fixed keys keeps vectors stable across Rust releases.
/// Each token lands in one bucket with a hash-derived sign, then the vector
/// is L2-normalised.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn add_token(&self, vector: &mut [f32], token: &str, weight: f32) {
        let h = self.hash(token);
        let idx = (h % self.dimension as u64) as usize;
        // High bit decides the sign so it is independent of the bucket.
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let words = tokenize(text);

        for word in &words {
            self.add_token(&mut vector, word, UNIGRAM_WEIGHT);
        }
        for pair in words.windows(2) {
            self.add_token(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        Ok(self.embed_sync(text))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_hash_embedder_produces_unit_vectors() {
        let embedder = HashEmbedder::new(384);
        let v = embedder.embed_sync("Senior Rust engineer with Kubernetes experience");
        assert_eq!(v.len(), 384);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[test]
    fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(
            embedder.embed_sync("python sql docker"),
            embedder.embed_sync("python sql docker")
        );
    }

    #[test]
    fn test_similar_text_scores_higher_than_unrelated() {
        let embedder = HashEmbedder::new(384);
        let role = embedder.embed_sync("backend developer python sql docker microservices");
        let close = embedder.embed_sync("python backend developer docker sql");
        let far = embedder.embed_sync("watercolor painting gallery curator");
        assert!(dot(&role, &close) > dot(&role, &far));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        assert!(embedder.embed_sync("   ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_tokenize_keeps_skill_punctuation() {
        assert_eq!(tokenize("C++, C# and Node.js."), vec!["c++", "c#", "and", "node.js"]);
    }

    #[test]
    fn test_l2_normalize_leaves_zero_vector() {
        let mut v = vec![0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_default_embed_batch_preserves_order() {
        let embedder = HashEmbedder::new(32);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[0], embedder.embed_sync("alpha"));
        assert_eq!(batch[1], embedder.embed_sync("beta"));
    }
}
