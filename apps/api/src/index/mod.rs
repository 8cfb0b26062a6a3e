//! Vector Index: exact inner-product search over one unit vector per role.
//!
//! The corpus is small (tens to low hundreds of roles), so search is a
//! brute-force dot product against every stored vector. Vector `i` always
//! belongs to role `i` of the slice the index was built from.

use std::time::Instant;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::info;

use crate::corpus::Role;
use crate::embedding::{l2_normalize, EmbeddingProvider};
use crate::errors::EngineError;

/// Field values that carry no information and are left out of role sentences.
const PLACEHOLDERS: &[&str] = &["auto generated role", "n/a", "-", ""];

/// One search result. `position` indexes the role slice the index was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub position: usize,
    pub role_id: String,
    pub rank: usize,
    pub score: f64,
}

#[derive(Debug)]
struct IndexData {
    vectors: Vec<Vec<f32>>,
    role_ids: Vec<String>,
    dimension: usize,
}

/// Built once, read concurrently without locking afterwards.
#[derive(Debug, Default)]
pub struct VectorIndex {
    data: OnceCell<IndexData>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embeds every role's composed sentence and stores the normalised vectors.
    ///
    /// Fails with `Configuration` on an empty role set. A second call after a
    /// successful build is a no-op.
    pub async fn build(
        &self,
        roles: &[Role],
        embedder: &dyn EmbeddingProvider,
    ) -> Result<(), EngineError> {
        if self.data.initialized() {
            info!("Vector index already built, skipping");
            return Ok(());
        }
        if roles.is_empty() {
            return Err(EngineError::Configuration(
                "Cannot build vector index from an empty role set".to_string(),
            ));
        }

        self.data
            .get_or_try_init(|| async move {
                let texts: Vec<String> = roles.iter().map(compose_text).collect();
                info!("Encoding {} role descriptions with {}", texts.len(), embedder.name());

                let started = Instant::now();
                let mut vectors = embedder.embed_batch(&texts).await?;
                if vectors.len() != roles.len() {
                    return Err(EngineError::Embedding(format!(
                        "Embedder returned {} vectors for {} roles",
                        vectors.len(),
                        roles.len()
                    )));
                }

                let dimension = embedder.dimension();
                for v in vectors.iter_mut() {
                    if v.len() != dimension {
                        return Err(EngineError::Embedding(format!(
                            "Role vector has dimension {}, expected {dimension}",
                            v.len()
                        )));
                    }
                    l2_normalize(v);
                }

                info!(
                    "Vector index built: {} vectors, dim={}, in {:.2}s",
                    vectors.len(),
                    dimension,
                    started.elapsed().as_secs_f64()
                );

                Ok(IndexData {
                    vectors,
                    role_ids: roles.iter().map(|r| r.id.clone()).collect(),
                    dimension,
                })
            })
            .await?;

        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.data.initialized()
    }

    pub fn len(&self) -> usize {
        self.data.get().map(|d| d.vectors.len()).unwrap_or(0)
    }

    pub fn dimension(&self) -> Option<usize> {
        self.data.get().map(|d| d.dimension)
    }

    /// Returns the `top_k` roles by descending cosine similarity to `query`.
    ///
    /// `top_k` is clamped to the corpus size. Ties keep insertion order.
    /// Scores are rounded to 4 decimals and ranks run 1..=k with no gaps.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, EngineError> {
        let data = self.data.get().ok_or(EngineError::NotReady)?;

        if query.len() != data.dimension {
            return Err(EngineError::Embedding(format!(
                "Query has dimension {}, index expects {}",
                query.len(),
                data.dimension
            )));
        }

        let mut q = query.to_vec();
        l2_normalize(&mut q);

        let mut scored: Vec<(usize, f64)> = data
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, dot(&q, v)))
            .collect();
        // sort_by is stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let k = top_k.min(scored.len());
        Ok(scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, (position, score))| SearchHit {
                position,
                role_id: data.role_ids[position].clone(),
                rank: i + 1,
                score: round4(score),
            })
            .collect())
    }

    /// Stored (normalised) vector for a role position.
    #[cfg(test)]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.data
            .get()
            .and_then(|d| d.vectors.get(position))
            .map(Vec::as_slice)
    }
}

/// Merges a role's meaningful fields into one sentence for the encoder.
pub fn compose_text(role: &Role) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !is_placeholder(&role.name) {
        parts.push(role.name.trim().to_string());
    }
    if !is_placeholder(&role.description) {
        parts.push(role.description.trim().to_string());
    }

    let labelled = [
        ("Category", &role.category),
        ("Domain", &role.domain),
        ("Level", &role.level),
        ("Industry", &role.industry),
        ("Education", &role.education),
    ];
    for (label, value) in labelled {
        if !is_placeholder(value) {
            parts.push(format!("{label}: {}", value.trim()));
        }
    }

    parts.push(format!(
        "Experience: {}–{} years",
        role.min_experience, role.max_experience
    ));
    parts.join(". ")
}

fn is_placeholder(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    PLACEHOLDERS.contains(&v.as_str())
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::corpus::tests::sample_corpus;
    use crate::embedding::HashEmbedder;

    /// Counts how many texts were embedded.
    struct CountingEmbedder {
        inner: HashEmbedder,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.inner.embed_sync(text))
        }
    }

    fn make_role(id: &str, name: &str) -> Role {
        Role {
            id: id.to_string(),
            name: name.to_string(),
            category: "Engineering".to_string(),
            level: "Mid".to_string(),
            domain: "Software".to_string(),
            industry: "Software".to_string(),
            description: String::new(),
            education: String::new(),
            min_experience: 2,
            max_experience: 4,
        }
    }

    async fn built_index() -> (VectorIndex, Vec<Role>) {
        let roles = sample_corpus().roles().to_vec();
        let index = VectorIndex::new();
        index.build(&roles, &HashEmbedder::new(128)).await.unwrap();
        (index, roles)
    }

    #[test]
    fn test_compose_text_skips_placeholders() {
        let mut role = make_role("r1", "Data Analyst");
        role.description = "Auto generated role".to_string();
        role.education = "N/A".to_string();
        let text = compose_text(&role);
        assert_eq!(
            text,
            "Data Analyst. Category: Engineering. Domain: Software. Level: Mid. Industry: Software. Experience: 2–4 years"
        );
    }

    #[test]
    fn test_compose_text_includes_description() {
        let mut role = make_role("r1", "Backend Developer");
        role.description = "Builds APIs".to_string();
        assert!(compose_text(&role).starts_with("Backend Developer. Builds APIs. Category"));
    }

    #[tokio::test]
    async fn test_search_before_build_is_not_ready() {
        let index = VectorIndex::new();
        let err = index.search(&[1.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
    }

    #[tokio::test]
    async fn test_build_rejects_empty_role_set() {
        let index = VectorIndex::new();
        let err = index.build(&[], &HashEmbedder::new(8)).await.unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(!index.is_ready());
    }

    #[tokio::test]
    async fn test_build_is_idempotent() {
        let roles = sample_corpus().roles().to_vec();
        let embedder = CountingEmbedder {
            inner: HashEmbedder::new(64),
            calls: AtomicUsize::new(0),
        };
        let index = VectorIndex::new();
        index.build(&roles, &embedder).await.unwrap();
        index.build(&roles, &embedder).await.unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), roles.len());
        assert_eq!(index.len(), roles.len());
    }

    #[tokio::test]
    async fn test_every_role_finds_itself_with_similarity_one() {
        let (index, roles) = built_index().await;
        for position in 0..roles.len() {
            let query = index.vector(position).unwrap().to_vec();
            let hits = index.search(&query, 1).unwrap();
            assert_eq!(hits[0].position, position);
            assert_eq!(hits[0].score, 1.0);
        }
    }

    #[tokio::test]
    async fn test_search_returns_exactly_top_k_with_contiguous_ranks() {
        let (index, roles) = built_index().await;
        let query = HashEmbedder::new(128).embed_sync("python developer docker sql");
        for k in 1..=roles.len() {
            let hits = index.search(&query, k).unwrap();
            assert_eq!(hits.len(), k);
            for (i, hit) in hits.iter().enumerate() {
                assert_eq!(hit.rank, i + 1);
            }
            for pair in hits.windows(2) {
                assert!(pair[0].score >= pair[1].score, "scores must be non-increasing");
            }
        }
    }

    #[tokio::test]
    async fn test_top_k_is_clamped_to_corpus_size() {
        let (index, roles) = built_index().await;
        let query = HashEmbedder::new(128).embed_sync("anything");
        assert_eq!(index.search(&query, 50).unwrap().len(), roles.len());
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        // Identical roles embed identically → identical scores.
        let roles = vec![make_role("a", "Twin"), make_role("b", "Twin"), make_role("c", "Twin")];
        let index = VectorIndex::new();
        index.build(&roles, &HashEmbedder::new(32)).await.unwrap();
        let query = index.vector(0).unwrap().to_vec();
        let ids: Vec<String> = index
            .search(&query, 3)
            .unwrap()
            .into_iter()
            .map(|h| h.role_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_query_is_normalised_before_search() {
        let (index, _) = built_index().await;
        let scaled: Vec<f32> = index.vector(0).unwrap().iter().map(|x| x * 7.5).collect();
        let hits = index.search(&scaled, 1).unwrap();
        assert_eq!(hits[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let (index, _) = built_index().await;
        assert!(index.search(&[1.0, 2.0], 1).is_err());
    }
}
