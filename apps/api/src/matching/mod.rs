//! Hybrid Matching Engine.
//!
//! Phase 1 recalls an over-sized pool of roles from the vector index by
//! semantic similarity. Phase 2 re-ranks that pool with a fixed blend of
//! semantic, skill, experience and keyword signals.

pub mod handlers;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::corpus::{Role, RoleCorpus, RoleProfile};
use crate::embedding::EmbeddingProvider;
use crate::errors::EngineError;
use crate::index::{round4, SearchHit, VectorIndex};
use crate::models::{CandidateProfile, MatchBreakdown, MatchOutcome, MatchResult};
use crate::scoring::skill_credit::normalize_set;

pub const WEIGHT_SEMANTIC: f64 = 0.40;
pub const WEIGHT_SKILLS: f64 = 0.35;
pub const WEIGHT_EXPERIENCE: f64 = 0.15;
pub const WEIGHT_KEYWORDS: f64 = 0.10;

const RECALL_MULTIPLIER: usize = 3;
const RECALL_CAP: usize = 20;

pub const EMPTY_RESUME_ERROR: &str = "Empty resume text provided.";
const METHOD: &str = "hybrid";

/// Everything built once at startup and shared read-only by every request.
pub struct MatchContext {
    corpus: RoleCorpus,
    index: VectorIndex,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl MatchContext {
    pub fn new(corpus: RoleCorpus, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            corpus,
            index: VectorIndex::new(),
            embedder,
        }
    }

    /// Builds the vector index over the corpus roles. Safe to call twice.
    pub async fn build_index(&self) -> Result<(), EngineError> {
        self.index
            .build(self.corpus.roles(), self.embedder.as_ref())
            .await
    }

    pub fn corpus(&self) -> &RoleCorpus {
        &self.corpus
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Ranks roles for a resume.
    ///
    /// Whitespace-only text short-circuits to an empty outcome carrying an
    /// error message, without touching the embedder.
    pub async fn match_roles(
        &self,
        resume_text: &str,
        candidate: &CandidateProfile,
        top_k: usize,
    ) -> Result<MatchOutcome, EngineError> {
        if resume_text.trim().is_empty() {
            return Ok(MatchOutcome::failed(EMPTY_RESUME_ERROR));
        }
        if !self.index.is_ready() {
            return Err(EngineError::NotReady);
        }

        let query = self.embedder.embed(resume_text).await?;
        let recall_k = (top_k.max(1) * RECALL_MULTIPLIER).min(RECALL_CAP);
        let hits = self.index.search(&query, recall_k)?;
        debug!("Recalled {} candidate roles", hits.len());

        let top_roles = rerank(&self.corpus, &hits, candidate, top_k);
        info!(
            "Matched {} roles, top: {}",
            top_roles.len(),
            top_roles
                .first()
                .map(|r| r.role_name.as_str())
                .unwrap_or("none")
        );

        Ok(MatchOutcome {
            top_roles,
            embedding_dim: self.index.dimension().unwrap_or(0),
            roles_searched: self.index.len(),
            matching_method: METHOD.to_string(),
            error: None,
        })
    }
}

/// Scores each recalled hit, sorts by hybrid score and keeps the best `top_k`.
///
/// The sort is stable, so equal scores keep recall order. Ranks are
/// reassigned 1..=n after sorting.
pub fn rerank(
    corpus: &RoleCorpus,
    hits: &[SearchHit],
    candidate: &CandidateProfile,
    top_k: usize,
) -> Vec<MatchResult> {
    let skills = normalize_set(&candidate.skills);
    let keywords = normalize_set(&candidate.keywords);
    let years = f64::from(candidate.experience_years);

    let mut results: Vec<MatchResult> = hits
        .iter()
        .filter_map(|hit| {
            let role = corpus.role(hit.position)?;
            let profile = corpus.profile(hit.position)?;
            Some(score_role(role, profile, hit.score, &skills, &keywords, years))
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    for (i, r) in results.iter_mut().enumerate() {
        r.rank = i + 1;
    }
    results
}

fn score_role(
    role: &Role,
    profile: &RoleProfile,
    semantic: f64,
    skills: &BTreeSet<String>,
    keywords: &BTreeSet<String>,
    years: f64,
) -> MatchResult {
    let semantic = semantic.clamp(0.0, 1.0);
    let skill_overlap = overlap(skills, &normalize_set(&profile.required_skills));
    let experience = experience_alignment(
        years,
        f64::from(role.min_experience),
        f64::from(role.max_experience),
    );
    let keyword_overlap = overlap(keywords, &normalize_set(&profile.keywords));

    let score = WEIGHT_SEMANTIC * semantic
        + WEIGHT_SKILLS * skill_overlap
        + WEIGHT_EXPERIENCE * experience
        + WEIGHT_KEYWORDS * keyword_overlap;

    MatchResult {
        role_id: role.id.clone(),
        role_name: role.name.clone(),
        role_category: role.category.clone(),
        role_level: role.level.clone(),
        domain: role.domain.clone(),
        rank: 0,
        score: round4(score),
        breakdown: MatchBreakdown {
            semantic: round4(semantic),
            skills: round4(skill_overlap),
            experience: round4(experience),
            keywords: round4(keyword_overlap),
        },
    }
}

/// |have ∩ want| / |want|, or 0 when `want` is empty.
fn overlap(have: &BTreeSet<String>, want: &BTreeSet<String>) -> f64 {
    if want.is_empty() {
        return 0.0;
    }
    have.intersection(want).count() as f64 / want.len() as f64
}

/// Piecewise experience fit in [0, 1]. Over-qualification is never penalised.
pub fn experience_alignment(years: f64, min: f64, max: f64) -> f64 {
    let years = years.max(0.0);
    if min <= 0.0 {
        return 0.0;
    }
    let max = max.max(min);
    if years < min {
        return years / min * 0.7;
    }
    if years <= max {
        if max == min {
            return 1.0;
        }
        return 0.7 + 0.3 * (years - min) / (max - min);
    }
    1.0
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::corpus::tests::sample_corpus;
    use crate::embedding::HashEmbedder;

    /// Counts `embed` calls, delegating to a hash embedder.
    pub(crate) struct CountingEmbedder {
        pub inner: HashEmbedder,
        pub calls: AtomicUsize,
    }

    impl CountingEmbedder {
        pub(crate) fn new(dimension: usize) -> Self {
            Self {
                inner: HashEmbedder::new(dimension),
                calls: AtomicUsize::new(0),
            }
        }
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

    pub(crate) async fn built_context() -> MatchContext {
        let ctx = MatchContext::new(sample_corpus(), Arc::new(HashEmbedder::new(128)));
        ctx.build_index().await.unwrap();
        ctx
    }

    fn candidate(skills: &[&str], keywords: &[&str], years: u32) -> CandidateProfile {
        CandidateProfile::new(
            skills.iter().map(|s| s.to_string()).collect(),
            keywords.iter().map(|s| s.to_string()).collect(),
            years,
        )
    }

    fn hit(position: usize, role_id: &str, score: f64) -> SearchHit {
        SearchHit {
            position,
            role_id: role_id.to_string(),
            rank: position + 1,
            score,
        }
    }

    #[tokio::test]
    async fn test_empty_resume_never_calls_embedder() {
        let embedder = Arc::new(CountingEmbedder::new(64));
        let ctx = MatchContext::new(sample_corpus(), embedder.clone());
        ctx.build_index().await.unwrap();
        let built_calls = embedder.calls.load(Ordering::SeqCst);

        let outcome = ctx
            .match_roles("   \n\t ", &CandidateProfile::default(), 5)
            .await
            .unwrap();

        assert!(outcome.top_roles.is_empty());
        assert_eq!(outcome.error.as_deref(), Some(EMPTY_RESUME_ERROR));
        assert_eq!(
            embedder.calls.load(Ordering::SeqCst),
            built_calls,
            "embedder must not be invoked for empty text"
        );
    }

    #[tokio::test]
    async fn test_match_before_index_build_is_not_ready() {
        let ctx = MatchContext::new(sample_corpus(), Arc::new(HashEmbedder::new(32)));
        let err = ctx
            .match_roles("python developer", &CandidateProfile::default(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
    }

    #[tokio::test]
    async fn test_match_returns_contiguous_ranks_and_metadata() {
        let ctx = built_context().await;
        let outcome = ctx
            .match_roles(
                "Backend developer building python services with sql and docker",
                &candidate(&["python", "sql", "docker"], &["microservices"], 3),
                2,
            )
            .await
            .unwrap();

        assert_eq!(outcome.top_roles.len(), 2);
        assert_eq!(outcome.roles_searched, 3);
        assert_eq!(outcome.embedding_dim, 128);
        assert_eq!(outcome.matching_method, "hybrid");
        assert!(outcome.error.is_none());
        for (i, r) in outcome.top_roles.iter().enumerate() {
            assert_eq!(r.rank, i + 1);
            assert!((0.0..=1.0).contains(&r.score));
        }
        for pair in outcome.top_roles.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_rerank_blends_four_signals() {
        let corpus = sample_corpus();
        let results = rerank(
            &corpus,
            &[hit(0, "backend_dev", 0.8)],
            &candidate(&["Python", "sql"], &["microservices"], 3),
            5,
        );
        let r = &results[0];
        assert!((r.breakdown.skills - 0.6667).abs() < 1e-9);
        assert!((r.breakdown.experience - 0.8).abs() < 1e-9);
        assert!((r.breakdown.keywords - 0.5).abs() < 1e-9);
        // 0.4*0.8 + 0.35*2/3 + 0.15*0.8 + 0.1*0.5
        assert!((r.score - 0.7233).abs() < 1e-9, "got {}", r.score);
    }

    #[test]
    fn test_higher_overlap_ranks_at_least_as_high_on_equal_semantics() {
        let corpus = sample_corpus();
        // backend_dev and ml_engineer share python + docker; sql only helps backend.
        let hits = [hit(2, "ml_engineer", 0.5), hit(0, "backend_dev", 0.5)];
        let results = rerank(&corpus, &hits, &candidate(&["python", "docker", "sql"], &[], 3), 2);
        assert_eq!(results[0].role_id, "backend_dev");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
    }

    #[test]
    fn test_rerank_ties_keep_recall_order() {
        let corpus = sample_corpus();
        let hits = [hit(2, "ml_engineer", 0.4), hit(0, "backend_dev", 0.4)];
        let results = rerank(&corpus, &hits, &CandidateProfile::default(), 2);
        // No skills, keywords or experience: both score 0.16.
        let ids: Vec<&str> = results.iter().map(|r| r.role_id.as_str()).collect();
        assert_eq!(ids, vec!["ml_engineer", "backend_dev"]);
    }

    #[test]
    fn test_rerank_truncates_to_top_k() {
        let corpus = sample_corpus();
        let hits = [
            hit(0, "backend_dev", 0.9),
            hit(1, "data_analyst", 0.5),
            hit(2, "ml_engineer", 0.1),
        ];
        assert_eq!(rerank(&corpus, &hits, &CandidateProfile::default(), 1).len(), 1);
    }

    #[test]
    fn test_experience_alignment_curve() {
        assert_eq!(experience_alignment(5.0, 0.0, 0.0), 0.0, "no minimum scores zero");
        assert!((experience_alignment(1.0, 2.0, 5.0) - 0.35).abs() < 1e-9);
        assert!((experience_alignment(2.0, 2.0, 5.0) - 0.7).abs() < 1e-9);
        assert!((experience_alignment(5.0, 2.0, 5.0) - 1.0).abs() < 1e-9);
        assert_eq!(experience_alignment(3.0, 3.0, 3.0), 1.0);
        assert_eq!(experience_alignment(12.0, 2.0, 5.0), 1.0, "over-qualified");
        assert_eq!(experience_alignment(-4.0, 2.0, 5.0), 0.0);
    }
}
