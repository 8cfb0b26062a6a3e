//! Orchestration pipeline: extract → normalize → match → score → aggregate.
//!
//! Every scoring stage returns `Result<T, EngineError>`. A failed stage is
//! logged, recorded as a `StageWarning`, and replaced by `T::default()`, so a
//! report always carries every stage's key.

pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{error, info};

use crate::corpus::{fallback_skills, SkillMarket};
use crate::errors::EngineError;
use crate::extraction::{token_count, ExtractedProfile, InformationExtractor, SkillNormalizer};
use crate::matching::MatchContext;
use crate::models::{
    CandidateProfile, JdSource, MatchOutcome, Report, ReportMeta, StageWarning, Summary,
    TargetRole, TargetSource,
};
use crate::scoring::{
    alignment, ats, explanation, jd_fit, skill_gap, AlignmentReport, AtsReport, JdComparison,
    RoleExplanation, SkillGapReport,
};

pub const NO_MATCHES_ERROR: &str = "No matching roles found.";

/// Semantic score assigned to a named role the matcher did not return,
/// relative to the best match.
const UNRANKED_SEMANTIC_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// The scoring stages the pipeline runs after matching.
///
/// The default methods are the production scorers. `StandardScorers` uses
/// them as-is; tests override single methods to force a stage failure.
pub trait Scorers: Send + Sync {
    fn ats(&self, input: ats::AtsInput<'_>) -> Result<AtsReport, EngineError> {
        ats::try_calculate(input)
    }

    fn skill_gap(
        &self,
        candidate_skills: &[String],
        role_skills: &[String],
    ) -> Result<SkillGapReport, EngineError> {
        Ok(skill_gap::identify(candidate_skills, role_skills))
    }

    fn industry_alignment(
        &self,
        candidate_skills: &[String],
        role_skills: &[String],
        market: &SkillMarket,
    ) -> Result<AlignmentReport, EngineError> {
        Ok(alignment::calculate(candidate_skills, role_skills, market))
    }

    fn jd_comparison(
        &self,
        resume_text: &str,
        resume: &ExtractedProfile,
        jd_text: &str,
        extractor: &dyn InformationExtractor,
    ) -> Result<JdComparison, EngineError> {
        jd_fit::compare(resume_text, resume, jd_text, extractor)
    }

    fn explanation(
        &self,
        input: explanation::ExplanationInput<'_>,
    ) -> Result<RoleExplanation, EngineError> {
        Ok(explanation::explain(input))
    }
}

pub struct StandardScorers;

impl Scorers for StandardScorers {}

pub struct AnalysisPipeline {
    context: Arc<MatchContext>,
    extractor: Arc<dyn InformationExtractor>,
    normalizer: SkillNormalizer,
    scorers: Arc<dyn Scorers>,
    default_top_k: usize,
}

/// Per-run bookkeeping: which stages ran and which degraded.
struct StageLog {
    meta: ReportMeta,
}

impl StageLog {
    fn ran(&mut self, stage: &str) {
        self.meta.stages_executed.push(stage.to_string());
    }

    /// Unwraps a stage result, substituting the default on failure.
    fn absorb<T: Default>(&mut self, stage: &'static str, result: Result<T, EngineError>) -> T {
        self.ran(stage);
        match result {
            Ok(value) => value,
            Err(e) => {
                error!(stage, "Stage failed, using default: {e}");
                self.meta.warnings.push(StageWarning {
                    stage: stage.to_string(),
                    message: e.to_string(),
                });
                T::default()
            }
        }
    }
}

impl AnalysisPipeline {
    pub fn new(
        context: Arc<MatchContext>,
        extractor: Arc<dyn InformationExtractor>,
        default_top_k: usize,
    ) -> Self {
        Self {
            context,
            extractor,
            normalizer: SkillNormalizer::new(),
            scorers: Arc::new(StandardScorers),
            default_top_k: default_top_k.max(1),
        }
    }

    #[cfg(test)]
    pub fn with_scorers(mut self, scorers: Arc<dyn Scorers>) -> Self {
        self.scorers = scorers;
        self
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    /// Extracts and normalizes the candidate's attributes from resume text.
    pub fn profile(&self, resume_text: &str) -> Result<CandidateProfile, EngineError> {
        let extracted = self.extractor.extract(resume_text)?;
        Ok(self.candidate(resume_text, extracted))
    }

    fn candidate(&self, resume_text: &str, extracted: ExtractedProfile) -> CandidateProfile {
        CandidateProfile::new(
            self.normalizer.normalize(&extracted.skills),
            extracted.keywords,
            extracted.experience_years,
        )
        .with_token_count(token_count(resume_text))
    }

    /// Runs only the matching engine.
    pub async fn match_only(
        &self,
        resume_text: &str,
        top_k: Option<usize>,
    ) -> Result<MatchOutcome, EngineError> {
        let candidate = self.profile(resume_text)?;
        let top_k = top_k.unwrap_or(self.default_top_k).max(1);
        self.context
            .match_roles(resume_text, &candidate, top_k)
            .await
    }

    /// Produces a full report. Never fails; degraded stages show up in
    /// `meta.warnings`.
    pub async fn analyze(&self, request: AnalysisRequest) -> Report {
        let started = Instant::now();
        let mut log = StageLog {
            meta: ReportMeta::start(self.context.embedder().name()),
        };
        let resume_text = request.resume_text.as_str();
        let top_k = request.top_k.unwrap_or(self.default_top_k).max(1);

        let extracted = log.absorb("extraction", self.extractor.extract(resume_text));
        log.ran("normalization");
        let candidate = self.candidate(resume_text, extracted);

        let matching = self
            .context
            .match_roles(resume_text, &candidate, top_k)
            .await
            .unwrap_or_else(|e| MatchOutcome::failed(e.to_string()));
        log.ran("matching");
        if let Some(message) = &matching.error {
            error!(stage = "matching", "Stage failed: {message}");
            log.meta.warnings.push(StageWarning {
                stage: "matching".to_string(),
                message: message.clone(),
            });
        }

        if matching.top_roles.is_empty() {
            let mut meta = log.meta;
            meta.elapsed_seconds = started.elapsed().as_secs_f64();
            info!("Analysis {} found no matching roles", meta.analysis_id);
            let mut report = Report::empty(candidate, meta);
            report.matching = matching;
            report.error = Some(NO_MATCHES_ERROR.to_string());
            return report;
        }

        let target = self.resolve_target(request.target_role.as_deref(), &matching);
        let corpus = self.context.corpus();
        let role = corpus.find_by_name(&target.role_name);
        let mut role_skills = corpus.role_skills(&target.role_name);
        if role_skills.is_empty() {
            role_skills = self.normalizer.normalize(&fallback_skills(&target.role_name));
        }
        let (min_years, max_years) = role
            .map(|r| (f64::from(r.min_experience), f64::from(r.max_experience)))
            .unwrap_or((0.0, 0.0));

        let ats_score = log.absorb(
            "ats_score",
            self.scorers.ats(ats::AtsInput {
                candidate_skills: &candidate.skills,
                role_skills: &role_skills,
                candidate_years: f64::from(candidate.experience_years),
                role_min_years: min_years,
                role_max_years: max_years,
                semantic_score: target.semantic_score,
            }),
        );

        let skill_gap = log.absorb(
            "skill_gap",
            self.scorers.skill_gap(&candidate.skills, &role_skills),
        );

        let industry_alignment = log.absorb(
            "industry_alignment",
            self.scorers
                .industry_alignment(&candidate.skills, &role_skills, corpus.market()),
        );

        let (jd_source, jd_text) = self.resolve_jd(request.job_description, &target.role_name);
        let jd_comparison = match jd_source {
            JdSource::None => JdComparison {
                recommendation: "No job description available for comparison.".to_string(),
                ..Default::default()
            },
            _ => {
                let resume = ExtractedProfile {
                    skills: candidate.skills.clone(),
                    keywords: candidate.keywords.clone(),
                    experience_years: candidate.experience_years,
                };
                log.absorb(
                    "jd_comparison",
                    self.scorers.jd_comparison(
                        resume_text,
                        &resume,
                        &jd_text,
                        self.extractor.as_ref(),
                    ),
                )
            }
        };

        let explanation = log.absorb(
            "explanation",
            self.scorers.explanation(explanation::ExplanationInput {
                role_name: &target.role_name,
                coverage: skill_gap.coverage_percent,
                experience_years: candidate.experience_years,
                matched_skills: &ats_score.matched_skills,
                missing_skills: &ats_score.missing_skills,
                semantic_score: target.semantic_score,
                ats_score: ats_score.final_score,
            }),
        );

        log.ran("summary");
        let summary = Summary {
            overall_score: ats_score.final_score,
            skill_coverage: skill_gap.coverage_percent,
            missing_skills_count: skill_gap.missing_count,
            top_role: matching.top_roles.first().map(|r| r.role_name.clone()),
        };

        let mut meta = log.meta;
        meta.elapsed_seconds = started.elapsed().as_secs_f64();
        info!(
            "Analysis {} done in {:.3}s (target: {}, jd: {:?}, warnings: {})",
            meta.analysis_id,
            meta.elapsed_seconds,
            target.role_name,
            jd_source,
            meta.warnings.len()
        );

        Report {
            target_role: target,
            jd_source,
            candidate_profile: candidate,
            matching,
            ats_score,
            skill_gap,
            industry_alignment,
            jd_comparison,
            explanation,
            summary,
            meta,
            error: None,
        }
    }

    /// A user-named role wins over the top match. Its semantic score comes
    /// from the match list, or a fraction of the best score if unranked.
    fn resolve_target(&self, requested: Option<&str>, matching: &MatchOutcome) -> TargetRole {
        let top = &matching.top_roles[0];
        let corpus = self.context.corpus();

        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => {
                let catalog_role = corpus.find_by_name(name);
                let role_name = catalog_role
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| name.to_string());
                let semantic_score = matching
                    .top_roles
                    .iter()
                    .find(|r| r.role_name.eq_ignore_ascii_case(&role_name))
                    .map(|r| r.breakdown.semantic)
                    .unwrap_or(top.breakdown.semantic * UNRANKED_SEMANTIC_FACTOR);
                TargetRole {
                    role_name,
                    source: TargetSource::UserProvided,
                    semantic_score,
                    in_catalog: catalog_role.is_some(),
                }
            }
            None => TargetRole {
                role_name: top.role_name.clone(),
                source: TargetSource::TopMatch,
                semantic_score: top.breakdown.semantic,
                in_catalog: true,
            },
        }
    }

    fn resolve_jd(&self, supplied: Option<String>, role_name: &str) -> (JdSource, String) {
        if let Some(jd) = supplied.filter(|jd| !jd.trim().is_empty()) {
            return (JdSource::UserProvided, jd);
        }
        let default_jd = self.context.corpus().default_jd(role_name);
        if default_jd.trim().is_empty() {
            (JdSource::None, String::new())
        } else {
            (JdSource::Default, default_jd)
        }
    }
}
