use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::CandidateProfile;
use crate::models::matching::MatchOutcome;
use crate::scoring::{AlignmentReport, AtsReport, JdComparison, RoleExplanation, SkillGapReport};

/// Where the job description used for comparison came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JdSource {
    UserProvided,
    Default,
    #[default]
    None,
}

/// How the target role was chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    UserProvided,
    #[default]
    TopMatch,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRole {
    pub role_name: String,
    pub source: TargetSource,
    /// Semantic similarity used by the ATS scorer, in [0, 1].
    pub semantic_score: f64,
    /// False when the name is not in the catalog and fallback skills were used.
    pub in_catalog: bool,
}

/// A stage that failed and was replaced by its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageWarning {
    pub stage: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub overall_score: f64,
    pub skill_coverage: f64,
    pub missing_skills_count: usize,
    pub top_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub embedding_backend: String,
    pub stages_executed: Vec<String>,
    pub warnings: Vec<StageWarning>,
}

impl ReportMeta {
    pub fn start(embedding_backend: &str) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            elapsed_seconds: 0.0,
            embedding_backend: embedding_backend.to_string(),
            stages_executed: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// The full analysis result. Every stage key is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub target_role: TargetRole,
    pub jd_source: JdSource,
    pub candidate_profile: CandidateProfile,
    pub matching: MatchOutcome,
    pub ats_score: AtsReport,
    pub skill_gap: SkillGapReport,
    pub industry_alignment: AlignmentReport,
    pub jd_comparison: JdComparison,
    pub explanation: RoleExplanation,
    pub summary: Summary,
    pub meta: ReportMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    /// A report with every stage at its default value.
    pub fn empty(candidate_profile: CandidateProfile, meta: ReportMeta) -> Self {
        Self {
            target_role: TargetRole::default(),
            jd_source: JdSource::None,
            candidate_profile,
            matching: MatchOutcome::default(),
            ats_score: AtsReport::default(),
            skill_gap: SkillGapReport::default(),
            industry_alignment: AlignmentReport::default(),
            jd_comparison: JdComparison::default(),
            explanation: RoleExplanation::default(),
            summary: Summary::default(),
            meta,
            error: None,
        }
    }
}
