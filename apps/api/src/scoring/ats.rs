//! ATS Score: skill coverage (50%), experience alignment (20%), semantic similarity (30%).

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::scoring::round2;
use crate::scoring::skill_credit::skill_credit;

pub const WEIGHT_SKILL: f64 = 0.50;
pub const WEIGHT_EXPERIENCE: f64 = 0.20;
pub const WEIGHT_SEMANTIC: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtsWeights {
    pub skill: f64,
    pub experience: f64,
    pub semantic: f64,
}

impl Default for AtsWeights {
    fn default() -> Self {
        Self {
            skill: WEIGHT_SKILL,
            experience: WEIGHT_EXPERIENCE,
            semantic: WEIGHT_SEMANTIC,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsBreakdown {
    pub skill_score: f64,
    pub experience_score: f64,
    pub semantic_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    pub final_score: f64,
    pub breakdown: AtsBreakdown,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub weights: AtsWeights,
}

/// Everything the ATS scorer reads for one candidate/role pair.
#[derive(Debug, Clone, Copy)]
pub struct AtsInput<'a> {
    pub candidate_skills: &'a [String],
    pub role_skills: &'a [String],
    pub candidate_years: f64,
    pub role_min_years: f64,
    pub role_max_years: f64,
    /// Cosine similarity in [0, 1].
    pub semantic_score: f64,
}

/// Scores one candidate/role pair. Any internal failure yields an all-zero report.
pub fn try_calculate(input: AtsInput<'_>) -> Result<AtsReport, EngineError> {
    let numbers = [
        input.candidate_years,
        input.role_min_years,
        input.role_max_years,
        input.semantic_score,
    ];
    if numbers.iter().any(|n| !n.is_finite()) {
        return Err(EngineError::stage("ats_score", "non-finite numeric input"));
    }

    let credit = skill_credit(input.candidate_skills, input.role_skills);
    let skill = credit.score;
    let experience = experience_score(
        input.candidate_years,
        input.role_min_years,
        input.role_max_years,
    );
    let semantic = input.semantic_score.clamp(0.0, 1.0) * 100.0;

    let final_score =
        skill * WEIGHT_SKILL + experience * WEIGHT_EXPERIENCE + semantic * WEIGHT_SEMANTIC;

    Ok(AtsReport {
        final_score: round2(final_score),
        breakdown: AtsBreakdown {
            skill_score: round2(skill),
            experience_score: round2(experience),
            semantic_score: round2(semantic),
        },
        matched_skills: credit.matched,
        missing_skills: credit.missing,
        weights: AtsWeights::default(),
    })
}

/// Graduated experience curve (0–100) for candidate years against `[min, max]`.
///
/// - no minimum → 50
/// - 0 years → 5
/// - below min → 5 → 15
/// - min → midpoint → 15 → 70
/// - midpoint → max → 70 → 90
/// - at or above max → 90
///
/// `max` of 0 means unset and defaults to `2 × min`.
pub fn experience_score(candidate_years: f64, role_min: f64, role_max: f64) -> f64 {
    let e = candidate_years.max(0.0);
    let min = role_min.max(0.0);
    let max = if role_max > 0.0 { role_max.max(min) } else { min * 2.0 };

    if min <= 0.0 {
        return 50.0;
    }
    if e <= 0.0 {
        return 5.0;
    }
    if e < min {
        return 5.0 + e / min * 10.0;
    }
    // Checked before the ramps so min == max lands on the plateau.
    if e >= max {
        return 90.0;
    }

    let mid = (min + max) / 2.0;
    if e <= mid {
        15.0 + (e - min) / (mid - min) * 55.0
    } else {
        70.0 + (e - mid) / (max - mid) * 20.0
    }
}
