//! Industry alignment: how well a skill set tracks market demand and the target role.
//!
//! alignment = 0.35 × role coverage
//!           + 0.30 × normalised demand of recognised skills
//!           + 0.25 × recognition rate
//!           + 0.10 × emerging rate
//! then +5 on any non-zero score, capped at 100.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::corpus::SkillMarket;
use crate::scoring::round2;
use crate::scoring::skill_credit::{normalize_set, skill_credit};

const W_ROLE: f64 = 0.35;
const W_DEMAND: f64 = 0.30;
const W_RECOGNITION: f64 = 0.25;
const W_EMERGING: f64 = 0.10;

const LENIENCE_BONUS: f64 = 5.0;
/// Role coverage used when the role lists no skills.
const NEUTRAL_ROLE_COVERAGE: f64 = 55.0;
const HIGH_DEMAND_THRESHOLD: f64 = 50.0;
const TRENDING_MIN_DEMAND: f64 = 30.0;
const MAX_TRENDING: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemandRow {
    pub skill: String,
    pub demand_score: f64,
    pub global_trend: f64,
    pub is_emerging: bool,
    pub recognized: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentComponents {
    pub role_coverage: f64,
    pub demand_quality: f64,
    pub recognition_rate: f64,
    pub emerging_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub alignment_score: f64,
    pub components: AlignmentComponents,
    /// Candidate skills with demand ≥ 50, sorted.
    pub aligned_skills: Vec<String>,
    /// Emerging high-demand skills the candidate does not list.
    pub trending_skills: Vec<String>,
    pub skills_matched: usize,
    pub skills_total: usize,
    pub emerging_skill_count: usize,
    pub breakdown: Vec<SkillDemandRow>,
}

pub fn calculate(
    candidate_skills: &[String],
    role_skills: &[String],
    market: &SkillMarket,
) -> AlignmentReport {
    let candidate = normalize_set(candidate_skills);

    let mut breakdown = Vec::with_capacity(candidate.len());
    let mut demand_scores = Vec::new();
    let mut aligned = Vec::new();
    let mut emerging = 0usize;

    for skill in &candidate {
        match market.get(skill) {
            Some(d) => {
                demand_scores.push(d.demand_score);
                if d.is_emerging {
                    emerging += 1;
                }
                if d.demand_score >= HIGH_DEMAND_THRESHOLD {
                    aligned.push(skill.clone());
                }
                breakdown.push(SkillDemandRow {
                    skill: skill.clone(),
                    demand_score: round2(d.demand_score),
                    global_trend: round2(d.global_trend),
                    is_emerging: d.is_emerging,
                    recognized: true,
                });
            }
            None => breakdown.push(SkillDemandRow {
                skill: skill.clone(),
                demand_score: 0.0,
                global_trend: 0.0,
                is_emerging: false,
                recognized: false,
            }),
        }
    }

    let role_coverage = if normalize_set(role_skills).is_empty() {
        NEUTRAL_ROLE_COVERAGE
    } else {
        skill_credit(&candidate, role_skills).coverage
    };

    let demand_quality = if demand_scores.is_empty() {
        0.0
    } else {
        let total: f64 = demand_scores
            .iter()
            .map(|s| ((s - 5.0) / 95.0 * 100.0).clamp(0.0, 100.0))
            .sum();
        total / demand_scores.len() as f64
    };

    let recognized = demand_scores.len();
    let recognition_rate = ratio(recognized, candidate.len());
    let emerging_rate = ratio(emerging, recognized);

    let mut alignment = role_coverage * W_ROLE
        + demand_quality * W_DEMAND
        + recognition_rate * W_RECOGNITION
        + emerging_rate * W_EMERGING;
    if alignment > 0.0 {
        alignment = (alignment + LENIENCE_BONUS).min(100.0);
    }

    AlignmentReport {
        alignment_score: round2(alignment.clamp(0.0, 100.0)),
        components: AlignmentComponents {
            role_coverage: round2(role_coverage),
            demand_quality: round2(demand_quality),
            recognition_rate: round2(recognition_rate),
            emerging_rate: round2(emerging_rate),
        },
        aligned_skills: aligned,
        trending_skills: trending_skills(&candidate, market),
        skills_matched: recognized,
        skills_total: candidate.len(),
        emerging_skill_count: emerging,
        breakdown,
    }
}

/// Top emerging skills (demand > 30) missing from `candidate`, by demand then name.
fn trending_skills(candidate: &BTreeSet<String>, market: &SkillMarket) -> Vec<String> {
    let mut trending: Vec<(&String, f64)> = market
        .iter()
        .filter(|(name, d)| {
            d.is_emerging && d.demand_score > TRENDING_MIN_DEMAND && !candidate.contains(*name)
        })
        .map(|(name, d)| (name, d.demand_score))
        .collect();
    trending.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    trending
        .into_iter()
        .take(MAX_TRENDING)
        .map(|(name, _)| name.clone())
        .collect()
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SkillDemand;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn market() -> SkillMarket {
        let entry = |name: &str, demand: f64, emerging: bool| {
            (
                name.to_string(),
                SkillDemand {
                    demand_score: demand,
                    global_trend: demand / 2.0,
                    is_emerging: emerging,
                },
            )
        };
        SkillMarket::from_entries([
            entry("python", 100.0, false),
            entry("sql", 52.5, false),
            entry("rust", 80.0, true),
            entry("langchain", 90.0, true),
            entry("cobol", 20.0, true),
        ])
    }

    #[test]
    fn test_alignment_blends_all_components() {
        // python + sql recognised, "excel" unknown; role needs python + docker.
        let report = calculate(
            &strings(&["python", "sql", "excel"]),
            &strings(&["python", "docker"]),
            &market(),
        );
        let c = report.components;
        assert_eq!(c.role_coverage, 50.0);
        assert_eq!(c.demand_quality, 75.0); // (100 + 50) / 2
        assert_eq!(c.recognition_rate, 66.67);
        assert_eq!(c.emerging_rate, 0.0);
        // 17.5 + 22.5 + 16.667 + 0 + 5
        assert_eq!(report.alignment_score, 61.67);
        assert_eq!(report.aligned_skills, strings(&["python", "sql"]));
        assert_eq!(report.skills_matched, 2);
        assert_eq!(report.skills_total, 3);
    }

    #[test]
    fn test_role_without_skills_uses_neutral_coverage() {
        let report = calculate(&strings(&["excel"]), &[], &market());
        assert_eq!(report.components.role_coverage, 55.0);
        // 55 × 0.35 + 5
        assert_eq!(report.alignment_score, 24.25);
    }

    #[test]
    fn test_zero_alignment_gets_no_bonus() {
        let report = calculate(
            &strings(&["excel"]),
            &strings(&["docker"]),
            &SkillMarket::default(),
        );
        assert_eq!(report.alignment_score, 0.0);
    }

    #[test]
    fn test_trending_skips_known_and_low_demand() {
        let report = calculate(&strings(&["rust"]), &strings(&["rust"]), &market());
        assert_eq!(report.trending_skills, strings(&["langchain"]));
        assert_eq!(report.emerging_skill_count, 1);
    }

    #[test]
    fn test_score_is_capped_at_100() {
        let report = calculate(&strings(&["rust", "langchain"]), &strings(&["rust"]), &market());
        assert!(report.alignment_score <= 100.0);
    }

    #[test]
    fn test_breakdown_marks_unrecognised_skills() {
        let report = calculate(&strings(&["excel"]), &[], &market());
        assert_eq!(report.breakdown.len(), 1);
        assert!(!report.breakdown[0].recognized);
    }
}
