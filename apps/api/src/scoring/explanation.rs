//! Human-readable explanation of the target-role fit.

use serde::{Deserialize, Serialize};

const STRONG_COVERAGE: f64 = 80.0;
const MODERATE_COVERAGE: f64 = 50.0;
const LISTED_SKILLS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StrongMatch,
    ModerateMatch,
    GrowthOpportunity,
    #[default]
    Unknown,
}

impl Verdict {
    pub fn from_coverage(coverage: f64) -> Self {
        if coverage >= STRONG_COVERAGE {
            Verdict::StrongMatch
        } else if coverage >= MODERATE_COVERAGE {
            Verdict::ModerateMatch
        } else {
            Verdict::GrowthOpportunity
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Verdict::StrongMatch => "Strong fit. You meet most of the role requirements.",
            Verdict::ModerateMatch => "Moderate fit. Some upskilling would strengthen your profile.",
            Verdict::GrowthOpportunity => "Growth opportunity. Targeted learning can bridge the gap.",
            Verdict::Unknown => "Unable to generate explanation.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleExplanation {
    pub role_name: String,
    pub verdict_key: Verdict,
    pub verdict: String,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ExplanationInput<'a> {
    pub role_name: &'a str,
    /// Skill coverage 0–100.
    pub coverage: f64,
    pub experience_years: u32,
    pub matched_skills: &'a [String],
    pub missing_skills: &'a [String],
    /// Cosine similarity in [0, 1].
    pub semantic_score: f64,
    pub ats_score: f64,
}

pub fn explain(input: ExplanationInput<'_>) -> RoleExplanation {
    let verdict_key = Verdict::from_coverage(input.coverage);
    let mut reasoning = vec![format!(
        "You match {:.0}% of the required skills for {}.",
        input.coverage, input.role_name
    )];

    let years = input.experience_years;
    let plural = if years == 1 { "" } else { "s" };
    reasoning.push(if years == 0 {
        "No professional experience detected; entry-level roles recommended.".to_string()
    } else if input.coverage >= 60.0 {
        format!("Your {years} year{plural} of experience align well with this role.")
    } else {
        format!(
            "You have {years} year{plural} of experience, but your skills need development for this specific role."
        )
    });

    reasoning.push(format!(
        "Semantic profile similarity: {:.1}%.",
        input.semantic_score * 100.0
    ));
    reasoning.push(format!(
        "Overall ATS compatibility score: {:.1}/100.",
        input.ats_score
    ));

    if !input.matched_skills.is_empty() {
        reasoning.push(format!("Key matching skills: {}.", top(input.matched_skills)));
    }
    if !input.missing_skills.is_empty() {
        reasoning.push(format!("Skills to develop: {}.", top(input.missing_skills)));
    }

    RoleExplanation {
        role_name: input.role_name.to_string(),
        verdict_key,
        verdict: verdict_key.headline().to_string(),
        reasoning,
    }
}

fn top(skills: &[String]) -> String {
    skills
        .iter()
        .take(LISTED_SKILLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(
        coverage: f64,
        years: u32,
        matched: &'a [String],
        missing: &'a [String],
    ) -> ExplanationInput<'a> {
        ExplanationInput {
            role_name: "Backend Developer",
            coverage,
            experience_years: years,
            matched_skills: matched,
            missing_skills: missing,
            semantic_score: 0.8123,
            ats_score: 67.67,
        }
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_coverage(80.0), Verdict::StrongMatch);
        assert_eq!(Verdict::from_coverage(79.99), Verdict::ModerateMatch);
        assert_eq!(Verdict::from_coverage(50.0), Verdict::ModerateMatch);
        assert_eq!(Verdict::from_coverage(49.0), Verdict::GrowthOpportunity);
    }

    #[test]
    fn test_reasoning_mentions_scores_and_skills() {
        let matched = vec!["python".to_string(), "sql".to_string()];
        let missing = vec!["docker".to_string()];
        let e = explain(input(66.67, 3, &matched, &missing));
        assert_eq!(e.verdict_key, Verdict::ModerateMatch);
        assert_eq!(e.reasoning[0], "You match 67% of the required skills for Backend Developer.");
        assert!(e.reasoning[1].starts_with("Your 3 years"));
        assert_eq!(e.reasoning[2], "Semantic profile similarity: 81.2%.");
        assert_eq!(e.reasoning[3], "Overall ATS compatibility score: 67.7/100.");
        assert_eq!(e.reasoning[4], "Key matching skills: python, sql.");
        assert_eq!(e.reasoning[5], "Skills to develop: docker.");
    }

    #[test]
    fn test_zero_experience_recommends_entry_level() {
        let e = explain(input(20.0, 0, &[], &[]));
        assert!(e.reasoning[1].contains("entry-level"));
        assert_eq!(e.reasoning.len(), 4);
    }

    #[test]
    fn test_verdict_serializes_snake_case() {
        let json = serde_json::to_value(Verdict::GrowthOpportunity).unwrap();
        assert_eq!(json, "growth_opportunity");
    }
}
