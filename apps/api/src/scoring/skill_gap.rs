//! Skill-gap report for the target role, built on the shared credit model.

use serde::{Deserialize, Serialize};

use crate::scoring::round2;
use crate::scoring::skill_credit::{skill_credit, PartialMatch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGapReport {
    /// Exact matches only; substring matches are listed in `partial_matches`.
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub partial_matches: Vec<PartialMatch>,
    pub extra_skills: Vec<String>,
    /// Weighted credit coverage without the breadth bonus, 0–100.
    pub coverage_percent: f64,
    pub matched_count: usize,
    pub partial_count: usize,
    pub missing_count: usize,
    pub required_total: usize,
}

pub fn identify(candidate_skills: &[String], role_skills: &[String]) -> SkillGapReport {
    let credit = skill_credit(candidate_skills, role_skills);
    SkillGapReport {
        matched_count: credit.exact.len(),
        partial_count: credit.partial.len(),
        missing_count: credit.missing.len(),
        required_total: credit.required_total,
        coverage_percent: round2(credit.coverage),
        matched_skills: credit.exact,
        missing_skills: credit.missing,
        partial_matches: credit.partial,
        extra_skills: credit.extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_gap_splits_exact_partial_and_missing() {
        let report = identify(
            &strings(&["Python", "react.js", "figma"]),
            &strings(&["python", "react", "kubernetes"]),
        );
        assert_eq!(report.matched_skills, strings(&["python"]));
        assert_eq!(report.partial_matches.len(), 1);
        assert_eq!(report.partial_matches[0].required, "react");
        assert_eq!(report.missing_skills, strings(&["kubernetes"]));
        assert_eq!(report.extra_skills, strings(&["figma", "react.js"]));
        assert_eq!(report.coverage_percent, 56.67);
        assert_eq!(
            (
                report.matched_count,
                report.partial_count,
                report.missing_count,
                report.required_total
            ),
            (1, 1, 1, 3)
        );
    }

    #[test]
    fn test_coverage_ignores_breadth_bonus() {
        let report = identify(
            &strings(&["sql", "go", "rust", "c++"]),
            &strings(&["sql", "docker"]),
        );
        assert_eq!(report.coverage_percent, 50.0);
    }

    #[test]
    fn test_empty_role_skills_is_full_coverage() {
        let report = identify(&strings(&["python"]), &[]);
        assert_eq!(report.coverage_percent, 100.0);
        assert!(report.missing_skills.is_empty());
        assert_eq!(report.required_total, 0);
    }
}
