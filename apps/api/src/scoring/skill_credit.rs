//! Fuzzy Skill-Credit Model: the one skill comparison every scorer shares.
//!
//! Algorithm:
//! 1. Lowercase + trim both sets (sorted, so iteration order is deterministic)
//! 2. Exact match → 1.0 credit
//! 3. Remaining required skills: first candidate skill that is a substring of it,
//!    or that it is a substring of, → 0.7 credit (greedy, first found)
//! 4. coverage = credits / |required| × 100, capped at 100
//! 5. +2 per candidate skill unrelated to every required skill, capped at +10
//! 6. score = min(coverage + bonus, 100)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const EXACT_CREDIT: f64 = 1.0;
pub const PARTIAL_CREDIT: f64 = 0.7;
pub const BREADTH_BONUS_PER_SKILL: f64 = 2.0;
pub const BREADTH_BONUS_CAP: f64 = 10.0;

/// A required skill credited through a substring relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMatch {
    pub required: String,
    pub candidate_has: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCredit {
    /// Final 0–100 score including the breadth bonus.
    pub score: f64,
    /// Credit coverage before the bonus, 0–100.
    pub coverage: f64,
    pub bonus: f64,
    /// Required skills credited exactly or partially, sorted.
    pub matched: Vec<String>,
    /// Required skills with no credit, sorted.
    pub missing: Vec<String>,
    /// Required skills credited exactly, sorted.
    pub exact: Vec<String>,
    pub partial: Vec<PartialMatch>,
    /// Candidate skills that are not an exact required skill, sorted.
    pub extra: Vec<String>,
    pub required_total: usize,
}

pub fn normalize_set<I, S>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn related(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Compares `candidate` against `required` with partial credit for near-matches.
///
/// An empty required set is a perfect score: there is no gap to measure.
pub fn skill_credit<C, R, S, T>(candidate: C, required: R) -> SkillCredit
where
    C: IntoIterator<Item = S>,
    R: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    let cand = normalize_set(candidate);
    let req = normalize_set(required);

    if req.is_empty() {
        return SkillCredit {
            score: 100.0,
            coverage: 100.0,
            extra: cand.into_iter().collect(),
            ..Default::default()
        };
    }

    let exact: Vec<String> = cand.intersection(&req).cloned().collect();
    let mut credits = exact.len() as f64 * EXACT_CREDIT;

    let mut partial = Vec::new();
    let mut missing = Vec::new();
    for required_skill in req.difference(&cand) {
        match cand.iter().find(|c| related(required_skill, c)) {
            Some(c) => {
                credits += PARTIAL_CREDIT;
                partial.push(PartialMatch {
                    required: required_skill.clone(),
                    candidate_has: c.clone(),
                });
            }
            None => missing.push(required_skill.clone()),
        }
    }

    let coverage = (credits / req.len() as f64 * 100.0).min(100.0);

    let unrelated = cand
        .iter()
        .filter(|c| !req.iter().any(|r| related(r, c)))
        .count();
    let bonus = (unrelated as f64 * BREADTH_BONUS_PER_SKILL).min(BREADTH_BONUS_CAP);

    let mut matched: Vec<String> = exact
        .iter()
        .cloned()
        .chain(partial.iter().map(|p| p.required.clone()))
        .collect();
    matched.sort();

    SkillCredit {
        score: (coverage + bonus).min(100.0),
        coverage,
        bonus,
        matched,
        missing,
        exact,
        partial,
        extra: cand.difference(&req).cloned().collect(),
        required_total: req.len(),
    }
}
