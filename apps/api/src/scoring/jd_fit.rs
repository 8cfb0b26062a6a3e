//! JD Comparison: how well a resume covers the terms of one job description.
//!
//! Algorithm:
//! 1. Build the JD keyword inventory from extracted skills (weight 1.0) and
//!    domain keywords (weight 0.6), each weighted by its frequency in the JD.
//! 2. For each JD term, strength against the resume:
//!    - exact resume skill/keyword → 1.0
//!    - substring of / superstring of one → 0.7
//!    - appears in the raw resume text → 0.6
//!    - otherwise → 0.0
//! 3. keyword_score = Σ(strength × weight) / Σ(weight) × 100
//! 4. Classify: strong (≥0.8), partial (0.4–0.79), gap (<0.4)
//! 5. Section relevance (0–100 each): skills, experience, education, tools
//! 6. overall = 0.75 × keyword coverage + 0.25 × mean section relevance

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::extraction::{ExtractedProfile, InformationExtractor};
use crate::scoring::round2;
use crate::scoring::skill_credit::{skill_credit, PARTIAL_CREDIT};

const SKILL_WEIGHT: f32 = 1.0;
const KEYWORD_WEIGHT: f32 = 0.6;
const TEXT_MATCH_STRENGTH: f32 = 0.6;
const STRONG_THRESHOLD: f32 = 0.8;
const PARTIAL_THRESHOLD: f32 = 0.4;
const KEYWORD_SHARE: f64 = 0.75;

/// Highest level found wins; a higher level satisfies a lower requirement.
#[rustfmt::skip]
const EDUCATION_LEVELS: &[(&str, u8)] = &[
    ("phd", 5), ("ph.d", 5), ("doctorate", 5),
    ("master", 4), ("masters", 4), ("m.s", 4), ("msc", 4), ("m.tech", 4), ("mba", 4), ("mca", 4),
    ("bachelor", 3), ("bachelors", 3), ("b.s", 3), ("bsc", 3), ("b.tech", 3), ("b.e", 3),
    ("bca", 3),
    ("degree", 2),
    ("diploma", 1), ("certificate", 1), ("certification", 1),
];

const EDUCATION_FIELDS: &[&str] = &[
    "computer science", "engineering", "information technology", "data science", "mathematics",
    "statistics", "physics", "business", "management", "software", "electrical",
];
const FIELD_BONUS: f64 = 10.0;

const TOOLS: &[&str] = &[
    "git", "github", "gitlab", "bitbucket", "jira", "confluence", "trello", "notion",
    "docker", "kubernetes", "jenkins", "circleci", "terraform", "ansible", "puppet", "chef",
    "webpack", "vite", "babel", "npm", "yarn", "pip", "maven", "gradle", "cargo",
    "figma", "sketch", "postman", "swagger", "vscode", "intellij", "pycharm", "vim",
    "linux", "ubuntu", "nginx", "apache", "tomcat", "aws", "azure", "gcp", "heroku", "vercel",
    "visual studio", "windows server", "adobe xd",
];

/// A single JD term, weighted by kind and frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    /// skill=1.0, domain keyword=0.6
    pub kind_weight: f32,
    /// frequency * kind_weight
    pub weighted_score: f32,
}

/// A JD term the resume covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMatch {
    pub keyword: String,
    pub resume_evidence: String,
    pub strength: f32,
}

/// A JD term with no usable evidence in the resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub keyword: String,
    pub jd_frequency: u32,
    /// Closest resume term sharing a word with the keyword, if any.
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceFit {
    pub jd_years: u32,
    pub resume_years: u32,
    pub relevance_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JdComparison {
    pub overall_match_percent: f64,
    pub keyword_score: f64,
    /// Fuzzy-credit coverage of JD terms by resume terms.
    pub keyword_coverage_percent: f64,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub strong_matches: Vec<FitMatch>,
    pub partial_matches: Vec<FitMatch>,
    pub gaps: Vec<Gap>,
    pub jd_keyword_count: usize,
    pub experience: ExperienceFit,
    /// Relevance per section: skills, experience, education, tools.
    pub section_scores: BTreeMap<String, f64>,
    pub recommendation: String,
}

/// Extracts and weights the terms of a job description.
pub fn keyword_inventory(jd_text: &str, jd: &ExtractedProfile) -> Vec<KeywordEntry> {
    let lower = jd_text.to_lowercase();
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();

    let terms = jd
        .skills
        .iter()
        .map(|s| (s, SKILL_WEIGHT))
        .chain(jd.keywords.iter().map(|k| (k, KEYWORD_WEIGHT)));
    for (term, kind_weight) in terms {
        if !seen.insert(term.clone()) {
            continue;
        }
        let frequency = (lower.matches(term.as_str()).count() as u32).max(1);
        entries.push(KeywordEntry {
            keyword: term.clone(),
            frequency,
            kind_weight,
            weighted_score: frequency as f32 * kind_weight,
        });
    }
    entries
}

/// Compares resume against JD. `resume` is the candidate's extracted profile
/// with normalised skills.
pub fn compare(
    resume_text: &str,
    resume: &ExtractedProfile,
    jd_text: &str,
    extractor: &dyn InformationExtractor,
) -> Result<JdComparison, EngineError> {
    let jd = extractor.extract(jd_text)?;
    let keywords = keyword_inventory(jd_text, &jd);
    let experience = experience_fit(jd.experience_years, resume.experience_years);

    if keywords.is_empty() {
        return Ok(JdComparison {
            experience,
            recommendation: "No keywords found in the job description; cannot score fit."
                .to_string(),
            ..Default::default()
        });
    }

    let resume_terms: BTreeSet<String> = resume
        .skills
        .iter()
        .chain(&resume.keywords)
        .map(|t| t.trim().to_lowercase())
        .collect();
    let resume_lower = resume_text.to_lowercase();

    let mut strong_matches = Vec::new();
    let mut partial_matches = Vec::new();
    let mut gaps = Vec::new();
    let mut total_weighted = 0.0_f32;
    let mut total_score = 0.0_f32;

    for entry in &keywords {
        total_weighted += entry.weighted_score;
        let (strength, evidence) = best_evidence(&entry.keyword, &resume_terms, &resume_lower);
        total_score += strength * entry.weighted_score;

        let fit_match = FitMatch {
            keyword: entry.keyword.clone(),
            resume_evidence: evidence,
            strength,
        };
        if strength >= STRONG_THRESHOLD {
            strong_matches.push(fit_match);
        } else if strength >= PARTIAL_THRESHOLD {
            partial_matches.push(fit_match);
        } else {
            gaps.push(Gap {
                keyword: entry.keyword.clone(),
                jd_frequency: entry.frequency,
                suggestion: find_closest_term(&resume_terms, &entry.keyword),
            });
        }
    }

    let keyword_score = if total_weighted > 0.0 {
        f64::from(total_score / total_weighted) * 100.0
    } else {
        0.0
    };

    let credit = skill_credit(&resume_terms, keywords.iter().map(|k| &k.keyword));
    let section_scores = section_scores(
        &jd,
        &jd_text.to_lowercase(),
        &resume_terms,
        &resume_lower,
        experience.relevance_percent,
    );
    let section_mean = section_scores.values().sum::<f64>() / section_scores.len() as f64;
    let overall = credit.coverage * KEYWORD_SHARE + section_mean * (1.0 - KEYWORD_SHARE);

    Ok(JdComparison {
        overall_match_percent: round2(overall.clamp(0.0, 100.0)),
        keyword_score: round2(keyword_score),
        keyword_coverage_percent: round2(credit.coverage),
        matched_keywords: credit.matched,
        missing_keywords: credit.missing,
        recommendation: build_recommendation(round2(overall).round() as u32, &gaps),
        strong_matches,
        partial_matches,
        gaps,
        jd_keyword_count: keywords.len(),
        experience,
        section_scores,
    })
}

fn section_scores(
    jd: &ExtractedProfile,
    jd_lower: &str,
    resume_terms: &BTreeSet<String>,
    resume_lower: &str,
    experience_relevance: f64,
) -> BTreeMap<String, f64> {
    let jd_tokens = word_tokens(jd_lower);
    let resume_tokens = word_tokens(resume_lower);

    // A JD without skills is neutral rather than a perfect match.
    let skills = if jd.skills.is_empty() {
        60.0
    } else {
        skill_credit(resume_terms, &jd.skills).coverage
    };
    let education = education_fit(jd_lower, &jd_tokens, resume_lower, &resume_tokens);
    let tools = tools_fit(jd_lower, &jd_tokens, resume_lower, &resume_tokens);

    [
        ("skills", skills),
        ("experience", experience_relevance),
        ("education", education),
        ("tools", tools),
    ]
    .into_iter()
    .map(|(name, score)| (name.to_string(), round2(score.clamp(0.0, 100.0))))
    .collect()
}

/// Lowercase words; dots and `+`/`#` stay inside a word (ph.d, c++).
fn word_tokens(lower: &str) -> HashSet<&str> {
    lower
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | '+' | '#')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .collect()
}

fn mentions(term: &str, lower: &str, tokens: &HashSet<&str>) -> bool {
    if term.contains(' ') {
        lower.contains(term)
    } else {
        tokens.contains(term)
    }
}

fn education_level(lower: &str, tokens: &HashSet<&str>) -> u8 {
    EDUCATION_LEVELS
        .iter()
        .filter(|(term, _)| mentions(term, lower, tokens))
        .map(|(_, level)| *level)
        .max()
        .unwrap_or(0)
}

fn education_fit(
    jd_lower: &str,
    jd_tokens: &HashSet<&str>,
    resume_lower: &str,
    resume_tokens: &HashSet<&str>,
) -> f64 {
    let required = education_level(jd_lower, jd_tokens);
    let held = education_level(resume_lower, resume_tokens);

    let base = match (required, held) {
        (0, 0) => 60.0,
        (0, _) => 80.0,
        (_, 0) => 20.0,
        (r, h) if h >= r => 100.0,
        (r, h) => f64::from(h) / f64::from(r) * 100.0,
    };
    let shared_field = EDUCATION_FIELDS
        .iter()
        .any(|f| jd_lower.contains(f) && resume_lower.contains(f));

    if shared_field {
        (base + FIELD_BONUS).min(100.0)
    } else {
        base
    }
}

fn tools_fit(
    jd_lower: &str,
    jd_tokens: &HashSet<&str>,
    resume_lower: &str,
    resume_tokens: &HashSet<&str>,
) -> f64 {
    let wanted: Vec<&str> = TOOLS
        .iter()
        .copied()
        .filter(|t| mentions(t, jd_lower, jd_tokens))
        .collect();

    if wanted.is_empty() {
        let any_listed = TOOLS.iter().any(|t| mentions(t, resume_lower, resume_tokens));
        return if any_listed { 70.0 } else { 50.0 };
    }
    let held = wanted
        .iter()
        .filter(|t| mentions(t, resume_lower, resume_tokens))
        .count();
    held as f64 / wanted.len() as f64 * 100.0
}

fn best_evidence(
    keyword: &str,
    resume_terms: &BTreeSet<String>,
    resume_lower: &str,
) -> (f32, String) {
    if resume_terms.contains(keyword) {
        return (1.0, keyword.to_string());
    }
    if let Some(term) = resume_terms
        .iter()
        .find(|t| t.contains(keyword) || keyword.contains(t.as_str()))
    {
        return (PARTIAL_CREDIT as f32, term.clone());
    }
    if resume_lower.contains(keyword) {
        return (TEXT_MATCH_STRENGTH, "resume text".to_string());
    }
    (0.0, String::new())
}

/// First resume term that shares a whole word with `keyword`.
fn find_closest_term(resume_terms: &BTreeSet<String>, keyword: &str) -> Option<String> {
    let words: Vec<&str> = keyword.split([' ', '-', '/']).filter(|w| w.len() > 2).collect();
    resume_terms
        .iter()
        .find(|t| t.split([' ', '-', '/']).any(|w| words.contains(&w)))
        .cloned()
}

fn experience_fit(jd_years: u32, resume_years: u32) -> ExperienceFit {
    let relevance = if jd_years == 0 {
        50.0
    } else if resume_years >= jd_years {
        100.0
    } else if resume_years > 0 {
        (f64::from(resume_years) / f64::from(jd_years) * 100.0).max(20.0)
    } else {
        15.0
    };
    ExperienceFit {
        jd_years,
        resume_years,
        relevance_percent: round2(relevance),
    }
}

/// Builds a human-readable recommendation string from score and gaps.
fn build_recommendation(score: u32, gaps: &[Gap]) -> String {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(|g| g.keyword.as_str()).collect();

    if score >= 80 {
        "Strong fit. Your resume directly covers the key requirements of this job.".to_string()
    } else if score >= 60 {
        format!(
            "Moderate fit ({score}/100). Consider highlighting: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low fit ({score}/100). Significant gaps: {}. Tailor your resume before applying.",
            top_gaps.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns the same profile for any text.
    struct FixedExtractor {
        jd: ExtractedProfile,
    }

    impl InformationExtractor for FixedExtractor {
        fn extract(&self, _text: &str) -> Result<ExtractedProfile, EngineError> {
            Ok(self.jd.clone())
        }
    }

    struct BrokenExtractor;

    impl InformationExtractor for BrokenExtractor {
        fn extract(&self, _text: &str) -> Result<ExtractedProfile, EngineError> {
            Err(EngineError::stage("extraction", "matcher unavailable"))
        }
    }

    fn profile(skills: &[&str], keywords: &[&str], years: u32) -> ExtractedProfile {
        ExtractedProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            experience_years: years,
        }
    }

    #[test]
    fn test_inventory_weights_by_kind_and_frequency() {
        let jd = profile(&["rust"], &["distributed systems"], 0);
        let inv = keyword_inventory("Rust, rust and more Rust. Distributed systems.", &jd);
        assert_eq!(inv[0].keyword, "rust");
        assert_eq!(inv[0].frequency, 3);
        assert_eq!(inv[0].weighted_score, 3.0);
        assert_eq!(inv[1].kind_weight, 0.6);
        assert_eq!(inv[1].frequency, 1);
    }

    #[test]
    fn test_exact_terms_score_strong() {
        let extractor = FixedExtractor {
            jd: profile(&["rust", "kafka"], &[], 0),
        };
        let resume = profile(&["rust", "kafka"], &[], 4);
        let report = compare("rust kafka", &resume, "rust kafka", &extractor).unwrap();
        assert_eq!(report.strong_matches.len(), 2);
        assert!(report.gaps.is_empty());
        assert_eq!(report.keyword_score, 100.0);
        assert_eq!(report.keyword_coverage_percent, 100.0);
        // sections: skills 100, experience 50 (no JD years), education 60, tools 50
        assert_eq!(report.section_scores["skills"], 100.0);
        assert_eq!(report.section_scores["education"], 60.0);
        assert_eq!(report.overall_match_percent, 91.25);
    }

    #[test]
    fn test_substring_term_scores_partial() {
        let extractor = FixedExtractor {
            jd: profile(&["react"], &[], 0),
        };
        let resume = profile(&["react native"], &[], 0);
        let report = compare("react native apps", &resume, "react", &extractor).unwrap();
        assert_eq!(report.partial_matches.len(), 1);
        assert_eq!(report.partial_matches[0].resume_evidence, "react native");
        assert!(report.matched_keywords.contains(&"react".to_string()));
    }

    #[test]
    fn test_text_only_mention_is_partial() {
        let extractor = FixedExtractor {
            jd: profile(&["kubernetes"], &[], 0),
        };
        let resume = profile(&[], &[], 0);
        let report =
            compare("deployed to kubernetes daily", &resume, "kubernetes", &extractor).unwrap();
        assert_eq!(report.partial_matches.len(), 1);
        assert_eq!(report.partial_matches[0].strength, 0.6);
    }

    #[test]
    fn test_missing_term_creates_gap_with_suggestion() {
        let extractor = FixedExtractor {
            jd: profile(&["apache kafka"], &[], 5),
        };
        let resume = profile(&["apache spark"], &[], 2);
        let report = compare("spark", &resume, "apache kafka", &extractor).unwrap();
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].suggestion.as_deref(), Some("apache spark"));
        assert_eq!(report.missing_keywords, vec!["apache kafka"]);
        assert_eq!(report.experience.relevance_percent, 40.0);
    }

    #[test]
    fn test_empty_jd_inventory_scores_zero() {
        let extractor = FixedExtractor {
            jd: ExtractedProfile::default(),
        };
        let report = compare("anything", &profile(&["rust"], &[], 1), "", &extractor).unwrap();
        assert_eq!(report.overall_match_percent, 0.0);
        assert!(report.recommendation.contains("No keywords"));
    }

    #[test]
    fn test_sections_cover_education_and_tools() {
        let extractor = FixedExtractor {
            jd: profile(&["python"], &[], 3),
        };
        let resume = profile(&["python"], &[], 5);
        let jd_text = "Python developer, 3+ years. Master's degree in Computer Science. \
                       We use Git, Docker and Jira.";
        let resume_text = "Python engineer. B.Tech in Computer Science. Daily Git and Docker.";
        let report = compare(resume_text, &resume, jd_text, &extractor).unwrap();

        let sections = &report.section_scores;
        assert_eq!(sections.len(), 4);
        assert_eq!(sections["skills"], 100.0);
        assert_eq!(sections["experience"], 100.0);
        // bachelor (3) against master (4), plus the shared field bonus
        assert_eq!(sections["education"], 85.0);
        assert!((sections["tools"] - 66.67).abs() < 1e-9);
        // 0.75 × 100 + 0.25 × mean(100, 100, 85, 66.67)
        assert!((report.overall_match_percent - 96.98).abs() < 1e-9);
    }

    #[test]
    fn test_tool_names_match_whole_words_only() {
        let tokens = word_tokens("we love gitops and dockerfiles");
        assert!(!mentions("git", "we love gitops and dockerfiles", &tokens));
        assert_eq!(
            education_level("ms teams and systems", &word_tokens("ms teams and systems")),
            0
        );
        assert_eq!(education_level("holds a ph.d.", &word_tokens("holds a ph.d.")), 5);
    }

    #[test]
    fn test_extractor_failure_is_propagated() {
        let resume = profile(&["rust"], &[], 1);
        let result = compare("rust", &resume, "rust", &BrokenExtractor);
        assert!(matches!(
            result,
            Err(EngineError::Stage {
                stage: "extraction",
                ..
            })
        ));
    }

    #[test]
    fn test_experience_fit_curve() {
        assert_eq!(experience_fit(0, 3).relevance_percent, 50.0);
        assert_eq!(experience_fit(5, 6).relevance_percent, 100.0);
        assert_eq!(experience_fit(10, 1).relevance_percent, 20.0);
        assert_eq!(experience_fit(4, 0).relevance_percent, 15.0);
    }

    #[test]
    fn test_recommendation_tiers() {
        assert!(build_recommendation(85, &[]).contains("Strong fit"));
        let gaps = vec![Gap {
            keyword: "kafka".to_string(),
            jd_frequency: 3,
            suggestion: None,
        }];
        let moderate = build_recommendation(65, &gaps);
        assert!(moderate.contains("65") && moderate.contains("kafka"));
        assert!(build_recommendation(30, &gaps).contains("Low fit (30/100)"));
    }
}
