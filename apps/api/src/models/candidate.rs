use serde::{Deserialize, Serialize};

/// What the pipeline knows about the candidate after extraction and normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Canonical skill names, sorted.
    pub skills: Vec<String>,
    pub keywords: Vec<String>,
    pub experience_years: u32,
    pub skill_count: usize,
    pub token_count: usize,
}

impl CandidateProfile {
    pub fn new(skills: Vec<String>, keywords: Vec<String>, experience_years: u32) -> Self {
        Self {
            skill_count: skills.len(),
            skills,
            keywords,
            experience_years,
            token_count: 0,
        }
    }

    pub fn with_token_count(mut self, token_count: usize) -> Self {
        self.token_count = token_count;
        self
    }
}
