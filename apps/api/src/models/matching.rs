use serde::{Deserialize, Serialize};

/// The four re-ranking signals, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub semantic: f64,
    pub skills: f64,
    pub experience: f64,
    pub keywords: f64,
}

/// One ranked role for a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub role_id: String,
    pub role_name: String,
    pub role_category: String,
    pub role_level: String,
    pub domain: String,
    /// 1-based, contiguous.
    pub rank: usize,
    /// Hybrid score in [0, 1].
    pub score: f64,
    pub breakdown: MatchBreakdown,
}

/// Output of the Hybrid Matching Engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub top_roles: Vec<MatchResult>,
    pub embedding_dim: usize,
    pub roles_searched: usize,
    pub matching_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            matching_method: "none".to_string(),
            error: Some(message.into()),
            ..Default::default()
        }
    }
}
