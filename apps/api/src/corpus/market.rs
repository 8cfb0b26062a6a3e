//! Market-demand signal per skill, read from `skills_market.json`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extraction::SkillNormalizer;

/// Demand signal for one skill. `demand_score` and `global_trend` are 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillDemand {
    pub demand_score: f64,
    pub global_trend: f64,
    pub is_emerging: bool,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    #[serde(default)]
    skills: Vec<RawSkillRow>,
}

#[derive(Debug, Deserialize)]
struct RawSkillRow {
    skill_name: String,
    #[serde(default)]
    demand_score: f64,
    #[serde(default)]
    global_trend_score: f64,
    #[serde(default)]
    is_emerging: bool,
}

/// Lowercased skill name → demand signal.
#[derive(Debug, Clone, Default)]
pub struct SkillMarket {
    skills: HashMap<String, SkillDemand>,
}

impl SkillMarket {
    /// Loads the market table. A missing or unreadable file yields an empty market.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                warn!(
                    "Could not read {}; industry alignment will use an empty market",
                    path.display()
                );
                return Self::default();
            }
        };
        match Self::from_json(&raw) {
            Ok(market) => {
                info!("Loaded {} unique market skills", market.len());
                market
            }
            Err(e) => {
                warn!("Invalid market file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Parses the market document. Names are keyed by their canonical skill form;
    /// rows sharing a name collapse to the median demand/trend and the majority
    /// emerging flag.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: RawMarket = serde_json::from_str(raw)?;
        let normalizer = SkillNormalizer::new();

        let mut grouped: HashMap<String, Vec<RawSkillRow>> = HashMap::new();
        for row in parsed.skills {
            let key = normalizer.normalize_one(&row.skill_name);
            if key.is_empty() {
                continue;
            }
            grouped.entry(key).or_default().push(row);
        }

        let skills = grouped
            .into_iter()
            .map(|(name, rows)| {
                let demand = median(rows.iter().map(|r| r.demand_score).collect());
                let trend = median(rows.iter().map(|r| r.global_trend_score).collect());
                let emerging = rows.iter().filter(|r| r.is_emerging).count();
                let demand = SkillDemand {
                    demand_score: demand.clamp(0.0, 100.0),
                    global_trend: trend.clamp(0.0, 100.0),
                    is_emerging: emerging * 2 > rows.len(),
                };
                (name, demand)
            })
            .collect();

        Ok(Self { skills })
    }

    #[cfg(test)]
    pub fn from_entries(entries: impl IntoIterator<Item = (String, SkillDemand)>) -> Self {
        Self {
            skills: entries
                .into_iter()
                .map(|(name, demand)| (name.trim().to_lowercase(), demand))
                .collect(),
        }
    }

    pub fn get(&self, skill: &str) -> Option<&SkillDemand> {
        self.skills.get(&skill.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SkillDemand)> {
        self.skills.iter()
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    values.retain(|v| v.is_finite());
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rows_collapse_to_median() {
        let market = SkillMarket::from_json(
            r#"{"skills": [
                {"skill_name": "Python", "demand_score": 90, "global_trend_score": 10, "is_emerging": false},
                {"skill_name": "python ", "demand_score": 40, "global_trend_score": 30, "is_emerging": true},
                {"skill_name": "PYTHON", "demand_score": 60, "global_trend_score": 20, "is_emerging": true}
            ]}"#,
        )
        .unwrap();

        let python = market.get("python").unwrap();
        assert_eq!(python.demand_score, 60.0);
        assert_eq!(python.global_trend, 20.0);
        assert!(python.is_emerging, "2 of 3 rows are emerging");
        assert_eq!(market.len(), 1);
    }

    #[test]
    fn test_synonym_rows_share_canonical_key() {
        let market = SkillMarket::from_json(
            r#"{"skills": [
                {"skill_name": "spark", "demand_score": 80, "global_trend_score": 10, "is_emerging": false},
                {"skill_name": "PySpark", "demand_score": 60, "global_trend_score": 30, "is_emerging": false}
            ]}"#,
        )
        .unwrap();

        assert_eq!(market.len(), 1);
        assert!(market.get("spark").is_none());
        assert_eq!(market.get("apache spark").unwrap().demand_score, 70.0);
    }

    #[test]
    fn test_demand_is_clamped_to_0_100() {
        let market = SkillMarket::from_json(
            r#"{"skills": [{"skill_name": "rust", "demand_score": 250}]}"#,
        )
        .unwrap();
        assert_eq!(market.get("Rust").unwrap().demand_score, 100.0);
    }

    #[test]
    fn test_missing_file_yields_empty_market() {
        let market = SkillMarket::load(Path::new("/definitely/not/here.json"));
        assert!(market.is_empty());
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(vec![1.0, 3.0, 2.0, 4.0]), 2.5);
        assert_eq!(median(vec![]), 0.0);
    }
}
