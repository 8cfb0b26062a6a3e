//! Role Corpus: the immutable catalog of job roles the index and scorers read from.
//!
//! Loaded once at startup from `roles_database.json`. Roles are referenced by
//! position (index ↔ role) and by case-insensitive name everywhere else.

pub mod market;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::EngineError;
use crate::extraction::SkillNormalizer;

pub use market::{SkillDemand, SkillMarket};

pub const ROLES_FILE: &str = "roles_database.json";
pub const MARKET_FILE: &str = "skills_market.json";

/// One job role. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub category: String,
    pub level: String,
    pub domain: String,
    pub industry: String,
    pub description: String,
    pub education: String,
    pub min_experience: u32,
    pub max_experience: u32,
}

/// Skill and keyword lists that accompany a role in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub keywords: Vec<String>,
    pub default_jd: String,
}

impl RoleProfile {
    /// Required + preferred skills, deduplicated with first-seen order kept.
    pub fn skills(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for skill in self.required_skills.iter().chain(&self.preferred_skills) {
            if !out.iter().any(|s| s == skill) {
                out.push(skill.clone());
            }
        }
        out
    }
}

/// Summary row for role listings.
#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub role_name: String,
    pub category: String,
    pub domain: String,
    pub level: String,
}

// ────────────────────────────────────────────────────────────────────────────
// On-disk catalog format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    roles: BTreeMap<String, RawRole>,
}

#[derive(Debug, Deserialize)]
struct RawRole {
    role_name: String,
    #[serde(default = "general")]
    category: String,
    #[serde(default = "mid")]
    level: String,
    #[serde(default = "general")]
    domain: String,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    education: String,
    #[serde(default)]
    min_experience: f64,
    #[serde(default)]
    max_experience: f64,
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    preferred_skills: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    default_jd: String,
}

fn general() -> String {
    "General".to_string()
}

fn mid() -> String {
    "Mid".to_string()
}

impl RawRole {
    /// Skill names are mapped to the same canonical forms resumes are normalized to.
    fn into_parts(self, id: String, normalizer: &SkillNormalizer) -> (Role, RoleProfile) {
        let min_experience = clamp_years(self.min_experience);
        let max_experience = match clamp_years(self.max_experience) {
            0 => min_experience * 2,
            max => max.max(min_experience),
        };
        let industry = self.industry.unwrap_or_else(|| self.domain.clone());
        let role = Role {
            id,
            name: self.role_name.trim().to_string(),
            category: self.category,
            level: self.level,
            domain: self.domain,
            industry,
            description: self.description,
            education: self.education,
            min_experience,
            max_experience,
        };
        let profile = RoleProfile {
            required_skills: canonical_skills(&self.required_skills, normalizer),
            preferred_skills: canonical_skills(&self.preferred_skills, normalizer),
            keywords: self.keywords,
            default_jd: self.default_jd,
        };
        (role, profile)
    }
}

/// Canonical names with first-seen order kept.
fn canonical_skills(skills: &[String], normalizer: &SkillNormalizer) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let canonical = normalizer.normalize_one(skill);
        if !canonical.is_empty() && !out.contains(&canonical) {
            out.push(canonical);
        }
    }
    out
}

fn clamp_years(value: f64) -> u32 {
    if value.is_finite() {
        value.max(0.0).round() as u32
    } else {
        0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RoleCorpus
// ────────────────────────────────────────────────────────────────────────────

/// Roles and their profiles as parallel vectors, plus the market-demand table.
#[derive(Debug, Clone, Default)]
pub struct RoleCorpus {
    roles: Vec<Role>,
    profiles: Vec<RoleProfile>,
    market: SkillMarket,
}

impl RoleCorpus {
    /// Loads `roles_database.json` (required) and `skills_market.json` (optional)
    /// from `datasets_dir`.
    pub fn load(datasets_dir: &Path) -> Result<Self, EngineError> {
        let roles_path = datasets_dir.join(ROLES_FILE);
        if !roles_path.exists() {
            return Err(EngineError::Configuration(format!(
                "No role dataset found. Expected {}",
                roles_path.display()
            )));
        }

        let raw = std::fs::read_to_string(&roles_path).map_err(|e| {
            EngineError::Configuration(format!("Cannot read {}: {e}", roles_path.display()))
        })?;
        let mut corpus = Self::from_json(&raw)?;
        info!("Loaded {} roles from {}", corpus.len(), roles_path.display());

        let market_path = datasets_dir.join(MARKET_FILE);
        corpus.market = SkillMarket::load(&market_path);

        Ok(corpus)
    }

    /// Parses a catalog document. Fails if it is malformed or holds no roles.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let catalog: RawCatalog = serde_json::from_str(raw)
            .map_err(|e| EngineError::Configuration(format!("Invalid role catalog: {e}")))?;

        let normalizer = SkillNormalizer::new();
        let (roles, profiles): (Vec<_>, Vec<_>) = catalog
            .roles
            .into_iter()
            .filter(|(_, raw)| !raw.role_name.trim().is_empty())
            .map(|(id, raw)| raw.into_parts(id, &normalizer))
            .unzip();

        if roles.is_empty() {
            return Err(EngineError::Configuration(
                "Role dataset contains no usable rows".to_string(),
            ));
        }

        Ok(Self {
            roles,
            profiles,
            market: SkillMarket::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn role(&self, position: usize) -> Option<&Role> {
        self.roles.get(position)
    }

    pub fn profile(&self, position: usize) -> Option<&RoleProfile> {
        self.profiles.get(position)
    }

    pub fn market(&self) -> &SkillMarket {
        &self.market
    }

    /// Case-insensitive lookup of a role's position by display name.
    pub fn position_of(&self, role_name: &str) -> Option<usize> {
        let needle = role_name.trim().to_lowercase();
        self.roles
            .iter()
            .position(|r| r.name.to_lowercase() == needle)
    }

    pub fn find_by_name(&self, role_name: &str) -> Option<&Role> {
        self.position_of(role_name).and_then(|p| self.role(p))
    }

    /// Required + preferred skills for a role, or empty if the role is unknown.
    pub fn role_skills(&self, role_name: &str) -> Vec<String> {
        self.position_of(role_name)
            .and_then(|p| self.profile(p))
            .map(RoleProfile::skills)
            .unwrap_or_default()
    }

    pub fn default_jd(&self, role_name: &str) -> String {
        self.position_of(role_name)
            .and_then(|p| self.profile(p))
            .map(|p| p.default_jd.clone())
            .unwrap_or_default()
    }

    /// Every skill mentioned anywhere in the catalog, lowercased.
    pub fn skill_vocabulary(&self) -> Vec<String> {
        let mut skills: Vec<String> = self
            .profiles
            .iter()
            .flat_map(|p| p.required_skills.iter().chain(&p.preferred_skills))
            .map(|s| s.trim().to_lowercase())
            .filter(|s| s.len() > 1)
            .collect();
        skills.sort();
        skills.dedup();
        skills
    }

    /// Listing rows sorted by (category, role_name).
    pub fn summaries(&self) -> Vec<RoleSummary> {
        let mut rows: Vec<RoleSummary> = self
            .roles
            .iter()
            .map(|r| RoleSummary {
                role_name: r.name.clone(),
                category: r.category.clone(),
                domain: r.domain.clone(),
                level: r.level.clone(),
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.category.as_str(), a.role_name.as_str())
                .cmp(&(b.category.as_str(), b.role_name.as_str()))
        });
        rows
    }
}

/// Skill list used when the catalog has nothing for the target role.
pub fn fallback_skills(role_name: &str) -> Vec<String> {
    let skills: &[&str] = match role_name.trim().to_lowercase().as_str() {
        "software engineer" => &[
            "python", "java", "javascript", "sql", "git", "docker", "rest api",
            "data structures", "algorithms", "linux", "agile",
        ],
        "backend developer" => &[
            "python", "node.js", "sql", "postgresql", "docker", "rest api", "redis", "git",
            "linux", "microservices",
        ],
        "frontend developer" => &[
            "javascript", "typescript", "react", "html", "css", "git", "responsive design",
            "webpack", "testing",
        ],
        "devops engineer" => &[
            "docker", "kubernetes", "aws", "terraform", "linux", "ci/cd", "git", "python",
            "ansible", "monitoring",
        ],
        "ml engineer" => &[
            "python", "tensorflow", "pytorch", "scikit-learn", "docker", "mlflow", "sql",
            "deep learning",
        ],
        "data analyst" => &[
            "sql", "python", "excel", "tableau", "power bi", "pandas", "statistics",
            "data visualization",
        ],
        _ => &["python", "sql", "git", "docker", "communication"],
    };
    skills.iter().map(|s| s.to_string()).collect()
}
