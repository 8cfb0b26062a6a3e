//! Information extraction: skills, domain keywords and years of experience
//! found in the resume text itself.
//!
//! Skill vocabulary = built-in list + every skill named in the role catalog.
//! Matching is boundary-aware:
//! - skills containing `+ # .` (c++, c#, node.js) match literally
//! - multi-word skills treat space, `-` and `/` as interchangeable
//! - single-word skills are intersected with the text's tokens

use std::collections::{BTreeSet, HashSet};

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// What the pipeline needs from an information extractor.
///
/// Carried by the pipeline as `Arc<dyn InformationExtractor>`.
pub trait InformationExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<ExtractedProfile, EngineError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    /// Sorted, lowercased.
    pub skills: Vec<String>,
    /// Sorted, lowercased.
    pub keywords: Vec<String>,
    pub experience_years: u32,
}

const BUILTIN_SKILLS: &[&str] = &[
    // languages
    "python", "java", "javascript", "typescript", "c++", "c#", "go", "golang", "rust", "ruby",
    "php", "swift", "kotlin", "scala", "perl", "lua", "dart", "elixir", "haskell", "clojure",
    "objective-c", "matlab", "bash", "shell", "powershell", "sql", "plsql", "t-sql",
    // frontend
    "react", "angular", "vue", "vue.js", "svelte", "next.js", "html", "css", "sass", "scss",
    "tailwind css", "tailwind", "bootstrap", "jquery", "webpack", "vite", "babel", "redux",
    // backend
    "node.js", "express", "express.js", "fastapi", "flask", "django", "spring boot", "spring",
    ".net", "asp.net", "ruby on rails", "rails", "laravel", "nestjs", "graphql", "grpc",
    "rest api", "restful", "websockets", "actix", "axum", "tokio",
    // databases
    "postgresql", "mysql", "mongodb", "redis", "elasticsearch", "cassandra", "sqlite",
    "mariadb", "oracle", "sql server", "dynamodb", "neo4j", "firebase", "supabase",
    // cloud
    "aws", "azure", "gcp", "google cloud", "heroku", "vercel", "cloudflare", "aws lambda",
    "ec2", "s3", "sagemaker", "bigquery",
    // devops
    "docker", "kubernetes", "k8s", "terraform", "ansible", "puppet", "chef", "jenkins",
    "github actions", "gitlab ci", "circleci", "argocd", "helm", "nginx", "ci/cd", "linux",
    "unix", "prometheus", "grafana", "datadog", "splunk",
    // ai, ml and data
    "machine learning", "deep learning", "natural language processing", "nlp",
    "computer vision", "generative ai", "large language models", "tensorflow", "pytorch",
    "keras", "scikit-learn", "sklearn", "xgboost", "lightgbm", "hugging face", "transformers",
    "langchain", "opencv", "spacy", "nltk", "pandas", "numpy", "scipy", "matplotlib",
    "seaborn", "plotly", "mlflow", "faiss", "jupyter", "neural networks",
    "reinforcement learning", "feature engineering", "apache spark", "spark", "pyspark",
    "kafka", "apache kafka", "airflow", "hadoop", "dbt", "snowflake", "redshift",
    "databricks", "etl", "data pipeline", "data warehouse", "data modeling",
    // testing
    "selenium", "cypress", "playwright", "jest", "pytest", "junit", "mocha",
    "unit testing", "integration testing", "tdd", "bdd", "test automation",
    // mobile
    "react native", "flutter", "swiftui", "jetpack compose", "ios", "android",
    // tools
    "git", "github", "gitlab", "bitbucket", "jira", "confluence", "figma", "postman",
    "swagger", "npm", "yarn", "maven", "gradle",
    // practices
    "agile", "scrum", "kanban", "devops", "sre", "oop", "functional programming",
    "microservices", "serverless", "event-driven", "domain-driven design",
    "system design", "distributed systems", "api design", "data structures", "algorithms",
    // security
    "oauth", "jwt", "owasp", "penetration testing", "encryption",
    // analytics
    "power bi", "tableau", "looker", "excel", "google analytics", "statistics",
    "data visualization", "a/b testing",
    // soft skills
    "communication", "leadership", "teamwork", "problem solving", "project management",
    "stakeholder management", "collaboration",
];

/// Generic terms that appear in role catalogs but are not skills on their own.
const SKILL_BLACKLIST: &[&str] = &[
    "deployment", "testing", "teams", "production", "delivery", "operations", "planning",
    "quality", "performance", "security", "compliance", "monitoring", "reporting",
    "research", "execution", "integration", "migration", "automation", "innovation",
    "lifecycle", "governance", "reliability", "standards", "insights", "portfolio", "hiring",
    "mentoring", "velocity", "roadmap", "budgeting", "metrics", "kpis", "timeline",
    "stability", "efficiency", "safety", "sprint planning", "design patterns",
];

const DOMAIN_KEYWORDS: &[&str] = &[
    "full-stack", "front-end", "frontend", "back-end", "backend", "devops", "sre",
    "cloud native", "cloud computing", "serverless", "machine learning", "deep learning",
    "natural language processing", "computer vision", "data science", "data engineering",
    "data analytics", "big data", "data mining", "data pipeline", "predictive modeling",
    "recommendation systems", "generative ai", "large language models", "prompt engineering",
    "microservices", "distributed systems", "event-driven architecture",
    "domain-driven design", "system design", "high availability", "scalability",
    "load balancing", "caching", "api design", "agile", "scrum", "tdd", "code review",
    "continuous integration", "continuous deployment", "ci/cd", "infrastructure as code",
    "incident management", "cybersecurity", "information security", "threat modeling",
    "blockchain", "iot", "embedded systems", "game development", "mobile development",
    "ecommerce", "fintech", "real-time", "streaming", "batch processing", "etl",
    "data warehouse", "version control",
];

const JOB_CONTEXT_WORDS: &[&str] = &[
    "intern", "engineer", "developer", "analyst", "manager", "specialist", "consultant",
    "coordinator", "assistant", "lead", "architect", "designer", "administrator",
    "scientist", "technician", "officer", "executive",
];

const MAX_EXPLICIT_YEARS: u32 = 50;
const EARLIEST_WORK_YEAR: i32 = 1980;
const CONTEXT_WINDOW: usize = 200;

const EXPERIENCE_HEADERS: &[&str] = &[
    r"(?im)^\s*(?:professional\s+)?(?:work\s+)?experience",
    r"(?im)^\s*employment\s+(?:history|record)",
    r"(?im)^\s*work\s+history",
    r"(?im)^\s*career\s+(?:history|summary)",
];

const SECTION_END_HEADERS: &[&str] = &[
    r"(?im)^\s*education",
    r"(?im)^\s*(?:academic\s+)?projects?",
    r"(?im)^\s*certifications?",
    r"(?im)^\s*publications?",
    r"(?im)^\s*courses?",
    r"(?im)^\s*training",
    r"(?im)^\s*(?:technical\s+)?skills?",
    r"(?im)^\s*(?:extra[\s-]?curricular|activities)",
    r"(?im)^\s*(?:references?|awards?|honors?|achievements?)",
    r"(?im)^\s*(?:summary|objective|profile)",
];

const MONTH: &str = r"(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s*)?";

/// Regex-driven extractor over the built-in and catalog vocabularies.
#[derive(Debug, Clone)]
pub struct ProfileExtractor {
    literal_skills: Vec<(String, Regex)>,
    phrase_skills: Vec<(String, Regex)>,
    word_skills: HashSet<String>,
    keywords: Vec<(String, Regex)>,
    token: Regex,
    explicit_years: Vec<Regex>,
    experience_headers: Vec<Regex>,
    section_end_headers: Vec<Regex>,
    date_range: Regex,
    current_year: i32,
}

impl ProfileExtractor {
    /// Compiles the matchers. `extra_vocabulary` is usually
    /// `RoleCorpus::skill_vocabulary()`.
    pub fn new(extra_vocabulary: &[String]) -> Result<Self, EngineError> {
        let vocabulary: BTreeSet<String> = BUILTIN_SKILLS
            .iter()
            .map(|s| s.to_string())
            .chain(extra_vocabulary.iter().map(|s| s.trim().to_lowercase()))
            .filter(|s| s.chars().count() > 1)
            .collect();

        let mut literal_skills = Vec::new();
        let mut phrase_skills = Vec::new();
        let mut word_skills = HashSet::new();

        for skill in vocabulary {
            if skill.contains(['+', '#', '.']) {
                let re = compile(&bounded(&regex::escape(&skill)))?;
                literal_skills.push((skill, re));
            } else if skill.contains([' ', '-', '/']) {
                let re = compile(&bounded(&flexible(&skill)))?;
                phrase_skills.push((skill, re));
            } else {
                word_skills.insert(skill);
            }
        }

        let keywords = DOMAIN_KEYWORDS
            .iter()
            .map(|kw| -> Result<(String, Regex), EngineError> {
                Ok((kw.to_string(), compile(&bounded(&flexible(kw)))?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            literal_skills,
            phrase_skills,
            word_skills,
            keywords,
            token: compile(r"\b[a-z][a-z0-9+#.]+\b")?,
            explicit_years: vec![
                compile(r"(\d{1,2})\+?\s*(?:years?|yrs?)")?,
                compile(r"(?:experience|exp)\s*[:\-]?\s*(\d{1,2})\+?\s*(?:years?|yrs?)?")?,
            ],
            experience_headers: compile_all(EXPERIENCE_HEADERS)?,
            section_end_headers: compile_all(SECTION_END_HEADERS)?,
            date_range: compile(&format!(
                r"(?i){MONTH}((?:19|20)\d{{2}})\s*(?:–|—|-|to)\s*{MONTH}((?:19|20)\d{{2}}|present|current|now|ongoing)"
            ))?,
            current_year: chrono::Utc::now().year(),
        })
    }

    /// Pins "present" in date ranges to a fixed year.
    #[cfg(test)]
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn skill_count(&self) -> usize {
        self.literal_skills.len() + self.phrase_skills.len() + self.word_skills.len()
    }

    fn skills(&self, lower: &str) -> Vec<String> {
        let mut found: BTreeSet<String> = BTreeSet::new();

        for (skill, re) in self.literal_skills.iter().chain(&self.phrase_skills) {
            if re.is_match(lower) {
                found.insert(skill.clone());
            }
        }
        for m in self.token.find_iter(lower) {
            let token = m.as_str().trim_end_matches('.');
            if self.word_skills.contains(token) {
                found.insert(token.to_string());
            }
        }

        found
            .into_iter()
            .filter(|s| !SKILL_BLACKLIST.contains(&s.as_str()))
            .collect()
    }

    fn keywords(&self, lower: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|(_, re)| re.is_match(lower))
            .map(|(kw, _)| kw.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// max(explicit "N years" mentions, merged date ranges in the experience section)
    pub fn experience_years(&self, text: &str) -> u32 {
        let lower = text.to_lowercase();

        let explicit = self
            .explicit_years
            .iter()
            .flat_map(|re| re.captures_iter(&lower))
            .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
            .filter(|y| *y <= MAX_EXPLICIT_YEARS)
            .max()
            .unwrap_or(0);

        let section = self.experience_section(&lower);
        let implied = merged_span(&self.work_ranges(section));

        explicit.max(implied)
    }

    /// Text between the first experience header and the next section header.
    fn experience_section<'t>(&self, lower: &'t str) -> &'t str {
        let Some(start) = self
            .experience_headers
            .iter()
            .find_map(|re| re.find(lower))
            .map(|m| m.end())
        else {
            return "";
        };

        let rest = &lower[start..];
        let end = self
            .section_end_headers
            .iter()
            .filter_map(|re| re.find(rest))
            .map(|m| m.start())
            .min()
            .unwrap_or(rest.len());
        &rest[..end]
    }

    fn work_ranges(&self, section: &str) -> Vec<(i32, i32)> {
        let mut ranges = Vec::new();

        for caps in self.date_range.captures_iter(section) {
            let (Some(whole), Some(start_m), Some(end_m)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let Ok(start) = start_m.as_str().parse::<i32>() else {
                continue;
            };
            let end = match end_m.as_str().to_lowercase().as_str() {
                "present" | "current" | "now" | "ongoing" => self.current_year,
                year => match year.parse::<i32>() {
                    Ok(y) => y,
                    Err(_) => continue,
                },
            };
            if !(EARLIEST_WORK_YEAR <= start && start <= end && end <= self.current_year) {
                continue;
            }

            let span = end - start;
            let context = window(section, whole.start(), whole.end(), CONTEXT_WINDOW);
            let has_job_word = JOB_CONTEXT_WORDS.iter().any(|w| context.contains(w));
            let is_recent = end >= self.current_year - 3;

            let accepted = if start >= 2020 {
                // early-career: only short recent stints
                span <= 6
            } else {
                span <= 10 && (has_job_word || is_recent)
            };
            if accepted {
                ranges.push((start, end));
            }
        }

        ranges
    }
}

impl InformationExtractor for ProfileExtractor {
    fn extract(&self, text: &str) -> Result<ExtractedProfile, EngineError> {
        let lower = text.to_lowercase();
        Ok(ExtractedProfile {
            skills: self.skills(&lower),
            keywords: self.keywords(&lower),
            experience_years: self.experience_years(text),
        })
    }
}

/// Total years covered by `ranges` after merging overlaps.
fn merged_span(ranges: &[(i32, i32)]) -> u32 {
    let mut sorted = ranges.to_vec();
    sorted.sort_unstable();

    let mut merged: Vec<(i32, i32)> = Vec::new();
    for (start, end) in sorted {
        match merged.last_mut() {
            Some(last) if last.1 >= start => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
        .iter()
        .map(|(s, e)| (e - s).max(0) as u32)
        .sum()
}

/// `text[start - radius .. end + radius]`, widened to char boundaries.
fn window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let mut lo = start.saturating_sub(radius);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + radius).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

/// Wraps a pattern so it cannot start or end inside a word.
fn bounded(pattern: &str) -> String {
    format!(r"(?:^|[^a-z])(?:{pattern})(?:$|[^a-z])")
}

/// Escapes `phrase`, making space, `-` and `/` interchangeable separators.
fn flexible(phrase: &str) -> String {
    let mut out = String::new();
    for c in phrase.chars() {
        match c {
            ' ' => out.push_str(r"[\s/\-]+"),
            '-' | '/' => out.push_str(r"[\s/\-]"),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}

fn compile(pattern: &str) -> Result<Regex, EngineError> {
    Regex::new(pattern)
        .map_err(|e| EngineError::Configuration(format!("Invalid extraction pattern: {e}")))
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>, EngineError> {
    patterns.iter().map(|p| compile(p)).collect()
}
