//! Skill normalization: maps abbreviations and spelling variants to one canonical name.

use std::collections::{BTreeSet, HashMap};

const SYNONYMS: &[(&str, &str)] = &[
    // languages
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("python 3", "python"),
    ("golang", "go"),
    ("go lang", "go"),
    ("c sharp", "c#"),
    ("csharp", "c#"),
    ("cpp", "c++"),
    ("c plus plus", "c++"),
    ("obj-c", "objective-c"),
    ("objective c", "objective-c"),
    // frontend
    ("reactjs", "react"),
    ("react js", "react"),
    ("react.js", "react"),
    ("nextjs", "next.js"),
    ("next js", "next.js"),
    ("vue", "vue.js"),
    ("vuejs", "vue.js"),
    ("angularjs", "angular"),
    ("angular js", "angular"),
    ("html5", "html"),
    ("css3", "css"),
    ("tailwind", "tailwind css"),
    ("sass", "scss"),
    // backend
    ("node", "node.js"),
    ("nodejs", "node.js"),
    ("node js", "node.js"),
    ("express", "express.js"),
    ("expressjs", "express.js"),
    ("fast api", "fastapi"),
    ("drf", "django rest framework"),
    ("springboot", "spring boot"),
    ("spring-boot", "spring boot"),
    ("dotnet", ".net"),
    ("dot net", ".net"),
    (".net core", ".net"),
    ("rails", "ruby on rails"),
    ("ror", "ruby on rails"),
    // databases
    ("mongo", "mongodb"),
    ("postgres", "postgresql"),
    ("psql", "postgresql"),
    ("mssql", "sql server"),
    ("ms sql", "sql server"),
    ("elastic search", "elasticsearch"),
    ("dynamo db", "dynamodb"),
    // cloud and devops
    ("amazon web services", "aws"),
    ("gcp", "google cloud platform"),
    ("google cloud", "google cloud platform"),
    ("microsoft azure", "azure"),
    ("k8s", "kubernetes"),
    ("kube", "kubernetes"),
    ("ci cd", "ci/cd"),
    ("cicd", "ci/cd"),
    ("argo cd", "argocd"),
    // ai, ml and data
    ("ml", "machine learning"),
    ("dl", "deep learning"),
    ("nlp", "natural language processing"),
    ("cv", "computer vision"),
    ("ai", "artificial intelligence"),
    ("genai", "generative ai"),
    ("gen ai", "generative ai"),
    ("llm", "large language models"),
    ("llms", "large language models"),
    ("tf", "tensorflow"),
    ("sklearn", "scikit-learn"),
    ("scikit learn", "scikit-learn"),
    ("huggingface", "hugging face"),
    ("open cv", "opencv"),
    ("wandb", "weights & biases"),
    ("spark", "apache spark"),
    ("pyspark", "apache spark"),
    ("kafka", "apache kafka"),
    ("airflow", "apache airflow"),
    ("redshift", "aws redshift"),
    ("big query", "bigquery"),
    // tools and practices
    ("vscode", "visual studio code"),
    ("vs code", "visual studio code"),
    ("ubuntu", "linux"),
    ("rest", "rest api"),
    ("restful", "rest api"),
    ("websocket", "websockets"),
    ("json web token", "jwt"),
    ("solid", "solid principles"),
    ("micro services", "microservices"),
    ("powerbi", "power bi"),
    ("rn", "react native"),
    ("team work", "teamwork"),
    ("pm", "project management"),
    ("public speaking", "presentation skills"),
];

/// Synonym → canonical lookup. Unknown skills pass through case-folded and trimmed.
#[derive(Debug, Clone)]
pub struct SkillNormalizer {
    synonyms: HashMap<&'static str, &'static str>,
}

impl Default for SkillNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillNormalizer {
    pub fn new() -> Self {
        Self {
            synonyms: SYNONYMS.iter().copied().collect(),
        }
    }

    pub fn normalize_one(&self, skill: &str) -> String {
        let key = skill.trim().to_lowercase();
        match self.synonyms.get(key.as_str()) {
            Some(canonical) => canonical.to_string(),
            None => key,
        }
    }

    /// Canonical, deduplicated, sorted skill list.
    pub fn normalize(&self, skills: &[String]) -> Vec<String> {
        skills
            .iter()
            .map(|s| self.normalize_one(s))
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
