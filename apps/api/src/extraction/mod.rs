//! Text extraction and preprocessing for uploaded resumes.
//!
//! `extract_text` is CPU-bound (PDF parsing) and must be called from
//! `tokio::task::spawn_blocking` in async code.

pub mod normalize;
pub mod profile;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{info, warn};

use crate::errors::EngineError;

pub use normalize::SkillNormalizer;
pub use profile::{ExtractedProfile, InformationExtractor, ProfileExtractor};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "you", "your", "yours", "yourself", "yourselves",
];

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Extracts plain text from a `.pdf`, `.txt` or `.md` upload.
pub fn extract_text(filename: &str, data: &[u8]) -> Result<String, EngineError> {
    let ext = extension_of(filename).unwrap_or_default();

    let text = match ext.as_str() {
        "pdf" => extract_pdf(data)?,
        "txt" | "md" => String::from_utf8_lossy(data).into_owned(),
        _ => {
            return Err(EngineError::UnsupportedFormat(format!(
                "{filename}. Supported: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            )))
        }
    };

    info!("Extracted {} chars from {}", text.len(), filename);
    if text.trim().is_empty() {
        warn!("{} produced empty text; file may be scanned or image-only", filename);
    }
    Ok(text)
}

fn extract_pdf(data: &[u8]) -> Result<String, EngineError> {
    // pdf-extract panics on some malformed documents.
    let result = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data)));
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(EngineError::Extraction(format!("PDF parsing failed: {e}"))),
        Err(_) => Err(EngineError::Extraction(
            "PDF parser aborted on a malformed document".to_string(),
        )),
    }
}

/// Lowercases, strips everything but ASCII letters, digits and whitespace,
/// and collapses runs of whitespace.
pub fn clean(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokens longer than one character that are not English stopwords.
pub fn token_count(text: &str) -> usize {
    clean(text)
        .split(' ')
        .filter(|t| t.len() > 1 && !STOPWORDS.contains(t))
        .count()
}
