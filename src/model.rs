use serde::{Deserialize, Serialize};
use std::fmt;

/// Editorial category of a collected item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    News,
    Cloud,
    /// Vulnerability advisories (GHSA/CVE records).
    Cve,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "News",
            Category::Cloud => "Cloud",
            Category::Cve => "CVE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collected item in the common shape shared by RSS entries and advisories.
/// Lives only for the duration of a single run; identity within the run is
/// `fingerprint(title, url)`.
#[derive(Debug, Clone)]
pub struct NormalizedItem {
    pub title: String,
    pub url: String,
    pub content: String,
    /// RFC 3339 publish timestamp.
    pub published: String,
    /// Human-readable feed name, e.g. "Krebs on Security".
    pub source: String,
    pub category: Category,
    /// Severity label, only set for advisory-sourced items.
    pub severity: Option<String>,
}

/// Structured summary decoded from the LLM completion.
///
/// `what` is mandatory; everything else is optional and gets defaulted at
/// publish time. A completion that does not decode into this shape is treated
/// as a failed summarization attempt, never as a partial result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub what: String,
    pub why_it_matters_security: Option<String>,
    pub why_it_matters_grc: Option<String>,
    pub why_it_matters_privacy: Option<String>,
    pub estimated_read_time: Option<String>,
    pub for_security_engineer: Option<bool>,
    pub for_grc: Option<bool>,
    pub for_data_privacy: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub region: Option<Vec<String>>,
}

/// Truncate a string to at most `max_chars` characters, respecting char
/// boundaries. Used for titles, prompt content and page bodies.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
