use tracing::{error, info, warn};

use crate::llm::{extract_json, CompletionClient};
use crate::model::{truncate_chars, NormalizedItem, SummaryResult};

const SYSTEM_PERSONA: &str = "You are a cybersecurity and AI governance expert. Provide detailed, \
     actionable insights for security professionals, GRC teams, and data privacy officers.";

/// How much item content goes into the prompt. Feeds occasionally ship whole
/// articles in the description field.
const MAX_PROMPT_CONTENT_CHARS: usize = 2000;

/// Persona-targeted summarization with linear fallback across a model list.
pub struct Summarizer {
    client: Box<dyn CompletionClient>,
    models: Vec<String>,
    temperature: f32,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(
        client: Box<dyn CompletionClient>,
        models: Vec<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            models,
            temperature,
            max_tokens,
        }
    }

    /// Try each configured model in order; the first completion that decodes
    /// into a [`SummaryResult`] wins. A model is never retried. Returns `None`
    /// when every model fails, so the caller skips the item.
    pub async fn summarize(&self, item: &NormalizedItem) -> Option<SummaryResult> {
        info!(title = %truncate_chars(&item.title, 50), "generating summary");

        let prompt = build_prompt(item);

        for model in &self.models {
            info!(%model, "trying model");

            let content = match self
                .client
                .complete(model, SYSTEM_PERSONA, &prompt, self.temperature, self.max_tokens)
                .await
            {
                Ok(content) => content,
                Err(e) => {
                    warn!(%model, %e, "model failed, trying next");
                    continue;
                }
            };

            let json = match extract_json(&content) {
                Some(json) => json,
                None => {
                    warn!(%model, "no JSON found in completion, trying next");
                    continue;
                }
            };

            match serde_json::from_str::<SummaryResult>(&json) {
                Ok(summary) => {
                    info!(%model, "summary generated");
                    return Some(summary);
                }
                Err(e) => {
                    warn!(%model, %e, "completion did not match summary shape, trying next");
                    continue;
                }
            }
        }

        error!(title = %truncate_chars(&item.title, 50), "all models failed to generate summary");
        None
    }
}

/// Build the persona prompt for one item. Content is truncated so oversized
/// feed bodies do not blow the context window.
fn build_prompt(item: &NormalizedItem) -> String {
    format!(
        r#"Analyze this security/technology news item and create a comprehensive summary.

Article Title: {title}
Source: {source}
Content: {content}

Provide:

1. **WHAT** (2-3 sentences): Describe what happened in plain language. Include key technical details.

2. **WHY IT MATTERS** - Provide specific, actionable insights for each persona:

**For a Security Engineer (AI security company or focussed on AI)**:
- How does this impact AI security products, cloud infrastructure, or security engineering practices?
- What immediate actions should be taken?
- What are the technical implications?

**For a GRC (Governance, Risk, Compliance) Professional**:
- What are the compliance implications (GDPR, DPDPA, ISO 27001, SOC 2, etc.)?
- Does this require incident reporting or documentation?
- What audit trail or policy changes are needed?

**For a Data Privacy Officer**:
- What are the data protection implications?
- Does this affect PII/sensitive data handling?
- Are there breach notification requirements?

3. **ESTIMATED READ TIME**: Estimate how long it would take to read the original article (e.g., "3 min")

Format your response as JSON:
{{
  "what": "2-3 sentence description",
  "why_it_matters_security": "Detailed paragraph for security engineers",
  "why_it_matters_grc": "Detailed paragraph for GRC",
  "why_it_matters_privacy": "Detailed paragraph for data privacy",
  "estimated_read_time": "X min",
  "for_security_engineer": true/false,
  "for_grc": true/false,
  "for_data_privacy": true/false,
  "tags": ["tag1", "tag2", "tag3"],
  "region": ["Global", "India", "EU", "US", etc.]
}}

Be specific and actionable. Focus on "so what?" insights."#,
        title = item.title,
        source = item.source,
        content = truncate_chars(&item.content, MAX_PROMPT_CONTENT_CHARS),
    )
}
