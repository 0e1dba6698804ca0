use anyhow::Result;

pub mod remote;

/// Chat-completion endpoint abstraction. The model name is a per-call
/// parameter because the summarizer walks a fallback list over one client.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one system+user exchange to `model` and return the raw text of the
    /// first completion choice.
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;
}

/// Extract the JSON payload from completion text that may be wrapped in
/// markdown fences or surrounded by preamble.
pub fn extract_json(text: &str) -> Option<String> {
    // ```json ... ```
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    // bare ``` ... ```
    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    // first '{' to last '}'
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return Some(text[start..=end].to_string());
        }
    }

    None
}
