use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::model::{truncate_chars, NormalizedItem, SummaryResult};

const NOTION_VERSION: &str = "2022-06-28";
const MAX_TITLE_CHARS: usize = 100;
const MAX_BODY_CHARS: usize = 2000;
const MAX_TAGS: usize = 5;

pub const NOTION_API_URL: &str = "https://api.notion.com";

/// Creates one page in the destination Notion database per published item.
pub struct NotionPublisher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    database_id: String,
}

impl NotionPublisher {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            database_id: database_id.into(),
        })
    }

    /// Map one item plus its summary into a page record and create it.
    pub async fn publish(&self, item: &NormalizedItem, summary: &SummaryResult) -> Result<()> {
        info!(title = %truncate_chars(&item.title, 50), "creating digest entry");

        let digest_date = Utc::now().format("%Y-%m-%d").to_string();
        let body = build_page_body(&self.database_id, item, summary, &digest_date)?;

        let response = self
            .client
            .post(format!("{}/v1/pages", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("page creation request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("page creation failed with status {}: {}", status, body);
        }

        info!("digest entry created");
        Ok(())
    }
}

/// Build the full page-create request body. Pure so the property mapping is
/// testable without HTTP.
fn build_page_body(
    database_id: &str,
    item: &NormalizedItem,
    summary: &SummaryResult,
    digest_date: &str,
) -> Result<Value> {
    let published_date = DateTime::parse_from_rfc3339(&item.published)
        .with_context(|| format!("invalid item publish timestamp: {}", item.published))?
        .format("%Y-%m-%d")
        .to_string();

    let mut properties = json!({
        "Title": {"title": [{"text": {"content": truncate_chars(&item.title, MAX_TITLE_CHARS)}}]},
        "Date": {"date": {"start": published_date}},
        "Category": {"select": {"name": item.category.as_str()}},
        "Source": {"url": item.url},
        "Status": {"select": {"name": "🆕 New"}},
        "Digest Date": {"date": {"start": digest_date}},
        "For Security Engineer": {"checkbox": summary.for_security_engineer.unwrap_or(true)},
        "For GRC": {"checkbox": summary.for_grc.unwrap_or(false)},
        "For Data Privacy": {"checkbox": summary.for_data_privacy.unwrap_or(false)},
        "Estimated Read Time": {"rich_text": [{"text": {"content": summary.estimated_read_time.as_deref().unwrap_or("3 min")}}]},
    });

    if let Some(severity) = &item.severity {
        properties["Severity"] = json!({"select": {"name": severity}});
    }

    if let Some(tags) = &summary.tags {
        if !tags.is_empty() {
            let tags: Vec<Value> = tags
                .iter()
                .take(MAX_TAGS)
                .map(|tag| json!({"name": tag}))
                .collect();
            properties["Tags"] = json!({"multi_select": tags});
        }
    }

    if let Some(regions) = &summary.region {
        if !regions.is_empty() {
            let regions: Vec<Value> = regions.iter().map(|r| json!({"name": r})).collect();
            properties["Region"] = json!({"multi_select": regions});
        }
    }

    let why_it_matters = build_why_it_matters(summary);
    let what = if summary.what.is_empty() {
        "No summary available"
    } else {
        summary.what.as_str()
    };

    let children = json!([
        {
            "object": "block",
            "type": "heading_2",
            "heading_2": {"rich_text": [{"type": "text", "text": {"content": "What Happened"}}]}
        },
        {
            "object": "block",
            "type": "paragraph",
            "paragraph": {"rich_text": [{"type": "text", "text": {"content": what}}]}
        },
        {
            "object": "block",
            "type": "heading_2",
            "heading_2": {"rich_text": [{"type": "text", "text": {"content": "Why It Matters"}}]}
        },
        {
            "object": "block",
            "type": "paragraph",
            "paragraph": {"rich_text": [{"type": "text", "text": {"content": truncate_chars(&why_it_matters, MAX_BODY_CHARS)}}]}
        }
    ]);

    Ok(json!({
        "parent": {"database_id": database_id},
        "properties": properties,
        "children": children,
    }))
}

/// Concatenate the persona narratives under their headings. Absent or empty
/// narratives are left out entirely.
fn build_why_it_matters(summary: &SummaryResult) -> String {
    let mut out = String::new();

    if let Some(text) = summary.why_it_matters_security.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&format!("**For Security Engineers:**\n{}\n\n", text));
    }
    if let Some(text) = summary.why_it_matters_grc.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&format!("**For GRC Teams:**\n{}\n\n", text));
    }
    if let Some(text) = summary.why_it_matters_privacy.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&format!("**For Data Privacy Officers:**\n{}", text));
    }

    out
}
