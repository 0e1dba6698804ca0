use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use feed_rs::parser;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info};

use crate::fingerprint::fingerprint;
use crate::model::{truncate_chars, Category, NormalizedItem};

/// Max entries taken from one RSS feed per run.
const MAX_ENTRIES_PER_FEED: usize = 5;
/// Max advisories requested from the advisory API per run.
const MAX_ADVISORIES: u32 = 10;
/// Advisory synopsis length in the generated title.
const ADVISORY_SYNOPSIS_CHARS: usize = 80;

/// One configured syndication source.
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub url: String,
    pub category: Category,
    pub name: String,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, category: Category, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category,
            name: name.into(),
        }
    }
}

/// The production source table, in publication order.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("https://krebsonsecurity.com/feed/", Category::News, "Krebs on Security"),
        FeedSource::new("https://www.bleepingcomputer.com/feed/", Category::News, "BleepingComputer"),
        FeedSource::new("https://feeds.feedburner.com/TheHackersNews", Category::News, "The Hacker News"),
        FeedSource::new("https://www.darkreading.com/rss.xml", Category::News, "Dark Reading"),
        FeedSource::new(
            "https://cloud.google.com/feeds/kubernetes-engine-security-bulletins.xml",
            Category::Cloud,
            "GCP Security",
        ),
    ]
}

pub const GITHUB_ADVISORIES_URL: &str = "https://api.github.com/advisories";

/// Collects items from RSS feeds and the advisory API into the common item
/// shape. Owns the seen-fingerprint set for one run, so duplicates are
/// suppressed across sources as well (first source wins).
pub struct FeedCollector {
    client: reqwest::Client,
    sources: Vec<FeedSource>,
    advisory_url: String,
    advisory_token: Option<String>,
    seen: HashSet<String>,
}

impl FeedCollector {
    pub fn new(
        sources: Vec<FeedSource>,
        advisory_url: impl Into<String>,
        advisory_token: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("secdigest/0.1.0")
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            client,
            sources,
            advisory_url: advisory_url.into(),
            advisory_token,
            seen: HashSet::new(),
        })
    }

    /// Fetch every configured RSS source plus the advisory API, in declaration
    /// order. Individual source failures contribute nothing but never abort
    /// the pass.
    pub async fn collect_all(&mut self) -> Vec<NormalizedItem> {
        info!("starting security intelligence collection");

        let mut items = Vec::new();
        let sources = self.sources.clone();
        for source in &sources {
            items.extend(self.fetch_feed(source).await);
        }
        items.extend(self.fetch_advisories().await);

        info!(total = items.len(), "collection finished");
        items
    }

    /// Fetch one RSS feed and normalize its fresh, unseen entries.
    pub async fn fetch_feed(&mut self, source: &FeedSource) -> Vec<NormalizedItem> {
        info!(source = %source.name, "fetching RSS feed");

        let items = match self.fetch_feed_inner(source).await {
            Ok(items) => items,
            Err(e) => {
                error!(source = %source.name, %e, "error fetching RSS feed");
                Vec::new()
            }
        };

        info!(source = %source.name, count = items.len(), "fetched new items");
        items
    }

    async fn fetch_feed_inner(&mut self, source: &FeedSource) -> Result<Vec<NormalizedItem>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .context("feed request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("feed fetch failed with status: {}", status);
        }

        let bytes = response.bytes().await.context("failed to read feed body")?;
        let feed = parser::parse(bytes.as_ref()).context("failed to parse feed")?;

        let now = Utc::now();
        let mut items = Vec::new();

        for entry in feed.entries.into_iter().take(MAX_ENTRIES_PER_FEED) {
            // Feeds without publish timestamps are treated as fresh.
            let published = entry.published.unwrap_or(now);
            if !within_recency_window(published, now) {
                continue;
            }

            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let url = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let content = entry.summary.map(|s| s.content).unwrap_or_default();

            let item = NormalizedItem {
                title,
                url,
                content,
                published: published.to_rfc3339(),
                source: source.name.clone(),
                category: source.category,
                severity: None,
            };

            if self.mark_seen(&item) {
                items.push(item);
            }
        }

        Ok(items)
    }

    /// Fetch recent advisories, keeping only fresh HIGH/CRITICAL ones.
    pub async fn fetch_advisories(&mut self) -> Vec<NormalizedItem> {
        info!("fetching security advisories");

        let items = match self.fetch_advisories_inner().await {
            Ok(items) => items,
            Err(e) => {
                error!(%e, "error fetching advisories");
                Vec::new()
            }
        };

        info!(count = items.len(), "fetched advisories");
        items
    }

    async fn fetch_advisories_inner(&mut self) -> Result<Vec<NormalizedItem>> {
        let mut request = self
            .client
            .get(&self.advisory_url)
            .query(&[
                ("per_page", MAX_ADVISORIES.to_string()),
                ("sort", "published".to_string()),
                ("direction", "desc".to_string()),
            ])
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.advisory_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.context("advisory request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("advisory fetch failed with status: {}", status);
        }

        let advisories: Vec<Advisory> = response
            .json()
            .await
            .context("failed to parse advisory listing")?;

        let now = Utc::now();
        let mut items = Vec::new();

        for advisory in advisories {
            let published = DateTime::parse_from_rfc3339(&advisory.published_at)
                .context("invalid advisory publish timestamp")?
                .with_timezone(&Utc);
            if !within_recency_window(published, now) {
                continue;
            }

            let severity_label = match advisory.severity.to_uppercase().as_str() {
                "CRITICAL" => "🔴 Critical",
                "HIGH" => "🟠 High",
                _ => continue,
            };

            let item = NormalizedItem {
                title: format!(
                    "{}: {}",
                    advisory.ghsa_id,
                    truncate_chars(&advisory.summary, ADVISORY_SYNOPSIS_CHARS)
                ),
                url: advisory.html_url,
                content: advisory.description,
                published: advisory.published_at,
                source: "GitHub Advisory".to_string(),
                category: Category::Cve,
                severity: Some(severity_label.to_string()),
            };

            if self.mark_seen(&item) {
                items.push(item);
            }
        }

        Ok(items)
    }

    /// Record the item's fingerprint; returns false when it was already seen
    /// this run (first-seen wins).
    fn mark_seen(&mut self, item: &NormalizedItem) -> bool {
        self.seen.insert(fingerprint(&item.title, &item.url))
    }
}

/// Strict recency gate: anything more than one day old is stale. An entry
/// exactly at the boundary is kept.
fn within_recency_window(published: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - published <= ChronoDuration::days(1)
}

#[derive(Debug, Deserialize)]
struct Advisory {
    #[serde(default = "default_ghsa_id")]
    ghsa_id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_severity")]
    severity: String,
    #[serde(default)]
    html_url: String,
    published_at: String,
}

fn default_ghsa_id() -> String {
    "GHSA".to_string()
}

fn default_severity() -> String {
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recency_window_boundaries() {
        let now = Utc::now();
        assert!(within_recency_window(now - ChronoDuration::minutes(10), now));
        assert!(!within_recency_window(now - ChronoDuration::days(2), now));
        // exactly one day old is still in the window
        assert!(within_recency_window(now - ChronoDuration::days(1), now));
        // future-dated entries are kept as well
        assert!(within_recency_window(now + ChronoDuration::hours(1), now));
    }

    #[test]
    fn advisory_decodes_with_missing_fields() {
        let json = r#"{"published_at": "2026-08-30T10:00:00Z"}"#;
        let adv: Advisory = serde_json::from_str(json).expect("decode");
        assert_eq!(adv.ghsa_id, "GHSA");
        assert_eq!(adv.severity, "unknown");
    }

    #[test]
    fn default_source_table_order() {
        let sources = default_sources();
        assert_eq!(sources.len(), 5);
        assert_eq!(sources[0].name, "Krebs on Security");
        assert_eq!(sources[4].category, Category::Cloud);
    }
}
