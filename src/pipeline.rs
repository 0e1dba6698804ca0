use anyhow::Result;
use tracing::{info, warn};

use crate::collector::FeedCollector;
use crate::model::truncate_chars;
use crate::publisher::NotionPublisher;
use crate::summarizer::Summarizer;

/// Max collected items summarized and published per run. Anything past the
/// cap is dropped for this run, not deferred.
pub const MAX_ITEMS_PER_RUN: usize = 15;

/// Sequences one full digest run: collect, cap, summarize, publish.
pub struct Pipeline {
    collector: FeedCollector,
    summarizer: Summarizer,
    publisher: NotionPublisher,
}

impl Pipeline {
    pub fn new(collector: FeedCollector, summarizer: Summarizer, publisher: NotionPublisher) -> Self {
        Self {
            collector,
            summarizer,
            publisher,
        }
    }

    /// Run the pipeline once. Returns the number of items successfully
    /// summarized; publish failures are logged but do not affect the count.
    pub async fn run(&mut self) -> Result<usize> {
        let mut items = self.collector.collect_all().await;

        if items.is_empty() {
            info!("no new items found, exiting");
            return Ok(0);
        }

        items.truncate(MAX_ITEMS_PER_RUN);
        info!(count = items.len(), "processing items with AI summarization");

        let mut processed = 0;
        for item in &items {
            let summary = match self.summarizer.summarize(item).await {
                Some(summary) => summary,
                None => {
                    warn!(
                        title = %truncate_chars(&item.title, 50),
                        "skipping item, summary generation failed"
                    );
                    continue;
                }
            };

            processed += 1;

            if let Err(e) = self.publisher.publish(item, &summary).await {
                warn!(title = %truncate_chars(&item.title, 50), %e, "failed to create digest entry");
            }
        }

        info!(processed, "digest run complete");
        Ok(processed)
    }
}
