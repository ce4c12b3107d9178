//! Sequential batch resolution with a fixed delay between items.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RatingConfig;
use crate::pipeline::RatingPipeline;
use crate::session::PageSession;
use crate::types::{Identity, RatingResult};

/// Default pause between two resolutions.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Receives each result as soon as it is resolved.
pub trait RenderSink {
    fn render(&mut self, index: usize, identity: &Identity, result: &RatingResult);
}

impl<F> RenderSink for F
where
    F: FnMut(usize, &Identity, &RatingResult),
{
    fn render(&mut self, index: usize, identity: &Identity, result: &RatingResult) {
        self(index, identity, result)
    }
}

/// One doctor card on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCard {
    pub element_id: String,
    #[serde(flatten)]
    pub identity: Identity,
}

impl ListingCard {
    pub fn new(element_id: impl Into<String>, identity: Identity) -> Self {
        Self {
            element_id: element_id.into(),
            identity,
        }
    }
}

/// Outcome counts of [`BatchScheduler::run_listing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub rendered: usize,
    pub skipped: usize,
    pub cancelled: usize,
}

/// Runs identities through the pipeline one at a time.
#[derive(Clone)]
pub struct BatchScheduler {
    pipeline: Arc<RatingPipeline>,
    delay: Duration,
}

impl BatchScheduler {
    pub fn new(pipeline: Arc<RatingPipeline>) -> Self {
        Self {
            pipeline,
            delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn from_config(pipeline: Arc<RatingPipeline>, config: &RatingConfig) -> Self {
        Self::new(pipeline).with_delay(config.batch_delay())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Resolve every identity in order, rendering each before the next starts.
    ///
    /// Waits `delay` between items, never after the last one.
    pub async fn resolve_all(
        &self,
        identities: &[Identity],
        sink: &mut impl RenderSink,
    ) -> Vec<RatingResult> {
        let mut results = Vec::with_capacity(identities.len());

        for (index, identity) in identities.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let result = self.pipeline.resolve(identity).await;
            sink.render(index, identity, &result);
            results.push(result);
        }

        info!(count = results.len(), "batch resolved");
        results
    }

    /// Resolve the unprocessed cards of a listing page.
    ///
    /// Stops as soon as the session navigates away; the card in flight at
    /// that moment is not rendered and counts as cancelled.
    pub async fn run_listing(
        &self,
        session: &PageSession,
        cards: Vec<ListingCard>,
        sink: &mut impl RenderSink,
    ) -> BatchReport {
        let token = session.token();
        let total = cards.len();
        let mut report = BatchReport::default();
        let mut resolved_any = false;

        for (index, card) in cards.into_iter().enumerate() {
            if token.is_cancelled() {
                report.cancelled = total - index;
                break;
            }

            if session.is_processed(&card.element_id) {
                debug!(element = %card.element_id, "card already processed");
                report.skipped += 1;
                continue;
            }

            if resolved_any {
                tokio::time::sleep(self.delay).await;
                if token.is_cancelled() {
                    report.cancelled = total - index;
                    break;
                }
            }
            resolved_any = true;

            session.mark_processed(&card.element_id);
            let result = self.pipeline.resolve(&card.identity).await;

            if token.is_cancelled() {
                report.cancelled = total - index;
                break;
            }

            sink.render(index, &card.identity, &result);
            report.rendered += 1;
        }

        info!(
            rendered = report.rendered,
            skipped = report.skipped,
            cancelled = report.cancelled,
            "listing processed"
        );
        report
    }
}
