use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use doctonote_core::{
    BatchScheduler, Identity, ListingCard, PageSession, RatingConfig, RatingPipeline, RatingResult,
};
use serde_json::json;

use super::spawn_interrupt;
use crate::cli::args::BatchArgs;
use crate::exit_codes;

pub async fn run(
    args: BatchArgs,
    pipeline: Arc<RatingPipeline>,
    config: &RatingConfig,
) -> anyhow::Result<i32> {
    let cards = read_cards(&args.file)?;
    tracing::info!(count = cards.len(), file = %args.file.display(), "loaded listing");

    let mut scheduler = BatchScheduler::from_config(pipeline, config);
    if let Some(ms) = args.delay_ms {
        scheduler = scheduler.with_delay(Duration::from_millis(ms));
    }

    let session = Arc::new(PageSession::new(page_url(&args.file)));
    let interrupt = spawn_interrupt(session.clone());

    let json = args.json;
    let mut print = |_: usize, identity: &Identity, result: &RatingResult| {
        println!("{}", render_line(json, identity, result));
    };

    let report = scheduler.run_listing(&session, cards, &mut print).await;
    interrupt.abort();
    eprintln!(
        "rendered {}, skipped {}, cancelled {}",
        report.rendered, report.skipped, report.cancelled
    );

    Ok(exit_codes::SUCCESS)
}

/// Page URL a listing file stands for.
pub(crate) fn page_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// One output line per rendered card: tab-separated, or a JSON object.
pub(crate) fn render_line(json: bool, identity: &Identity, result: &RatingResult) -> String {
    if json {
        return json!({ "name": identity.name, "address": identity.address, "result": result })
            .to_string();
    }
    format!(
        "{}\t{}\t{}\t{}",
        identity.name,
        result.rating,
        result.reviews_count,
        result.link_out().unwrap_or_default()
    )
}

pub(crate) fn read_cards(path: &Path) -> anyhow::Result<Vec<ListingCard>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read listing {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse listing {}", path.display()))
}
