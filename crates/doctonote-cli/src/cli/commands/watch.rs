use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use doctonote_core::{
    BatchReport, BatchScheduler, Debouncer, Identity, PageSession, RatingConfig, RatingPipeline,
    RatingResult,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::batch::{page_url, read_cards, render_line};
use super::spawn_interrupt;
use crate::cli::args::WatchArgs;
use crate::exit_codes;

/// Treats every change of the listing file like a page mutation: after the
/// debounce period the unprocessed cards are resolved. Ctrl-C leaves the page,
/// which stops the loop and any listing in progress.
pub async fn run(
    args: WatchArgs,
    pipeline: Arc<RatingPipeline>,
    config: &RatingConfig,
) -> anyhow::Result<i32> {
    let scheduler = BatchScheduler::from_config(pipeline, config);
    let session = Arc::new(PageSession::new(page_url(&args.file)));
    let debouncer = Arc::new(Debouncer::from_config(config));
    let mut left_page = session.token();
    let interrupt = spawn_interrupt(session.clone());

    let (fire_tx, mut fire_rx) = mpsc::unbounded_channel::<()>();
    let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let json = args.json;
    let mut print = |_: usize, identity: &Identity, result: &RatingResult| {
        println!("{}", render_line(json, identity, result));
    };

    let mut last_seen = None;
    let mut totals = BatchReport::default();
    info!(file = %args.file.display(), "watching listing");

    loop {
        tokio::select! {
            _ = left_page.cancelled() => break,
            _ = ticker.tick() => {
                let Some(modified) = modified_at(&args.file).await else {
                    continue;
                };
                if changed(&mut last_seen, modified) {
                    debug!("listing changed");
                    let (debouncer, fire_tx) = (debouncer.clone(), fire_tx.clone());
                    tokio::spawn(async move {
                        if debouncer.trigger().await {
                            let _ = fire_tx.send(());
                        }
                    });
                }
            }
            Some(()) = fire_rx.recv() => {
                let cards = match read_cards(&args.file) {
                    Ok(cards) => cards,
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable listing");
                        continue;
                    }
                };
                let report = scheduler.run_listing(&session, cards, &mut print).await;
                totals.rendered += report.rendered;
                totals.skipped += report.skipped;
                totals.cancelled += report.cancelled;
            }
        }
    }

    interrupt.abort();
    eprintln!(
        "rendered {}, skipped {}, cancelled {}",
        totals.rendered, totals.skipped, totals.cancelled
    );
    Ok(exit_codes::SUCCESS)
}

async fn modified_at(path: &Path) -> Option<SystemTime> {
    match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => Some(modified),
        Err(e) => {
            debug!(error = %e, path = %path.display(), "listing not readable");
            None
        }
    }
}

/// Record `modified`; `true` if it differs from the last value seen.
fn changed(last_seen: &mut Option<SystemTime>, modified: SystemTime) -> bool {
    if *last_seen == Some(modified) {
        return false;
    }
    *last_seen = Some(modified);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_fires_on_first_and_new_times_only() {
        let t0 = SystemTime::UNIX_EPOCH;
        let t1 = t0 + Duration::from_secs(1);
        let mut last_seen = None;

        assert!(changed(&mut last_seen, t0));
        assert!(!changed(&mut last_seen, t0));
        assert!(changed(&mut last_seen, t1));
        assert!(!changed(&mut last_seen, t1));
    }

    #[tokio::test]
    async fn modified_at_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(modified_at(&dir.path().join("missing.json")).await.is_none());

        let file = dir.path().join("cards.json");
        std::fs::write(&file, "[]").unwrap();
        assert!(modified_at(&file).await.is_some());
    }
}
