//! Page session state: processed elements, navigation and debouncing.
//!
//! A [`PageSession`] tracks which listing elements already carry a rating and
//! which page the user is on. Each navigation bumps a generation counter on a
//! `watch` channel; [`NavigationToken`]s issued for an older generation report
//! themselves cancelled so in-progress batches stop at their next step.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::RatingConfig;

#[derive(Debug, Default)]
struct SessionState {
    last_url: String,
    processed: HashSet<String>,
}

/// Per-page state shared by the observer and the batch scheduler.
#[derive(Debug)]
pub struct PageSession {
    state: Mutex<SessionState>,
    generation: watch::Sender<u64>,
}

impl PageSession {
    pub fn new(url: impl Into<String>) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            state: Mutex::new(SessionState {
                last_url: url.into(),
                processed: HashSet::new(),
            }),
            generation,
        }
    }

    // A panic while holding the lock leaves the set usable; recover it.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark an element as processed. Returns `true` if it was not marked yet.
    pub fn mark_processed(&self, element_id: &str) -> bool {
        self.state().processed.insert(element_id.to_string())
    }

    pub fn is_processed(&self, element_id: &str) -> bool {
        self.state().processed.contains(element_id)
    }

    pub fn processed_count(&self) -> usize {
        self.state().processed.len()
    }

    pub fn current_url(&self) -> String {
        self.state().last_url.clone()
    }

    /// Record the current URL.
    ///
    /// When it differs from the last one seen, tokens issued so far are
    /// cancelled and the processed set is cleared. Returns whether a
    /// navigation happened.
    pub fn navigate(&self, url: &str) -> bool {
        {
            let mut state = self.state();
            if state.last_url == url {
                return false;
            }
            state.last_url = url.to_string();
            state.processed.clear();
        }

        self.generation.send_modify(|g| *g += 1);
        info!(url = %url, generation = self.generation(), "page navigation");
        true
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Token bound to the current generation.
    pub fn token(&self) -> NavigationToken {
        let rx = self.generation.subscribe();
        let issued = *rx.borrow();
        NavigationToken { rx, issued }
    }
}

/// Cancellation handle for work started on one page.
#[derive(Debug, Clone)]
pub struct NavigationToken {
    rx: watch::Receiver<u64>,
    issued: u64,
}

impl NavigationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() != self.issued
    }

    /// Wait until a navigation cancels this token.
    ///
    /// Returns immediately if the session has been dropped.
    pub async fn cancelled(&mut self) {
        let issued = self.issued;
        let _ = self.rx.wait_for(|g| *g != issued).await;
    }
}

/// Collapses bursts of page mutations into one trigger.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    seq: AtomicU64,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            seq: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &RatingConfig) -> Self {
        Self::new(config.debounce())
    }

    /// Wait out the quiet period. Returns `true` only if no later trigger
    /// arrived in the meantime.
    pub async fn trigger(&self) -> bool {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.quiet).await;

        let fire = self.seq.load(Ordering::SeqCst) == ticket;
        if !fire {
            debug!(ticket, "trigger superseded");
        }
        fire
    }
}
