//! Doctor rating resolution for DoctoNote.
//!
//! This crate turns the doctors shown on listing and profile pages into
//! public ratings, providing:
//!
//! - Stable cache keys for `(name, address)` identities
//! - A persistent rating cache over a pluggable key-value store
//! - An HTTP provider for the rating backend (`/api/doctor-rating`)
//! - A cache-first resolution pipeline that never fails
//! - A sequential batch scheduler with navigation-aware cancellation
//!
//! # Quick Start
//!
//! ```no_run
//! use doctonote_core::{Identity, RatingConfig, RatingPipeline};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = RatingPipeline::from_config(&RatingConfig::from_env())?;
//!
//! let result = pipeline
//!     .resolve(&Identity::new("Dr. Martin", "12 Rue de Paris"))
//!     .await;
//! println!("{} ({} reviews)", result.rating, result.reviews_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! See [`RatingConfig`] for the `DOCTONOTE_*` environment variables.

pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod provider;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;

// Re-export main types
pub use cache::RatingCache;
pub use config::RatingConfig;
pub use error::{
    ConfigError, ResolutionError, ResolutionResult, StoreError, StoreResult,
};
pub use identity::{build_key, IdentityKey};
pub use pipeline::{RatingPipeline, Resolution, ResolveSource};
pub use provider::{HttpRatingProvider, RatingProvider};
pub use scheduler::{BatchReport, BatchScheduler, ListingCard, RenderSink};
pub use session::{Debouncer, NavigationToken, PageSession};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::{Identity, Rating, RatingResult};
