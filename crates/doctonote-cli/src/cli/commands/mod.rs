use std::sync::Arc;

use anyhow::Context;
use doctonote_core::{
    HttpRatingProvider, KeyValueStore, MemoryStore, PageSession, RatingCache, RatingConfig,
    RatingPipeline,
};
use tokio::task::JoinHandle;

use super::args::{Cli, Command, CommonArgs};

pub mod batch;
pub mod cache;
pub mod resolve;
pub mod watch;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = load_config(&cli.common)?;
    let pipeline = build_pipeline(&cli.common, &config)?;

    match cli.cmd {
        Command::Resolve(args) => resolve::run(args, &pipeline).await,
        Command::Batch(args) => batch::run(args, Arc::new(pipeline), &config).await,
        Command::Cache(args) => cache::run(args, &pipeline).await,
        Command::Watch(args) => watch::run(args, Arc::new(pipeline), &config).await,
    }
}

/// Leaving the page on Ctrl-C: cancels whatever runs on the session.
pub(crate) fn spawn_interrupt(session: Arc<PageSession>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            session.navigate(INTERRUPTED_URL);
        }
    })
}

/// Session URL after an interrupt.
pub(crate) const INTERRUPTED_URL: &str = "about:blank";

/// Config file when given, environment otherwise; flags win over both.
pub(crate) fn load_config(common: &CommonArgs) -> anyhow::Result<RatingConfig> {
    let mut config = match &common.config {
        Some(path) => RatingConfig::load(path)?,
        None => RatingConfig::from_env(),
    };

    if let Some(url) = &common.backend_url {
        config = config.with_backend_url(url.clone());
    }
    if let Some(path) = &common.store {
        config = config.with_store_path(path.clone());
    }

    config.validate()?;
    Ok(config)
}

fn build_pipeline(common: &CommonArgs, config: &RatingConfig) -> anyhow::Result<RatingPipeline> {
    if common.memory {
        let provider =
            HttpRatingProvider::new(config).context("failed to create rating provider")?;
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        return Ok(RatingPipeline::new(
            Arc::new(provider),
            RatingCache::new(store),
        ));
    }

    RatingPipeline::from_config(config).context("failed to create rating pipeline")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_config_applies_flag_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_url: https://ratings.example.com\nbatch_delay_ms: 50").unwrap();

        let common = CommonArgs {
            config: Some(file.path().to_path_buf()),
            backend_url: Some("http://127.0.0.1:4000".into()),
            store: Some("ratings.json".into()),
            memory: false,
        };
        let config = load_config(&common).unwrap();

        assert_eq!(config.backend_url, "http://127.0.0.1:4000");
        assert_eq!(config.batch_delay_ms, 50);
        assert_eq!(config.store_path.as_deref(), Some(std::path::Path::new("ratings.json")));
    }

    #[test]
    fn load_config_rejects_bad_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms: 10").unwrap();

        let common = CommonArgs {
            config: Some(file.path().to_path_buf()),
            backend_url: Some("localhost:3000".into()),
            ..CommonArgs::default()
        };
        assert!(load_config(&common).is_err());
    }
}
