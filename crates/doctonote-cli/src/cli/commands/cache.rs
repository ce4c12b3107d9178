use doctonote_core::RatingPipeline;

use crate::cli::args::{CacheArgs, CacheCommand};
use crate::exit_codes;

pub async fn run(args: CacheArgs, pipeline: &RatingPipeline) -> anyhow::Result<i32> {
    match args.cmd {
        CacheCommand::List { json } => list(pipeline, json).await,
    }
}

async fn list(pipeline: &RatingPipeline, json: bool) -> anyhow::Result<i32> {
    let entries = pipeline.cached_entries().await?;

    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(key, result)| Ok((key, serde_json::to_value(result)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(exit_codes::SUCCESS);
    }

    if entries.is_empty() {
        eprintln!("cache is empty");
    }
    for (key, result) in &entries {
        println!("{}\t{}\t{}", key, result.rating, result.reviews_count);
    }
    Ok(exit_codes::SUCCESS)
}
