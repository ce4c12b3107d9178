use doctonote_core::{Identity, RatingPipeline, Resolution, ResolveSource};
use serde_json::json;

use crate::cli::args::ResolveArgs;
use crate::exit_codes;

pub async fn run(args: ResolveArgs, pipeline: &RatingPipeline) -> anyhow::Result<i32> {
    let identity = Identity::new(args.name, args.address);
    let resolution = pipeline.resolve_detailed(&identity).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&resolution))?);
    } else {
        println!("{}", summary_line(&identity, &resolution));
    }

    match (&resolution.source, args.strict) {
        (ResolveSource::Fallback(e), true) => {
            eprintln!("error: {}", e);
            Ok(e.exit_code())
        }
        _ => Ok(exit_codes::SUCCESS),
    }
}

pub(crate) fn summary_line(identity: &Identity, resolution: &Resolution) -> String {
    let result = &resolution.result;
    let mut line = format!(
        "{}: {} ({} reviews) [{}]",
        identity.name, result.rating, result.reviews_count, resolution.source
    );
    if let Some(link) = result.link_out() {
        line.push(' ');
        line.push_str(&link);
    }
    line
}

fn to_json(resolution: &Resolution) -> serde_json::Value {
    json!({
        "key": resolution.key.as_str(),
        "source": resolution.source.to_string(),
        "result": resolution.result,
        "linkOut": resolution.result.link_out(),
    })
}
