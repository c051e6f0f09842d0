use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use serde::Serialize;
use spdlog::{info, warn};

use postmatter::collection::PostCollection;
use postmatter::config::read_config;
use postmatter::logger::configure_logger;
use postmatter::post::Post;
use postmatter::post_list::PostList;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Posts directory. Overrides the configuration file
    #[arg(short, long)]
    posts_dir: Option<PathBuf>,

    /// Print the full report as JSON instead of logging a summary
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RejectedReport<'a> {
    name: &'a str,
    error: String,
}

#[derive(Serialize)]
struct Report<'a> {
    published: &'a [Post],
    rejected: Vec<RejectedReport<'a>>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => Some(read_config(path)?),
        None => None,
    };

    if let Some(ref config) = config {
        configure_logger(config.log.as_ref())?;
    }

    let posts_dir = args.posts_dir.clone()
        .or_else(|| config.as_ref().map(|c| c.paths.posts_dir.clone()));
    let Some(posts_dir) = posts_dir else {
        bail!("Either --posts-dir or a configuration file with a [paths] section is required");
    };

    let post_file = match config {
        Some(ref config) => config.index_base_name(),
        None => "index.md".to_string(),
    };

    let post_list = PostList::new(posts_dir, &post_file);
    let collection = PostCollection::build(post_list.retrieve_documents()?);

    if args.json {
        let report = Report {
            published: &collection.published,
            rejected: collection.rejected.iter()
                .map(|r| RejectedReport { name: &r.name, error: r.error.to_string() })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!("Loaded {} posts, {} rejected", collection.len(), collection.rejected.len());
    for post in collection.published.iter() {
        info!("{} - {} ({})", post.published_at.format("%Y-%m-%d"), post.title, post.slug);
    }
    for rejected in collection.rejected.iter() {
        warn!("Rejected {}: {}", rejected.name, rejected.error);
    }

    Ok(())
}
