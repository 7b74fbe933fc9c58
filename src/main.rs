use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use tracing::Level;

mod config;
mod core;
mod models;
mod utils;

use crate::core::search::{StdinPicker, Target};
use crate::utils::{Error, Result};

/// Search javdatabase.com and extract metadata/preview images.
#[derive(Parser, Debug)]
#[command(name = "javmeta", version, about)]
struct Args {
    /// Search query (e.g. SONE-763)
    #[arg(short, long)]
    query: Option<String>,

    /// Direct link to a movie page (skips search)
    #[arg(short, long)]
    link: Option<String>,

    /// Write the JSON record to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Download preview images to <dvd_id>/preview/
    #[arg(short, long)]
    download: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = match config::Config::init() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to initialize configuration: {e}");
            std::process::exit(1);
        }
    };
    init_logging(&config);

    if let Err(e) = run(args, &config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn init_logging(config: &crate::config::Config) {
    tracing_subscriber::fmt()
        .with_max_level(Level::from_str(&config.logs.level).unwrap_or(Level::INFO))
        .init();
}

async fn run(args: Args, config: &crate::config::Config) -> Result<()> {
    let target = resolve_target(&args)?;
    let client = core::http::page_client(&config.site)?;

    let url = core::search::resolve(&client, &config.site, &target, &StdinPicker).await?;
    let record = core::extract::extract(&client, &url).await?;

    let image_client = core::http::image_client(&config.site)?;
    let options = core::output::EmitOptions {
        output_path: args.output,
        download: args.download,
    };
    core::output::emit(&image_client, &record, &options).await
}

/// A direct link wins over a query; with neither, prompt for a query.
fn resolve_target(args: &Args) -> Result<Target> {
    if let Some(link) = &args.link {
        return Ok(Target::Link(link.clone()));
    }

    let query = match &args.query {
        Some(q) => q.trim().to_string(),
        None => {
            print!("Enter your search query (e.g. SONE-763): ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };

    if query.is_empty() {
        return Err(Error::Other("empty query provided".to_string()));
    }
    Ok(Target::Query(query))
}
