// src/main.rs
use std::path::PathBuf;
use std::process::exit;
use anyhow::Result;
use clap::Parser;
use tracing::error;

mod app;
mod config;
mod download;
mod engine;
mod error;
mod lookup;
mod output;
mod print;
mod proxy;
mod report;
mod target;
mod utils;

use app::App;
use config::RunConfig;

#[derive(Parser)]
#[command(name = "revlookup")]
#[command(about = "Mixed reverse-IP and subdomain reconnaissance tool", version)]
struct Args {
    /// File with IP addresses and domain names, one per line
    #[arg(short = 'l', long = "list")]
    list: PathBuf,

    /// Number of concurrent workers
    #[arg(short = 't', long = "threads", default_value_t = 100,
          value_parser = clap::value_parser!(u32).range(1..))]
    threads: u32,

    /// Output file for collected domains
    #[arg(short = 'o', long = "output", default_value = "results.txt")]
    output: PathBuf,

    /// Optional TOML configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Upstream proxy address (user:pass@host:port); may be repeated
    #[arg(long = "proxy")]
    proxy: Vec<String>,

    /// Write a JSON run summary to this path
    #[arg(long = "report")]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    print::print_banner();

    let mut config = match RunConfig::load(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            exit(1);
        }
    };
    config.add_proxies(&args.proxy);

    let app = App::new(config);
    if let Err(e) = app
        .run(
            &args.list,
            &args.output,
            args.threads as usize,
            args.report.as_deref(),
        )
        .await
    {
        error!("Run failed: {}", e);
        exit(1);
    }

    Ok(())
}
