// src/app.rs
use std::path::Path;
use std::sync::Arc;
use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::engine;
use crate::output::OutputFile;
use crate::print;
use crate::report::RunSummary;
use crate::target;

/// Application entry: wires one run together and reports on it.
pub struct App {
    config: Arc<RunConfig>,
}

impl App {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub async fn run(
        &self,
        target_file: &Path,
        output_path: &Path,
        threads: usize,
        report_path: Option<&Path>,
    ) -> Result<()> {
        print::print_run_header(target_file, threads, output_path);

        let loaded = target::load_targets(target_file).await;
        let total = loaded.total();
        if total == 0 {
            println!("No valid targets found. Exiting.");
            return Ok(());
        }

        let output = Arc::new(OutputFile::new(output_path));
        if let Err(e) = output.clear().await {
            warn!("Could not clear output file: {}", e);
            println!("{} {}", "Warning: could not clear output file:".yellow(), e);
        }

        println!(
            "Processing {} targets: {} IPs (reverse IP lookup) + {} domains (subdomain enumeration)",
            total,
            loaded.ips.len(),
            loaded.domains.len()
        );

        let started_at = Utc::now();
        let records = engine::run(
            self.config.clone(),
            loaded.into_targets(),
            output.clone(),
            threads,
        )
        .await;

        let mut summary = RunSummary::tally(&records, output.path(), started_at);
        summary.print();

        // Final cleanup pass over everything the workers appended.
        match output.dedup_in_place().await {
            Ok(unique) => {
                println!(
                    "{} {}",
                    "Removed duplicates. Final unique domains:".green(),
                    unique.to_string().white()
                );
                summary.unique_domains = Some(unique);
            }
            Err(e) => {
                warn!("Dedup pass failed: {}", e);
                println!("{} {}", "Error removing duplicates:".red(), e);
            }
        }

        if let Some(report_path) = report_path {
            summary.write_json(report_path).await?;
            println!("Run summary written to {}", report_path.display());
        }

        info!(
            "Run complete: {} succeeded, {} failed",
            summary.total_success(),
            summary.total_failed()
        );
        Ok(())
    }
}
