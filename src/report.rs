// src/report.rs
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::error::{RevLookupError, RevLookupResult};
use crate::target::TargetKind;

/// One terminal outcome per processing attempt. A target that gets
/// requeued after an error contributes a record per attempt.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub target: String,
    pub count: Option<u64>,
    pub success: bool,
    pub kind: TargetKind,
}

/// Per-type tallies for one run, serialized as the optional JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub successful_ips: usize,
    pub failed_ips: usize,
    pub successful_domains: usize,
    pub failed_domains: usize,
    pub unique_domains: Option<usize>,
    pub output_file: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn tally(records: &[ResultRecord], output_file: &Path, started_at: DateTime<Utc>) -> Self {
        let mut summary = Self {
            successful_ips: 0,
            failed_ips: 0,
            successful_domains: 0,
            failed_domains: 0,
            unique_domains: None,
            output_file: output_file.to_path_buf(),
            started_at,
            finished_at: Utc::now(),
        };

        for record in records {
            match (record.kind, record.success) {
                (TargetKind::Ip, true) => summary.successful_ips += 1,
                (TargetKind::Ip, false) => summary.failed_ips += 1,
                (TargetKind::Domain, true) => summary.successful_domains += 1,
                (TargetKind::Domain, false) => summary.failed_domains += 1,
            }
        }

        summary
    }

    pub fn total_success(&self) -> usize {
        self.successful_ips + self.successful_domains
    }

    pub fn total_failed(&self) -> usize {
        self.failed_ips + self.failed_domains
    }

    pub fn print(&self) {
        let rule = "=".repeat(50);
        println!("\n{}", rule.green());
        println!("{}", "PROCESSING COMPLETE".green().bold());
        println!("{}", rule.green());
        println!("{}", "IP addresses:".blue());
        println!("  - Successfully processed: {}", self.successful_ips.to_string().green());
        println!("  - Failed: {}", self.failed_ips.to_string().red());
        println!("{}", "Domain names:".magenta());
        println!("  - Successfully processed: {}", self.successful_domains.to_string().green());
        println!("  - Failed: {}", self.failed_domains.to_string().red());
        println!("Total success: {}", self.total_success().to_string().green());
        println!("Total failed: {}", self.total_failed().to_string().red());
        println!(
            "Results saved to: {} {}",
            self.output_file.display(),
            "(domains only)".bright_black()
        );
    }

    /// Persist the summary as a pretty JSON artifact.
    pub async fn write_json(&self, path: &Path) -> RevLookupResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RevLookupError::UnexpectedError(
                format!("Failed to serialize run summary: {}", e)
            ))?;

        fs::write(path, json).await.map_err(|e| RevLookupError::FileError {
            path: path.to_path_buf(),
            message: format!("Failed to write run summary: {}", e),
        })?;

        info!("Wrote run summary to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: TargetKind, success: bool) -> ResultRecord {
        ResultRecord {
            target: "t".to_string(),
            count: success.then_some(1),
            success,
            kind,
        }
    }

    #[test]
    fn tally_splits_counts_by_kind_and_outcome() {
        let records = vec![
            record(TargetKind::Ip, true),
            record(TargetKind::Ip, false),
            record(TargetKind::Ip, false),
            record(TargetKind::Domain, true),
            record(TargetKind::Domain, true),
            record(TargetKind::Domain, false),
        ];

        let summary = RunSummary::tally(&records, Path::new("results.txt"), Utc::now());

        assert_eq!(summary.successful_ips, 1);
        assert_eq!(summary.failed_ips, 2);
        assert_eq!(summary.successful_domains, 2);
        assert_eq!(summary.failed_domains, 1);
        assert_eq!(summary.total_success(), 3);
        assert_eq!(summary.total_failed(), 3);
    }

    #[tokio::test]
    async fn summary_serializes_to_json_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        let mut summary = RunSummary::tally(&[], Path::new("results.txt"), Utc::now());
        summary.unique_domains = Some(42);
        summary.write_json(&path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["unique_domains"], 42);
        assert_eq!(parsed["successful_ips"], 0);
    }
}
