// src/target.rs
use std::fmt;
use std::net::Ipv4Addr;
use std::path::Path;
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, error};

/// Label rules: alphanumeric/hyphen labels up to 63 chars, alphabetic
/// top-level label of at least two chars.
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$")
        .expect("domain pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Ip,
    Domain,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Ip => write!(f, "ip"),
            TargetKind::Domain => write!(f, "domain"),
        }
    }
}

/// One classified unit of work, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Target {
    pub value: String,
    pub kind: TargetKind,
}

impl Target {
    pub fn new(value: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

pub fn is_valid_ip(line: &str) -> bool {
    line.parse::<Ipv4Addr>().is_ok()
}

pub fn is_valid_domain(line: &str) -> bool {
    DOMAIN_RE.is_match(line)
}

/// Classification of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Ip,
    Domain,
    Invalid,
}

pub fn classify(line: &str) -> Classified {
    if is_valid_ip(line) {
        Classified::Ip
    } else if is_valid_domain(line) {
        Classified::Domain
    } else {
        Classified::Invalid
    }
}

/// Targets loaded from one input file, split by kind.
#[derive(Debug, Default)]
pub struct LoadedTargets {
    pub ips: Vec<String>,
    pub domains: Vec<String>,
    pub invalid: Vec<String>,
}

impl LoadedTargets {
    pub fn total(&self) -> usize {
        self.ips.len() + self.domains.len()
    }

    pub fn classify_lines(content: &str) -> Self {
        let mut loaded = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match classify(line) {
                Classified::Ip => loaded.ips.push(line.to_string()),
                Classified::Domain => loaded.domains.push(line.to_string()),
                Classified::Invalid => loaded.invalid.push(line.to_string()),
            }
        }

        loaded
    }

    pub fn into_targets(self) -> Vec<Target> {
        let mut targets = Vec::with_capacity(self.total());
        targets.extend(self.ips.into_iter().map(|ip| Target::new(ip, TargetKind::Ip)));
        targets.extend(self.domains.into_iter().map(|d| Target::new(d, TargetKind::Domain)));
        targets
    }
}

/// Load and classify targets from a file. A missing or unreadable file is
/// reported and yields empty sequences; the caller treats that as nothing
/// to do.
pub async fn load_targets(path: &Path) -> LoadedTargets {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to read target file {}: {}", path.display(), e);
            println!("{} {}", "Error: cannot read".red(), path.display());
            return LoadedTargets::default();
        }
    };

    let loaded = LoadedTargets::classify_lines(&content);
    debug!(
        "Classified {} ips, {} domains, {} invalid from {}",
        loaded.ips.len(),
        loaded.domains.len(),
        loaded.invalid.len(),
        path.display()
    );

    report_loaded(path, &loaded);
    loaded
}

fn report_loaded(path: &Path, loaded: &LoadedTargets) {
    println!(
        "{} {}:",
        "Loaded from".cyan(),
        path.display().to_string().white()
    );
    println!(
        "   {} {}",
        "IP addresses:".blue(),
        loaded.ips.len().to_string().green()
    );
    println!(
        "   {} {}",
        "Domain names:".magenta(),
        loaded.domains.len().to_string().green()
    );

    if loaded.invalid.is_empty() {
        return;
    }

    println!(
        "   {} {}",
        "Invalid targets (skipped):".yellow(),
        loaded.invalid.len().to_string().red()
    );
    for invalid in loaded.invalid.iter().take(3) {
        println!("      {} {}", "x".red(), invalid.white());
    }
    if loaded.invalid.len() > 3 {
        println!(
            "      {} {} {}",
            "... and".yellow(),
            (loaded.invalid.len() - 3).to_string().red(),
            "more".yellow()
        );
    }
}
