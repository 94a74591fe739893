use std::path::Path;
use colored::{ColoredString, Colorize};

use crate::target::TargetKind;

const BANNER: &str = r#"
   ██████  ███████ ██    ██ ██       ██████   ██████  ██   ██ ██    ██ ██████
   ██   ██ ██      ██    ██ ██      ██    ██ ██    ██ ██  ██  ██    ██ ██   ██
   ██████  █████   ██    ██ ██      ██    ██ ██    ██ █████   ██    ██ ██████
   ██   ██ ██       ██  ██  ██      ██    ██ ██    ██ ██  ██  ██    ██ ██
   ██   ██ ███████   ████   ███████  ██████   ██████  ██   ██  ██████  ██
"#;

pub fn print_banner() {
    println!("{}", BANNER.cyan());
    println!(
        "    {}",
        "Mixed IP & Domain Reconnaissance Tool".white().bold()
    );
    println!(
        "    {}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".yellow()
    );
}

pub fn print_run_header(target_file: &Path, threads: usize, output_file: &Path) {
    println!("{} {}", "Target file:".cyan(), target_file.display());
    println!("{} {}", "Threads:".cyan(), threads);
    println!("{} {}", "Output:".cyan(), output_file.display());
    println!("{}", "─".repeat(44).bright_black());
}

fn stamp() -> ColoredString {
    chrono::Local::now().format("%H:%M:%S").to_string().cyan()
}

fn kind_tag(kind: TargetKind) -> ColoredString {
    match kind {
        TargetKind::Ip => "IP".blue(),
        TargetKind::Domain => "DOMAIN".magenta(),
    }
}

pub fn status_processing(target: &str, kind: TargetKind) {
    println!(
        "[{}] {} {} - {}",
        stamp(),
        kind_tag(kind),
        target.white(),
        "PROCESSING".yellow()
    );
}

pub fn status_success(target: &str, kind: TargetKind, count: Option<u64>) {
    let count_text = match count {
        Some(count) => format!("({} domains)", count).white().to_string(),
        None => String::new(),
    };
    println!(
        "[{}] {} {} - {} {}",
        stamp(),
        kind_tag(kind),
        target.white(),
        "SUCCESS".green(),
        count_text
    );
}

pub fn status_failed(target: &str, kind: TargetKind) {
    println!(
        "[{}] {} {} - {}",
        stamp(),
        kind_tag(kind),
        target.white(),
        "FAILED".red()
    );
}
