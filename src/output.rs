// src/output.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{RevLookupError, RevLookupResult};

/// The shared results file. All workers append complete lines to it; line
/// order across workers is unspecified until the dedup pass rewrites it.
pub struct OutputFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the file at the start of a run.
    pub async fn clear(&self) -> RevLookupResult<()> {
        fs::write(&self.path, b"").await.map_err(|e| RevLookupError::FileError {
            path: self.path.clone(),
            message: format!("Failed to clear output file: {}", e),
        })
    }

    /// Append one line per entry. The write is serialized and flushed as a
    /// whole, so concurrent appenders interleave whole lines only.
    pub async fn append_lines(&self, lines: &[String]) -> RevLookupResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut chunk = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            chunk.push_str(line);
            chunk.push('\n');
        }

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.file_error("Failed to open output file for append", e))?;
        file.write_all(chunk.as_bytes())
            .await
            .map_err(|e| self.file_error("Failed to append to output file", e))?;
        file.flush()
            .await
            .map_err(|e| self.file_error("Failed to flush output file", e))?;

        debug!("Appended {} lines to {}", lines.len(), self.path.display());
        Ok(())
    }

    /// Rewrite the file keeping only the first occurrence of every line.
    /// Returns the unique line count. Idempotent.
    pub async fn dedup_in_place(&self) -> RevLookupResult<usize> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.file_error("Failed to read output file", e))?;

        let unique = dedup_lines(&content);

        let mut rewritten = unique.join("\n");
        if !rewritten.is_empty() {
            rewritten.push('\n');
        }
        fs::write(&self.path, rewritten)
            .await
            .map_err(|e| self.file_error("Failed to rewrite output file", e))?;

        Ok(unique.len())
    }

    fn file_error(&self, message: &str, e: std::io::Error) -> RevLookupError {
        RevLookupError::FileError {
            path: self.path.clone(),
            message: format!("{}: {}", message, e),
        }
    }
}

/// Non-empty trimmed lines, first occurrence order preserved.
pub fn dedup_lines(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if seen.insert(line.to_string()) {
            unique.push(line.to_string());
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_seen_order() {
        assert_eq!(dedup_lines("b\na\nb\nc\na\n"), vec!["b", "a", "c"]);
    }

    #[test]
    fn dedup_drops_blank_and_whitespace_lines() {
        assert_eq!(dedup_lines("x\n\n   \nx\ny\n"), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn append_then_dedup_rewrites_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputFile::new(dir.path().join("results.txt"));

        output.clear().await.unwrap();
        output
            .append_lines(&["b".to_string(), "a".to_string()])
            .await
            .unwrap();
        output
            .append_lines(&["b".to_string(), "c".to_string(), "a".to_string()])
            .await
            .unwrap();

        let unique = output.dedup_in_place().await.unwrap();
        assert_eq!(unique, 3);

        let content = std::fs::read_to_string(output.path()).unwrap();
        assert_eq!(content, "b\na\nc\n");
    }

    #[tokio::test]
    async fn dedup_pass_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputFile::new(dir.path().join("results.txt"));

        output
            .append_lines(&["one.com".to_string(), "two.com".to_string(), "one.com".to_string()])
            .await
            .unwrap();

        let first = output.dedup_in_place().await.unwrap();
        let after_first = std::fs::read_to_string(output.path()).unwrap();
        let second = output.dedup_in_place().await.unwrap();
        let after_second = std::fs::read_to_string(output.path()).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 2);
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn clear_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        std::fs::write(&path, "stale.com\n").unwrap();

        let output = OutputFile::new(&path);
        output.clear().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
