use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::consolidate::IngestStats;

/// Per-document processing report entry
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileReport {
    /// File path relative to the invocation
    pub path: String,
    /// Number of characters decoded from the file
    pub chars: u64,
    /// Sections produced by the splitter
    pub sections_found: u64,
    /// Sections retained after duplicate detection
    pub sections_accepted: u64,
    /// Sections below the meaningful-length floor
    pub rejected_short: u64,
    /// Exact duplicates of earlier sections
    pub rejected_exact: u64,
    /// Near-duplicates above the similarity threshold
    pub rejected_near: u64,
    /// Sections with no comparable tokens
    pub rejected_empty: u64,
    /// Processing status (processed, skipped, failed)
    pub status: String,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl FileReport {
    pub fn processed(path: &str, chars: u64, stats: &IngestStats) -> Self {
        Self {
            path: path.to_string(),
            chars,
            sections_found: stats.sections_found as u64,
            sections_accepted: stats.sections_accepted as u64,
            rejected_short: stats.rejected_short as u64,
            rejected_exact: stats.rejected_exact as u64,
            rejected_near: stats.rejected_near as u64,
            rejected_empty: stats.rejected_empty as u64,
            status: "processed".to_string(),
            error: None,
        }
    }

    pub fn skipped(path: &str, chars: u64) -> Self {
        Self {
            path: path.to_string(),
            chars,
            sections_found: 0,
            sections_accepted: 0,
            rejected_short: 0,
            rejected_exact: 0,
            rejected_near: 0,
            rejected_empty: 0,
            status: "skipped".to_string(),
            error: None,
        }
    }

    pub fn failed(path: &str, error: String) -> Self {
        Self {
            path: path.to_string(),
            chars: 0,
            sections_found: 0,
            sections_accepted: 0,
            rejected_short: 0,
            rejected_exact: 0,
            rejected_near: 0,
            rejected_empty: 0,
            status: "failed".to_string(),
            error: Some(error),
        }
    }
}

/// Whole-run statistics, persisted as JSON next to the merged document.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub total_files: u64,
    pub sections_considered: u64,
    pub sections_accepted: u64,
    pub duplicates_removed: u64,
    pub output_path: String,
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Persist the report for later inspection.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(path, content).await?;
        Ok(())
    }

    /// Load a previously saved report.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
