//! Scan configuration
//!
//! Defaults mirror the historical behavior: four workers, 5 second timeouts
//! for metadata and duration extraction, cover art enabled. Options load from
//! a TOML file and may be overridden per call.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Options controlling discovery, extraction, and external tool invocation
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    /// Extensions yielded by the path filter (lowercase, no leading dot)
    pub extensions: Vec<String>,
    /// Directory names pruned from descent entirely
    pub exclude_dirs: Vec<String>,
    /// File names excluded from results (exact match)
    pub exclude_files: Vec<String>,
    /// Bounded worker pool size
    pub max_workers: usize,
    /// Deadline for tag metadata extraction, per file
    pub metadata_timeout_secs: u64,
    /// Deadline for duration extraction, per file
    pub duration_timeout_secs: u64,
    /// Deadline for each external tool invocation in the cover art chain
    pub tool_timeout_secs: u64,
    /// Run the cover art resolver during scans
    pub extract_cover_art: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "wav", "flac", "m4a", "ogg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: [".git", ".svn", "node_modules", "vendor", "tmp", "log"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_files: [".DS_Store", "Thumbs.db"].iter().map(|s| s.to_string()).collect(),
            max_workers: 4,
            metadata_timeout_secs: 5,
            duration_timeout_secs: 5,
            tool_timeout_secs: 5,
            extract_cover_art: true,
        }
    }
}

impl ScanOptions {
    /// Load options from a TOML file, falling back to defaults for absent keys
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let options: ScanOptions = toml::from_str(&raw)?;
        info!(config = %path.display(), "Loaded scan options");
        Ok(options)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn duration_timeout(&self) -> Duration {
        Duration::from_secs(self.duration_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// True when the filter should yield files with this extension
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }
}
