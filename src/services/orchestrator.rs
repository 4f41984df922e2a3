//! Parallel scan orchestration
//!
//! A bounded pool of workers consumes the discovered candidate sequence.
//! Each unit of work is tagged with its discovery index before dispatch and
//! the aggregate is reassembled in discovery order afterward, so the output
//! sequence is deterministic regardless of completion order. Metadata and
//! duration extraction run under independent timeouts; a failure or timeout
//! in one unit never cancels or corrupts a sibling.

use futures::stream::{FuturesUnordered, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScanOptions;
use crate::error::{ExtractError, ExtractResult, ScanError};
use crate::formats::{classify, strategy_for};
use crate::models::{CandidateFile, Metadata, ScanResult};
use crate::services::{cover_art, file_scanner::FileScanner};

pub struct ScanOrchestrator {
    options: Arc<ScanOptions>,
}

impl ScanOrchestrator {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    /// Scan a directory tree, returning one result per discovered file in
    /// discovery order
    pub async fn scan(&self, root: &Path) -> Result<Vec<ScanResult>, ScanError> {
        let scanner = FileScanner::new((*self.options).clone());
        let candidates = scanner.scan(root)?;
        let total = candidates.len();
        info!(root = %root.display(), files = total, "Starting scan");

        let workers = self.options.max_workers.max(1);
        let mut slots: Vec<Option<ScanResult>> = Vec::new();
        slots.resize_with(total, || None);

        let spawn_unit = |idx: usize, candidate: CandidateFile, options: Arc<ScanOptions>| async move {
            let result = process_unit(candidate, &options).await;
            (idx, result)
        };

        let mut candidate_iter = candidates.into_iter().enumerate();
        let mut tasks = FuturesUnordered::new();

        // Seed the initial batch, then keep the pool full as units complete
        for _ in 0..workers {
            if let Some((idx, candidate)) = candidate_iter.next() {
                tasks.push(spawn_unit(idx, candidate, Arc::clone(&self.options)));
            }
        }
        while let Some((idx, result)) = tasks.next().await {
            slots[idx] = Some(result);
            if let Some((next_idx, candidate)) = candidate_iter.next() {
                tasks.push(spawn_unit(next_idx, candidate, Arc::clone(&self.options)));
            }
        }

        let results: Vec<ScanResult> = slots.into_iter().flatten().collect();
        debug_assert_eq!(results.len(), total);
        info!(
            files = results.len(),
            degraded = results.iter().filter(|r| r.is_degraded()).count(),
            "Scan complete"
        );
        Ok(results)
    }
}

/// Process one unit of work; never fails, never panics across the boundary
async fn process_unit(candidate: CandidateFile, options: &ScanOptions) -> ScanResult {
    let format = classify(&candidate.extension);

    let metadata_path = candidate.path.clone();
    let metadata = run_with_timeout(options.metadata_timeout(), move || {
        strategy_for(format).extract_metadata(&metadata_path)
    })
    .await;
    let (metadata, metadata_error) = match metadata {
        Ok(metadata) => (metadata, false),
        Err(e) => {
            warn!(file = %candidate.path.display(), error = %e, "Metadata extraction failed");
            (Metadata::default(), true)
        }
    };

    let duration_path = candidate.path.clone();
    let duration = run_with_timeout(options.duration_timeout(), move || {
        strategy_for(format).extract_duration(&duration_path)
    })
    .await;
    let (duration, duration_error) = match duration {
        Ok(duration) => (duration, false),
        Err(e) => {
            warn!(file = %candidate.path.display(), error = %e, "Duration extraction failed");
            (None, true)
        }
    };

    let cover_art = if options.extract_cover_art {
        cover_art::resolve(&candidate.path, format, options).await
    } else {
        None
    };

    debug!(
        file = %candidate.path.display(),
        format = ?format,
        title = ?metadata.title,
        duration = ?duration,
        cover = cover_art.is_some(),
        "Unit complete"
    );

    ScanResult {
        path: candidate.path,
        size: candidate.size,
        format,
        metadata,
        duration,
        cover_art,
        metadata_error,
        duration_error,
    }
}

/// Run a blocking extraction under a deadline
///
/// On timeout the unit's partial work is abandoned and the worker freed; the
/// background task finishes on the blocking pool without an observer.
async fn run_with_timeout<T, F>(deadline: Duration, operation: F) -> ExtractResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ExtractResult<T> + Send + 'static,
{
    match tokio::time::timeout(deadline, tokio::task::spawn_blocking(operation)).await {
        Err(_) => Err(ExtractError::Timeout(deadline)),
        Ok(Err(join_error)) => Err(ExtractError::TaskFailed(join_error.to_string())),
        Ok(Ok(result)) => result,
    }
}
