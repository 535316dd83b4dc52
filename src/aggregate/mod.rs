// LINKPOWER: Energy Savings of Link Sleeping and Rate Adaptation in Backbone Networks
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Batch jobs folding the snapshot directory into summary tables.
//!
//! All jobs share [`SnapshotScan`], which lists the dataset, orders the snapshots by timestamp,
//! and feeds them one by one to the job. A snapshot that cannot be read or parsed is logged and
//! skipped; only failures to write the outputs abort a job.

pub mod link_data;
pub mod metadata;
pub mod rate_adaptation;
pub mod sleeping;

use std::{
    fs::{self, OpenOptions},
    io,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;
use serde::Serialize;

use crate::{
    config::AnalysisConfig,
    snapshot::{timestamp_from_path, Snapshot, SnapshotError},
    util::csv_writer,
};

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("Cannot list the dataset at {0:?}: {1}")]
    Dataset(PathBuf, io::Error),
    #[error("Link name {0:?} cannot be used as a file name")]
    InvalidLink(String),
}

/// What happened to the files of the dataset during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files found in the dataset directory.
    pub files: usize,
    /// Files ignored because of their extension.
    pub filtered: usize,
    /// Snapshots outside the requested time range.
    pub out_of_range: usize,
    /// Snapshots left out by the debug limit.
    pub truncated: usize,
    /// Snapshots that could not be read or parsed.
    pub skipped: usize,
    /// Snapshots handed to the job.
    pub parsed: usize,
}

/// Ordered list of the snapshots a job runs over.
#[derive(Debug, Clone)]
pub struct SnapshotScan {
    snapshots: Vec<(i64, PathBuf)>,
    stats: ScanStats,
    progress_every: usize,
}

impl SnapshotScan {
    /// List all snapshots of the dataset in `config`, sorted by timestamp.
    pub fn new(config: &AnalysisConfig) -> Result<Self, AggregateError> {
        Self::with_range(config, None)
    }

    /// List the snapshots of the dataset whose timestamp lies in `range`.
    pub fn with_range(
        config: &AnalysisConfig,
        range: Option<RangeInclusive<i64>>,
    ) -> Result<Self, AggregateError> {
        let dataset = config.dataset_path.as_path();
        let mut stats = ScanStats::default();
        let mut snapshots = Vec::new();

        let entries =
            fs::read_dir(dataset).map_err(|e| AggregateError::Dataset(dataset.to_path_buf(), e))?;
        for entry in entries {
            let path = entry
                .map_err(|e| AggregateError::Dataset(dataset.to_path_buf(), e))?
                .path();
            if !path.is_file() {
                continue;
            }
            stats.files += 1;

            if !has_extension(&path, &config.snapshot_extensions) {
                log::debug!("Ignoring {path:?}");
                stats.filtered += 1;
                continue;
            }

            match timestamp_from_path(&path) {
                Ok(ts) if range.as_ref().is_some_and(|r| !r.contains(&ts)) => {
                    stats.out_of_range += 1;
                }
                Ok(ts) => snapshots.push((ts, path)),
                Err(e) => {
                    log::warn!("Skipping {path:?}: {e}");
                    stats.skipped += 1;
                }
            }
        }

        snapshots.sort();
        if let Some(limit) = config.file_limit() {
            stats.truncated = snapshots.len().saturating_sub(limit);
            snapshots.truncate(limit);
        }

        Ok(Self {
            snapshots,
            stats,
            progress_every: config.progress_every.max(1),
        })
    }

    /// Number of snapshots the scan will visit.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.snapshots.iter().map(|(_, path)| path.as_path())
    }

    /// Parse every snapshot in order and pass it to `f`. Errors returned by `f` abort the scan.
    pub fn for_each<F>(self, progress: &ProgressBar, mut f: F) -> Result<ScanStats, AggregateError>
    where
        F: FnMut(Snapshot) -> Result<(), AggregateError>,
    {
        let mut stats = self.stats;
        let total = self.snapshots.len();
        progress.set_length(total as u64);

        for (i, (_, path)) in self.snapshots.into_iter().enumerate() {
            match Snapshot::from_path(&path) {
                Ok(snapshot) => {
                    f(snapshot)?;
                    stats.parsed += 1;
                }
                Err(e) => {
                    log::warn!("Skipping {path:?}: {e}");
                    stats.skipped += 1;
                }
            }

            progress.inc(1);
            if (i + 1) % self.progress_every == 0 {
                log::info!("#files parsed: {} (out of {total})", i + 1);
            }
        }
        progress.finish();

        log::info!(
            "Done with {} snapshots ({} skipped, {} out of range, {} other files)",
            stats.parsed,
            stats.skipped,
            stats.out_of_range,
            stats.filtered
        );
        Ok(stats)
    }
}

/// Write `records` to a fresh CSV file at `path`.
pub fn write_records<T: Serialize>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = T>,
) -> Result<(), AggregateError> {
    let mut csv = csv_writer(path.as_ref())?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Append `records` to the CSV file at `path`, without a header row.
pub fn append_records<T: Serialize>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = T>,
) -> Result<(), AggregateError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?,
    );
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extensions() {
        let extensions = vec!["yaml".to_string(), "yml".to_string()];
        assert!(has_extension(Path::new("a_b_1.yaml"), &extensions));
        assert!(has_extension(Path::new("a_b_1.YML"), &extensions));
        assert!(!has_extension(Path::new("a_b_1.log"), &extensions));
        assert!(!has_extension(Path::new("a_b_1"), &extensions));
    }
}
