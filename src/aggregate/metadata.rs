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
//! Link metadata and per-link load histograms.
//!
//! The dataset assigns the same `(source, destination, label)` to distinct links in some
//! snapshots. Giving each one a unique label would make it impossible to follow a link across
//! snapshots, so their loads are summed instead. This is pessimistic with respect to the links
//! that can be turned off, and may push a link above 100% utilization. Every collision is
//! reported in `link_duplicate.csv` to keep track of how large the approximation is.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;
use itertools::Itertools;

use super::{
    link_data::{self, SeriesCollector, PER_LINK_DIR},
    append_records, write_records, AggregateError, ScanStats, SnapshotScan,
};
use crate::{
    capacity::TierCounts,
    config::AnalysisConfig,
    records::{
        DuplicateRecord, LinkCountsRecord, LinkMetadataRecord, LinkSample, ParallelLinksRecord,
    },
    snapshot::{LinkId, LinkKeying},
    util::PathBufExt,
};

pub const METADATA_FILE: &str = "link_metadata.csv";
pub const COUNTS_FILE: &str = "link_metadata_withCounts.csv";
pub const DUPLICATE_FILE: &str = "link_duplicate.csv";
pub const PARALLEL_LINKS_FILE: &str = "parallel_links.csv";

/// Link metadata that is periodically appended to disk to bound memory usage.
struct MetadataCheckpoint {
    path: PathBuf,
    buffer: BTreeMap<String, LinkMetadataRecord>,
}

impl MetadataCheckpoint {
    fn create(path: PathBuf) -> Result<Self, AggregateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // clear the file
        fs::File::create(&path)?;
        Ok(Self {
            path,
            buffer: BTreeMap::new(),
        })
    }

    fn insert(&mut self, record: LinkMetadataRecord) {
        if !self.buffer.contains_key(&record.link) {
            self.buffer.insert(record.link.clone(), record);
        }
    }

    /// Append the buffer (without header) and clear it.
    fn flush(&mut self) -> Result<(), AggregateError> {
        append_records(&self.path, self.buffer.values())?;
        log::debug!("Flushed {} metadata records", self.buffer.len());
        self.buffer.clear();
        Ok(())
    }

    /// Flush, then rewrite the file deduplicated, sorted by link, and with a header.
    fn finish(mut self) -> Result<Vec<LinkMetadataRecord>, AggregateError> {
        self.flush()?;
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        let mut records = BTreeMap::new();
        for record in csv.deserialize() {
            let record: LinkMetadataRecord = record?;
            records.entry(record.link.clone()).or_insert(record);
        }
        let records = records.into_values().collect_vec();
        write_records(&self.path, &records)?;
        Ok(records)
    }
}

/// Result of [`extract`].
#[derive(Debug, Clone)]
pub struct Extraction {
    pub metadata: Vec<LinkMetadataRecord>,
    pub duplicates: Vec<DuplicateRecord>,
    pub parallel_links: Vec<ParallelLinksRecord>,
    pub stats: ScanStats,
}

/// Fold the duplicate identities of one snapshot into the audit list.
fn record_duplicates(audit: &mut BTreeMap<String, DuplicateRecord>, duplicates: &[LinkId]) {
    for (id, extra) in duplicates.iter().counts() {
        let link = id.to_string();
        let record = audit.entry(link.clone()).or_insert(DuplicateRecord {
            link,
            snapshots: 0,
            extra_occurrences: 0,
        });
        record.snapshots += 1;
        record.extra_occurrences += extra;
    }
}

/// Extract the metadata and time series of every link in the dataset.
///
/// Writes `link_metadata.csv`, `link_duplicate.csv`, `parallel_links.csv`, and one series per
/// link to `per-link-data/`.
pub fn extract(config: &AnalysisConfig, progress: &ProgressBar) -> Result<Extraction, AggregateError> {
    let output = config.output_path.as_path();
    let mut checkpoint = MetadataCheckpoint::create(output.then(METADATA_FILE))?;
    let series_dir = output.then(PER_LINK_DIR);
    let mut series = SeriesCollector::default();
    let mut duplicates = BTreeMap::new();
    let mut labels: BTreeMap<(String, String), BTreeSet<Option<String>>> = BTreeMap::new();
    let checkpoint_every = config.checkpoint_every.max(1);
    let mut num_snapshots = 0;

    log::info!("Extracting per-link utilization and metadata...");
    let stats = SnapshotScan::new(config)?.for_each(progress, |snapshot| {
        let observations = snapshot.observations(LinkKeying::Labelled);
        let bin = config.bin(observations.timestamp);

        for (id, load) in observations.loads.iter() {
            let link = id.to_string();
            checkpoint.insert(LinkMetadataRecord {
                link: link.clone(),
                capacity: config.capacity.round() as u32,
                internal: id.is_internal(&config.internal),
            });
            series.push(
                &link,
                LinkSample {
                    timestamp: observations.timestamp,
                    load: load.load,
                    bin,
                },
            );
            let hosts = if id.src <= id.dst {
                (id.src.clone(), id.dst.clone())
            } else {
                (id.dst.clone(), id.src.clone())
            };
            labels.entry(hosts).or_default().insert(id.label.clone());
        }
        record_duplicates(&mut duplicates, &observations.duplicates);

        num_snapshots += 1;
        if num_snapshots % checkpoint_every == 0 {
            checkpoint.flush()?;
            series.flush(&series_dir)?;
        }
        Ok(())
    })?;

    log::info!("... saving final metadata");
    let metadata = checkpoint.finish()?;
    series.write(&series_dir)?;

    let duplicates = duplicates.into_values().collect_vec();
    if !duplicates.is_empty() {
        log::warn!(
            "{} link identities are used by more than one link",
            duplicates.len()
        );
    }
    write_records(output.then(DUPLICATE_FILE), &duplicates)?;

    let parallel_links = labels
        .into_iter()
        .map(|((host_a, host_b), labels)| ParallelLinksRecord {
            host_a,
            host_b,
            links: labels.len(),
        })
        .collect_vec();
    write_records(output.then(PARALLEL_LINKS_FILE), &parallel_links)?;

    log::info!("... done.");
    Ok(Extraction {
        metadata,
        duplicates,
        parallel_links,
        stats,
    })
}

/// Read a `link_metadata.csv` file.
pub fn read_metadata(path: impl AsRef<Path>) -> Result<Vec<LinkMetadataRecord>, AggregateError> {
    let mut csv = csv::Reader::from_path(path.as_ref())?;
    let records = csv
        .deserialize()
        .collect::<Result<Vec<LinkMetadataRecord>, _>>()?;
    Ok(records)
}

/// Extend the metadata with the histogram of each link's load over its whole time series.
///
/// Needs the outputs of [`extract`]. Links without a time series get all-zero counts. In debug
/// mode, only the first links are counted.
pub fn with_counts(
    config: &AnalysisConfig,
    progress: &ProgressBar,
) -> Result<Vec<LinkCountsRecord>, AggregateError> {
    let output = config.output_path.as_path();
    let metadata = read_metadata(output.then(METADATA_FILE))?;
    let dir = output.then(PER_LINK_DIR);
    let limit = config.file_limit().unwrap_or(usize::MAX);
    let total = metadata.len();

    log::info!("Add the link utilization counters...");
    progress.set_length(total as u64);

    let mut records = Vec::with_capacity(total);
    for (i, link) in metadata.into_iter().enumerate() {
        let counts = if i < limit {
            match link_data::read_series(&dir, &link.link)? {
                Some(samples) => config.tiers.count(samples.iter().map(|s| s.load)),
                None => {
                    log::warn!("No time series for {}", link.link);
                    TierCounts::new(&config.tiers)
                }
            }
        } else {
            TierCounts::new(&config.tiers)
        };
        records.push(LinkCountsRecord::new(link, &counts));

        progress.inc(1);
        if (i + 1) % config.progress_every.max(1) == 0 {
            log::info!("#links counted: {} (out of {total})", i + 1);
        }
    }
    progress.finish();

    write_records(output.then(COUNTS_FILE), &records)?;
    log::info!("... done.");
    Ok(records)
}
