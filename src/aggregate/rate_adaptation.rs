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
//! Potential of adapting the port rate of links to their load.
//!
//! For every link in the analysis range, the larger of its two directions decides the smallest
//! port rate (10, 25 or 100 Gbps) that could carry it.

use std::path::PathBuf;

use indicatif::ProgressBar;

use super::{write_records, AggregateError, ScanStats, SnapshotScan};
use crate::{
    capacity::CapacityTiers,
    config::AnalysisConfig,
    mirror::{resolve_mirrors, LinkPair},
    records::RateAdaptationRecord,
    snapshot::{LinkKeying, Observations},
    util::PathBufExt,
};

/// `rate_adaptation_<start>_<end>.csv`
pub fn output_file(config: &AnalysisConfig) -> String {
    format!("rate_adaptation_{}.csv", config.analysis_suffix())
}

/// Number of links per port rate in a single snapshot, one per labelled link.
pub fn rate_adaptation_record(observations: &Observations) -> RateAdaptationRecord {
    let counts = CapacityTiers::standard().count(
        resolve_mirrors(observations)
            .iter()
            .map(LinkPair::governing_load),
    );
    RateAdaptationRecord {
        timestamp: observations.timestamp,
        count_10: counts.get(10),
        count_25: counts.get(25),
        count_100: counts.get(100),
        total_count: counts.total(),
    }
}

/// One [`RateAdaptationRecord`] per snapshot within the analysis range.
pub fn aggregate(
    config: &AnalysisConfig,
    progress: &ProgressBar,
) -> Result<(Vec<RateAdaptationRecord>, ScanStats), AggregateError> {
    let range = config.start_ts()..=config.end_ts();
    log::info!(
        "Rate adaptation between {} and {}",
        config.analysis_start,
        config.analysis_end
    );

    let mut records = Vec::new();
    let stats = SnapshotScan::with_range(config, Some(range))?.for_each(progress, |snapshot| {
        let observations = snapshot.observations(LinkKeying::Labelled);
        if !observations.duplicates.is_empty() {
            log::debug!(
                "{} duplicate link labels at {}",
                observations.duplicates.len(),
                observations.timestamp
            );
        }
        records.push(rate_adaptation_record(&observations));
        Ok(())
    })?;
    Ok((records, stats))
}

/// Aggregate the analysis range and write `rate_adaptation_<start>_<end>.csv`.
pub fn run(config: &AnalysisConfig, progress: &ProgressBar) -> Result<PathBuf, AggregateError> {
    let (records, _) = aggregate(config, progress)?;
    let path = config.output_path.clone().then(output_file(config));
    write_records(&path, records)?;
    log::info!("Rate adaptation potential written to {path:?}");
    Ok(path)
}
