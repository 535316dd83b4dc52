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
//! Potential of putting links to sleep.
//!
//! Parallel links between two hosts are interchangeable, so at each timestamp we fold them into
//! one bundle per host pair and count how many links of nominal capacity the bundle needs. All
//! others could be turned off.

use std::path::PathBuf;

use indicatif::ProgressBar;

use super::{write_records, AggregateError, ScanStats, SnapshotScan};
use crate::{
    config::AnalysisConfig,
    mirror::{resolve_mirrors, LinkPair},
    records::SleepingRecord,
    snapshot::{LinkKeying, Observations},
    util::PathBufExt,
};

pub const OUTPUT_FILE: &str = "link_sleeping.csv";

/// Sleeping potential of a single snapshot, observed per host pair.
pub fn sleeping_record(observations: &Observations, capacity: f64) -> SleepingRecord {
    let pairs = resolve_mirrors(observations);
    SleepingRecord {
        links: pairs.iter().map(LinkPair::links).sum(),
        sum_util: observations.loads.values().map(|l| l.load).sum(),
        req_link_1way: pairs
            .iter()
            .map(|p| p.required_links_one_way(capacity) as u64)
            .sum(),
        req_link_2ways: pairs
            .iter()
            .map(|p| p.required_links(capacity) as u64)
            .sum(),
        timestamp: observations.timestamp,
    }
}

/// One [`SleepingRecord`] per snapshot of the dataset.
pub fn aggregate(
    config: &AnalysisConfig,
    progress: &ProgressBar,
) -> Result<(Vec<SleepingRecord>, ScanStats), AggregateError> {
    let mut records = Vec::new();
    let stats = SnapshotScan::new(config)?.for_each(progress, |snapshot| {
        records.push(sleeping_record(
            &snapshot.observations(LinkKeying::HostPair),
            config.capacity,
        ));
        Ok(())
    })?;
    Ok((records, stats))
}

/// Aggregate the dataset and write `link_sleeping.csv`.
pub fn run(config: &AnalysisConfig, progress: &ProgressBar) -> Result<PathBuf, AggregateError> {
    let (records, _) = aggregate(config, progress)?;
    let path = config.output_path.clone().then(OUTPUT_FILE);
    write_records(&path, records)?;
    log::info!("Sleeping potential written to {path:?}");
    Ok(path)
}
