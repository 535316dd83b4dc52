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
//! Per-link time series, stored as one CSV file per directed link.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;

use super::{append_records, metadata, write_records, AggregateError};
use crate::{
    config::AnalysisConfig,
    records::{AllLinkSample, LinkSample},
    util::{csv_writer, PathBufExt},
};

/// Directory (below the output path) holding one series per link.
pub const PER_LINK_DIR: &str = "per-link-data";

/// `all_link_data_<plot_start>_<plot_end>.csv`
pub fn all_link_file(config: &AnalysisConfig) -> String {
    format!("all_link_data_{}.csv", config.plot_suffix())
}

/// `<dir>/<link>.csv`. Fails if `link` would point outside of `dir`.
pub fn series_path(dir: impl AsRef<Path>, link: &str) -> Result<PathBuf, AggregateError> {
    if link.is_empty() || link == "." || link == ".." || link.contains(['/', '\\']) {
        return Err(AggregateError::InvalidLink(link.to_string()));
    }
    Ok(dir.as_ref().then(format!("{link}.csv")))
}

/// Time series of all links, buffered in memory and appended to disk on every [`Self::flush`].
#[derive(Debug, Clone, Default)]
pub struct SeriesCollector {
    series: BTreeMap<String, Vec<LinkSample>>,
    written: BTreeSet<String>,
}

impl SeriesCollector {
    pub fn push(&mut self, link: &str, sample: LinkSample) {
        match self.series.get_mut(link) {
            Some(samples) => samples.push(sample),
            None => {
                self.series.insert(link.to_string(), vec![sample]);
            }
        }
    }

    /// Number of links with buffered samples.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, link: &str) -> Option<&[LinkSample]> {
        self.series.get(link).map(Vec::as_slice)
    }

    /// Append the buffered samples of each link, sorted by timestamp, to `<dir>/<link>.csv` and
    /// clear the buffer. The first flush of a link replaces the file and writes the header.
    pub fn flush(&mut self, dir: impl AsRef<Path>) -> Result<(), AggregateError> {
        let dir = dir.as_ref();
        for (link, mut samples) in std::mem::take(&mut self.series) {
            samples.sort_by_key(|s| s.timestamp);
            let path = series_path(dir, &link)?;
            if self.written.contains(&link) {
                append_records(path, samples)?;
            } else {
                write_records(path, samples)?;
                self.written.insert(link);
            }
        }
        Ok(())
    }

    /// Flush what is left, and return the number of links written.
    pub fn write(mut self, dir: impl AsRef<Path>) -> Result<usize, AggregateError> {
        let dir = dir.as_ref();
        self.flush(dir)?;
        let num_links = self.written.len();
        log::info!("Wrote the time series of {num_links} links to {dir:?}");
        Ok(num_links)
    }
}

/// Read the series of `link`, or `None` if it has never been written.
pub fn read_series(
    dir: impl AsRef<Path>,
    link: &str,
) -> Result<Option<Vec<LinkSample>>, AggregateError> {
    let path = series_path(dir, link)?;
    if !path.exists() {
        return Ok(None);
    }
    let mut csv = csv::Reader::from_path(&path)?;
    let samples = csv.deserialize().collect::<Result<Vec<LinkSample>, _>>()?;
    Ok(Some(samples))
}

/// Concatenate the series of all links in the metadata, restricted to the plot window.
pub fn concat(config: &AnalysisConfig, progress: &ProgressBar) -> Result<PathBuf, AggregateError> {
    let output = &config.output_path;
    let links = metadata::read_metadata(output.clone().then(metadata::METADATA_FILE))?;
    let dir = output.clone().then(PER_LINK_DIR);
    let path = output.clone().then(all_link_file(config));
    let limit = config.file_limit().unwrap_or(usize::MAX);

    log::info!(
        "Concatenating {} links between {} and {}",
        links.len(),
        config.plot_start,
        config.plot_end
    );
    progress.set_length(links.len().min(limit) as u64);

    let mut csv = csv_writer(&path)?;
    for (i, link) in links.into_iter().take(limit).enumerate() {
        let Some(samples) = read_series(&dir, &link.link)? else {
            log::warn!("No time series for {}", link.link);
            continue;
        };
        for sample in samples
            .into_iter()
            .filter(|s| config.in_plot_range(s.timestamp))
        {
            csv.serialize(AllLinkSample {
                link: link.link.clone(),
                timestamp: sample.timestamp,
                load: sample.load,
                bin: sample.bin,
            })?;
        }

        progress.inc(1);
        if (i + 1) % config.progress_every.max(1) == 0 {
            log::info!("#links concatenated: {}", i + 1);
        }
    }
    csv.flush()?;
    progress.finish();

    log::info!("All link data written to {path:?}");
    Ok(path)
}
