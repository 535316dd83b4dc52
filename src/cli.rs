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
//! Command-line arguments shared by all binaries.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

use crate::{
    capacity::CapacityTiers,
    config::{parse_date, AnalysisConfig, InternalNaming},
    NOMINAL_CAPACITY,
};

/// Where the dataset is, where the results go, and which part of it to look at.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Directory containing the snapshot files.
    #[arg(short, long, default_value = "europe")]
    pub dataset_path: PathBuf,
    /// Directory where the CSV files are written.
    #[arg(short, long, default_value = ".")]
    pub output_path: PathBuf,
    /// Start of the rate-adaptation analysis (YYYY-MM-DD), from midnight of that day.
    #[arg(long, default_value = "2020-06-01", value_parser = parse_date)]
    pub analysis_start: NaiveDate,
    /// End of the rate-adaptation analysis (YYYY-MM-DD). Snapshots up to midnight of that day are
    /// included.
    #[arg(long, default_value = "2022-12-27", value_parser = parse_date)]
    pub analysis_end: NaiveDate,
    /// Start of the window exported by the all-link concatenation (YYYY-MM-DD, exclusive).
    #[arg(long, default_value = "2020-11-01", value_parser = parse_date)]
    pub plot_start: NaiveDate,
    /// End of the window exported by the all-link concatenation (YYYY-MM-DD, exclusive).
    #[arg(long, default_value = "2020-11-16", value_parser = parse_date)]
    pub plot_end: NaiveDate,
    /// Width of the time-of-day bins of the per-link series, in seconds.
    #[arg(long, default_value_t = 300)]
    pub bin_size: i64,
    /// Nominal capacity of a link, in Gbps.
    #[arg(long, default_value_t = NOMINAL_CAPACITY)]
    pub capacity: f64,
    /// Also count loads up to 50 Gbps separately in the per-link histograms.
    #[arg(long)]
    pub fine_tiers: bool,
    /// Extension of the snapshot files. Can be given multiple times.
    #[arg(short, long = "extension", default_values = ["yaml", "yml"])]
    pub extensions: Vec<String>,
    /// Host belonging to the own network. Can be given multiple times. If omitted, hosts with a
    /// lowercase first letter are internal.
    #[arg(long = "internal-host")]
    pub internal_hosts: Vec<String>,
    /// Only look at the first few files.
    #[arg(long)]
    pub debug: bool,
    /// Number of files looked at with `--debug`.
    #[arg(long, default_value_t = 10)]
    pub debug_limit: usize,
    /// Log the progress every that many files.
    #[arg(long, default_value_t = 100)]
    pub progress_every: usize,
    /// Flush the link metadata to disk every that many snapshots.
    #[arg(long, default_value_t = 50)]
    pub checkpoint_every: usize,
}

impl DatasetArgs {
    pub fn into_config(self) -> AnalysisConfig {
        let internal = if self.internal_hosts.is_empty() {
            InternalNaming::LowercaseLeading
        } else {
            InternalNaming::Hosts(self.internal_hosts.into_iter().collect())
        };
        if self.analysis_start > self.analysis_end {
            log::warn!(
                "The analysis range {} to {} is empty",
                self.analysis_start,
                self.analysis_end
            );
        }
        AnalysisConfig {
            dataset_path: self.dataset_path,
            output_path: self.output_path,
            analysis_start: self.analysis_start,
            analysis_end: self.analysis_end,
            plot_start: self.plot_start,
            plot_end: self.plot_end,
            bin_size: self.bin_size,
            capacity: self.capacity,
            tiers: if self.fine_tiers {
                CapacityTiers::fine()
            } else {
                CapacityTiers::standard()
            },
            snapshot_extensions: self
                .extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            internal,
            debug: self.debug,
            debug_limit: self.debug_limit,
            progress_every: self.progress_every,
            checkpoint_every: self.checkpoint_every,
        }
    }
}
