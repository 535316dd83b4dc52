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
//! Configuration shared by all batch jobs.

use std::{collections::HashSet, path::PathBuf};

use chrono::{NaiveDate, NaiveTime};

use crate::{capacity::CapacityTiers, NOMINAL_CAPACITY};

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decides whether a host belongs to the operator's own network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InternalNaming {
    /// Internal hosts are named with a lowercase first letter (the convention of the dataset).
    #[default]
    LowercaseLeading,
    /// Internal hosts are exactly the ones listed.
    Hosts(HashSet<String>),
}

impl InternalNaming {
    pub fn is_internal_host(&self, host: &str) -> bool {
        match self {
            Self::LowercaseLeading => host.chars().next().is_some_and(char::is_lowercase),
            Self::Hosts(hosts) => hosts.contains(host),
        }
    }

    /// A link is internal iff both of its endpoints are.
    pub fn is_internal_link(&self, src: &str, dst: &str) -> bool {
        self.is_internal_host(src) && self.is_internal_host(dst)
    }
}

/// Parameters of an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Directory containing one snapshot file per timestamp.
    pub dataset_path: PathBuf,
    /// Directory where all CSV files are written.
    pub output_path: PathBuf,
    /// Start of the rate-adaptation analysis: snapshots from midnight (UTC) of this day.
    pub analysis_start: NaiveDate,
    /// End of the rate-adaptation analysis: snapshots up to midnight (UTC) of this day, included.
    pub analysis_end: NaiveDate,
    /// Start of the window exported by the all-link concatenation (exclusive).
    pub plot_start: NaiveDate,
    /// End of the window exported by the all-link concatenation (exclusive).
    pub plot_end: NaiveDate,
    /// Width of a time-of-day bin, in seconds.
    pub bin_size: i64,
    /// Nominal link capacity in Gbps.
    pub capacity: f64,
    /// Tiers used for the per-link histograms.
    pub tiers: CapacityTiers,
    /// Extensions of files considered snapshots; anything else in the dataset is ignored.
    pub snapshot_extensions: Vec<String>,
    pub internal: InternalNaming,
    /// Stop after `debug_limit` files.
    pub debug: bool,
    pub debug_limit: usize,
    /// Log progress every that many files.
    pub progress_every: usize,
    /// Flush the link metadata to disk every that many files.
    pub checkpoint_every: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("europe"),
            output_path: PathBuf::from("."),
            analysis_start: date(2020, 6, 1),
            analysis_end: date(2022, 12, 27),
            plot_start: date(2020, 11, 1),
            plot_end: date(2020, 11, 16),
            bin_size: 5 * 60,
            capacity: NOMINAL_CAPACITY,
            tiers: CapacityTiers::standard(),
            snapshot_extensions: vec!["yaml".to_string(), "yml".to_string()],
            internal: InternalNaming::default(),
            debug: false,
            debug_limit: 10,
            progress_every: 100,
            checkpoint_every: 50,
        }
    }
}

impl AnalysisConfig {
    pub fn start_ts(&self) -> i64 {
        ymd_to_timestamp(self.analysis_start)
    }

    pub fn end_ts(&self) -> i64 {
        ymd_to_timestamp(self.analysis_end)
    }

    pub fn plot_start_ts(&self) -> i64 {
        ymd_to_timestamp(self.plot_start)
    }

    pub fn plot_end_ts(&self) -> i64 {
        ymd_to_timestamp(self.plot_end)
    }

    /// Whether `timestamp` falls into the analysis range, both ends included.
    pub fn in_analysis_range(&self, timestamp: i64) -> bool {
        (self.start_ts()..=self.end_ts()).contains(&timestamp)
    }

    /// Whether `timestamp` falls strictly inside the plot window.
    pub fn in_plot_range(&self, timestamp: i64) -> bool {
        self.plot_start_ts() < timestamp && timestamp < self.plot_end_ts()
    }

    /// Index of the time-of-day bin `timestamp` falls into.
    pub fn bin(&self, timestamp: i64) -> i64 {
        timestamp.rem_euclid(SECONDS_PER_DAY) / self.bin_size.max(1)
    }

    /// Maximum number of files to look at, if any.
    pub fn file_limit(&self) -> Option<usize> {
        self.debug.then_some(self.debug_limit)
    }

    /// Suffix `_<start>_<end>` of the files restricted to the analysis range.
    pub fn analysis_suffix(&self) -> String {
        format!(
            "{}_{}",
            self.analysis_start.format(DATE_FORMAT),
            self.analysis_end.format(DATE_FORMAT)
        )
    }

    /// Suffix `_<start>_<end>` of the files restricted to the plot window.
    pub fn plot_suffix(&self) -> String {
        format!(
            "{}_{}",
            self.plot_start.format(DATE_FORMAT),
            self.plot_end.format(DATE_FORMAT)
        )
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

/// Unix timestamp of midnight (UTC) of the given day.
pub fn ymd_to_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn naming_convention() {
        let naming = InternalNaming::LowercaseLeading;
        assert!(naming.is_internal_link("fra-fr5-sbb1-nc5", "rbx-g1-nc5"));
        assert!(!naming.is_internal_link("fra-fr5-sbb1-nc5", "Telia"));
        assert!(!naming.is_internal_host(""));

        let naming = InternalNaming::Hosts(["A".to_string()].into_iter().collect());
        assert!(naming.is_internal_host("A"));
        assert!(!naming.is_internal_link("A", "b"));
    }

    #[test]
    fn timestamps() {
        assert_eq!(ymd_to_timestamp(parse_date("1970-01-02").unwrap()), 86400);
        assert!(parse_date("2020/06/01").is_err());

        let config = AnalysisConfig::default();
        assert_eq!(config.start_ts(), 1_590_969_600);
        assert!(config.in_analysis_range(config.start_ts()));
        assert!(config.in_analysis_range(config.end_ts()));
        assert!(!config.in_analysis_range(config.end_ts() + 1));
        assert!(!config.in_plot_range(config.plot_start_ts()));
        assert_eq!(config.analysis_suffix(), "2020-06-01_2022-12-27");
    }

    #[test]
    fn end_date_only_at_midnight() {
        let config = AnalysisConfig {
            analysis_end: date(2020, 11, 20),
            ..Default::default()
        };
        let midnight = ymd_to_timestamp(date(2020, 11, 20));
        assert!(config.in_analysis_range(midnight));
        assert!(!config.in_analysis_range(midnight + SECONDS_PER_DAY / 2));
    }

    #[test]
    fn bins() {
        let config = AnalysisConfig::default();
        assert_eq!(config.bin(0), 0);
        assert_eq!(config.bin(299), 0);
        assert_eq!(config.bin(300), 1);
        assert_eq!(config.bin(SECONDS_PER_DAY + 600), 2);
        assert_eq!(config.bin(SECONDS_PER_DAY - 1), 287);
    }
}
