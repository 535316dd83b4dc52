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
//! End-to-end tests running the batch jobs over small synthetic datasets.
//!
//! Use the following commands to see the diffs:
//!
//! ```shell
//! cargo test -- --nocapture --test-threads 1 --quiet
//! ```

use std::{fs, path::Path};

use chrono::NaiveDate;
use indicatif::ProgressBar;
use serde::de::DeserializeOwned;
use tempfile::TempDir;

use crate::{
    config::{ymd_to_timestamp, AnalysisConfig},
    util::PathBufExt,
};

mod link_data;
mod rate_adaptation;

pub fn check_diff(what: &str, exp: f64, acq: f64, precision: f64) {
    let diff = (exp - acq).abs();

    if diff < precision {
        eprintln!(
            "{what}: diff {}{:.6}{} (expected {exp}, got {acq})",
            termion::color::Fg(termion::color::Green),
            diff,
            termion::color::Fg(termion::color::Reset),
        );
    } else {
        eprintln!(
            "{what}: diff {}{:.6}{} (expected {exp}, got {acq})",
            termion::color::Fg(termion::color::Red),
            diff,
            termion::color::Fg(termion::color::Reset),
        );
        panic!()
    }
}

pub fn date(s: &str) -> NaiveDate {
    crate::config::parse_date(s).unwrap()
}

/// First snapshot, one hour into the plot window.
pub fn ts1() -> i64 {
    ymd_to_timestamp(date("2020-11-01")) + 3600
}

/// Second snapshot, five minutes later.
pub fn ts2() -> i64 {
    ts1() + 300
}

/// Third snapshot, exactly at midnight after the plot window.
pub fn ts3() -> i64 {
    ymd_to_timestamp(date("2020-11-20"))
}

/// Unparseable snapshot, between the second and the third.
pub const TS_MALFORMED: i64 = 1_605_000_000;

const SNAPSHOT_1: &str = "
fra-1:
  links:
    - {peer: rbx-1, load: 60, label: 1}
    - {peer: rbx-1, load: 30, label: 2}
    - {peer: Telia, load: 5, label: 1}
rbx-1:
  links:
    - {peer: fra-1, load: 80, label: 1}
    - {peer: fra-1, load: 40, label: 2}
";

/// `fra-1_rbx-1_1` is listed twice.
const SNAPSHOT_2: &str = "
fra-1:
  links:
    - {peer: rbx-1, load: 8, label: 1}
    - {peer: rbx-1, load: 12, label: 1}
rbx-1:
  links:
    - {peer: fra-1, load: 4, label: 1}
";

const SNAPSHOT_3: &str = "
fra-1:
  links:
    - {peer: rbx-1, load: 50, label: 1}
";

fn snapshot_name(ts: i64) -> String {
    format!("europe_weathermap_{ts}.yaml")
}

/// Write the synthetic dataset to a temporary directory, together with files that must be
/// ignored or skipped, and return a config pointing to it.
pub fn dataset() -> (TempDir, AnalysisConfig) {
    let dir = tempfile::tempdir().unwrap();
    let europe = dir.path().then("europe");
    fs::create_dir_all(&europe).unwrap();

    // written in reverse to make sure the scan orders by timestamp
    fs::write(europe.clone().then(snapshot_name(ts3())), SNAPSHOT_3).unwrap();
    fs::write(europe.clone().then(snapshot_name(TS_MALFORMED)), "fra-1: [").unwrap();
    fs::write(europe.clone().then(snapshot_name(ts2())), SNAPSHOT_2).unwrap();
    fs::write(europe.clone().then(snapshot_name(ts1())), SNAPSHOT_1).unwrap();
    fs::write(europe.clone().then("europe_weathermap_latest.yaml"), SNAPSHOT_1).unwrap();
    fs::write(europe.clone().then("download.log"), "nothing to see").unwrap();
    fs::create_dir_all(europe.clone().then("old")).unwrap();

    let config = AnalysisConfig {
        dataset_path: europe,
        output_path: dir.path().then("out"),
        progress_every: 1,
        checkpoint_every: 1,
        ..Default::default()
    };
    (dir, config)
}

pub fn progress() -> ProgressBar {
    ProgressBar::hidden()
}

pub fn read_csv<T: DeserializeOwned>(path: impl AsRef<Path>) -> Vec<T> {
    csv::Reader::from_path(path.as_ref())
        .unwrap()
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .unwrap()
}

pub fn header(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}
