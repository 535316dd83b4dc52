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
use super::*;
use crate::{aggregate::rate_adaptation, records::RateAdaptationRecord};

#[test]
fn within_range() {
    let (_dir, mut config) = dataset();
    config.analysis_start = date("2020-11-01");
    config.analysis_end = date("2020-11-10");

    let path = rate_adaptation::run(&config, &progress()).unwrap();
    assert!(path.ends_with("rate_adaptation_2020-11-01_2020-11-10.csv"));
    assert_eq!(
        header(&path),
        "timestamp,10_count,25_count,100_count,total_count"
    );

    let records: Vec<RateAdaptationRecord> = read_csv(&path);
    assert_eq!(
        records,
        vec![
            // label 1 governed by 80, label 2 by 40, Telia by 5
            RateAdaptationRecord {
                timestamp: ts1(),
                count_10: 1,
                count_25: 0,
                count_100: 2,
                total_count: 3,
            },
            // the duplicate entries sum up to 20
            RateAdaptationRecord {
                timestamp: ts2(),
                count_10: 0,
                count_25: 1,
                count_100: 0,
                total_count: 1,
            },
        ]
    );
}

#[test]
fn end_is_inclusive() {
    let (_dir, mut config) = dataset();
    config.analysis_start = date("2020-11-02");
    config.analysis_end = date("2020-11-20");

    let (records, stats) = rate_adaptation::aggregate(&config, &progress()).unwrap();
    // the malformed snapshot is in range, but skipped
    assert_eq!(stats.out_of_range, 2);
    assert_eq!(stats.skipped, 2);
    assert_eq!(
        records,
        vec![RateAdaptationRecord {
            timestamp: ts3(),
            count_10: 0,
            count_25: 0,
            count_100: 1,
            total_count: 1,
        }]
    );
}

#[test]
fn empty_range() {
    let (_dir, mut config) = dataset();
    config.analysis_start = date("2021-01-01");
    config.analysis_end = date("2021-12-31");
    let (records, stats) = rate_adaptation::aggregate(&config, &progress()).unwrap();
    assert!(records.is_empty());
    assert_eq!(stats.out_of_range, 4);
}
