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
use crate::{
    aggregate::{link_data, metadata},
    capacity::CapacityTiers,
    records::{AllLinkSample, DuplicateRecord, LinkCountsRecord, LinkSample, ParallelLinksRecord},
};

const LINKS: [&str; 5] = [
    "fra-1_Telia_1",
    "fra-1_rbx-1_1",
    "fra-1_rbx-1_2",
    "rbx-1_fra-1_1",
    "rbx-1_fra-1_2",
];

#[test]
fn extract() {
    let (_dir, config) = dataset();
    let extraction = metadata::extract(&config, &progress()).unwrap();
    let out = config.output_path.clone();

    assert_eq!(
        extraction.metadata.iter().map(|m| m.link.as_str()).collect::<Vec<_>>(),
        LINKS
    );
    assert!(!extraction.metadata[0].internal);
    assert!(extraction.metadata[1..].iter().all(|m| m.internal));
    assert_eq!(
        metadata::read_metadata(out.clone().then(metadata::METADATA_FILE)).unwrap(),
        extraction.metadata
    );

    assert_eq!(
        extraction.duplicates,
        vec![DuplicateRecord {
            link: "fra-1_rbx-1_1".to_string(),
            snapshots: 1,
            extra_occurrences: 1,
        }]
    );
    assert_eq!(
        read_csv::<ParallelLinksRecord>(out.clone().then(metadata::PARALLEL_LINKS_FILE)),
        vec![
            ParallelLinksRecord {
                host_a: "Telia".to_string(),
                host_b: "fra-1".to_string(),
                links: 1,
            },
            ParallelLinksRecord {
                host_a: "fra-1".to_string(),
                host_b: "rbx-1".to_string(),
                links: 2,
            },
        ]
    );

    let dir = out.then(link_data::PER_LINK_DIR);
    let series = link_data::read_series(&dir, "fra-1_rbx-1_1").unwrap().unwrap();
    assert_eq!(
        series,
        vec![
            LinkSample {
                timestamp: ts1(),
                load: 60.0,
                bin: 12,
            },
            LinkSample {
                timestamp: ts2(),
                load: 20.0,
                bin: 13,
            },
            LinkSample {
                timestamp: ts3(),
                load: 50.0,
                bin: 0,
            },
        ]
    );
    assert_eq!(
        header(link_data::series_path(&dir, "fra-1_Telia_1").unwrap()),
        "timestamp,load,5-min-bin"
    );
}

#[test]
fn counts() {
    let (_dir, mut config) = dataset();
    metadata::extract(&config, &progress()).unwrap();

    let records = metadata::with_counts(&config, &progress()).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(
        records[1],
        LinkCountsRecord {
            link: "fra-1_rbx-1_1".to_string(),
            capacity: 100,
            internal: true,
            below_10_count: 0,
            below_25_count: 1,
            below_50_count: 0,
            above_50_count: 2,
            total_count: 3,
        }
    );
    assert_eq!(records[0].below_10_count, 1);
    assert_eq!(records[0].total_count, 1);
    assert_eq!(
        read_csv::<LinkCountsRecord>(config.output_path.clone().then(metadata::COUNTS_FILE)),
        records
    );

    config.tiers = CapacityTiers::fine();
    let records = metadata::with_counts(&config, &progress()).unwrap();
    assert_eq!(records[1].below_50_count, 1);
    assert_eq!(records[1].above_50_count, 1);
}

#[test]
fn missing_series_counts_zero() {
    let (_dir, config) = dataset();
    metadata::extract(&config, &progress()).unwrap();
    fs::remove_file(link_data::series_path(
        config.output_path.clone().then(link_data::PER_LINK_DIR),
        "rbx-1_fra-1_2",
    )
    .unwrap())
    .unwrap();

    let records = metadata::with_counts(&config, &progress()).unwrap();
    assert_eq!(records[4].link, "rbx-1_fra-1_2");
    assert_eq!(records[4].total_count, 0);
    assert_eq!(records[4].above_50_count, 0);
}

#[test]
fn concat() {
    let (_dir, config) = dataset();
    metadata::extract(&config, &progress()).unwrap();

    let path = link_data::concat(&config, &progress()).unwrap();
    assert!(path.ends_with("all_link_data_2020-11-01_2020-11-16.csv"));
    assert_eq!(header(&path), "link,timestamp,load,5-min-bin");

    // the third snapshot is after the plot window
    let samples: Vec<AllLinkSample> = read_csv(&path);
    assert_eq!(samples.len(), 7);
    assert!(samples.iter().all(|s| s.timestamp != ts3()));
    assert_eq!(
        samples
            .iter()
            .filter(|s| s.link == "rbx-1_fra-1_1")
            .map(|s| s.load)
            .collect::<Vec<_>>(),
        vec![80.0, 4.0]
    );
    check_diff(
        "total load",
        60.0 + 30.0 + 5.0 + 80.0 + 40.0 + 20.0 + 4.0,
        samples.iter().map(|s| s.load).sum(),
        1e-9,
    );
}

#[test]
fn concat_window_is_strict() {
    let (_dir, mut config) = dataset();
    metadata::extract(&config, &progress()).unwrap();
    config.plot_start = date("2020-11-02");
    config.plot_end = date("2020-11-20");

    let samples: Vec<AllLinkSample> = read_csv(link_data::concat(&config, &progress()).unwrap());
    assert!(samples.is_empty());
}

#[test]
fn series_independent_of_checkpoints() {
    let (_dir, config) = dataset();
    let read_all = |config: &AnalysisConfig| {
        metadata::extract(config, &progress()).unwrap();
        let dir = config.output_path.clone().then(link_data::PER_LINK_DIR);
        LINKS
            .iter()
            .map(|link| fs::read_to_string(link_data::series_path(&dir, link).unwrap()).unwrap())
            .collect::<Vec<_>>()
    };

    let every_snapshot = read_all(&config);
    let at_the_end = read_all(&AnalysisConfig {
        checkpoint_every: 1000,
        ..config.clone()
    });
    assert_eq!(every_snapshot, at_the_end);
    for content in &every_snapshot {
        assert_eq!(content.matches("timestamp").count(), 1);
    }

    let metadata = fs::read_to_string(config.output_path.then(metadata::METADATA_FILE)).unwrap();
    assert!(metadata.contains("fra-1_rbx-1_1,100,true"));
}
