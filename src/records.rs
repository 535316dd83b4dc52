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
//! Module defining the record types (de-)serialized to the CSV outputs.

use serde::{Deserialize, Serialize};

use crate::capacity::TierCounts;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// Potential of putting links to sleep at one timestamp.
pub struct SleepingRecord {
    /// Number of physical links.
    #[serde(rename = "#links")]
    pub links: usize,
    /// Sum of the load of all directed links.
    pub sum_util: f64,
    /// Links required when each link only carries its lighter direction.
    pub req_link_1way: u64,
    /// Links required when both directions of each link are considered.
    pub req_link_2ways: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Number of links whose load fits each port rate at one timestamp.
pub struct RateAdaptationRecord {
    pub timestamp: i64,
    #[serde(rename = "10_count")]
    pub count_10: usize,
    #[serde(rename = "25_count")]
    pub count_25: usize,
    #[serde(rename = "100_count")]
    pub count_100: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// Static description of a directed link.
pub struct LinkMetadataRecord {
    pub link: String,
    /// Nominal capacity in Gbps.
    pub capacity: u32,
    pub internal: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// Link metadata extended with the histogram of its load over the whole dataset.
pub struct LinkCountsRecord {
    pub link: String,
    /// Nominal capacity in Gbps.
    pub capacity: u32,
    pub internal: bool,
    pub below_10_count: usize,
    pub below_25_count: usize,
    pub below_50_count: usize,
    pub above_50_count: usize,
    pub total_count: usize,
}

impl LinkCountsRecord {
    pub fn new(metadata: LinkMetadataRecord, counts: &TierCounts) -> Self {
        Self {
            link: metadata.link,
            capacity: metadata.capacity,
            internal: metadata.internal,
            below_10_count: counts.get(10),
            below_25_count: counts.get(25),
            below_50_count: counts.get(50),
            above_50_count: counts.get(100),
            total_count: counts.total(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Link identity that was assigned to more than one link in some snapshots.
pub struct DuplicateRecord {
    pub link: String,
    /// Number of snapshots in which the identity collided.
    pub snapshots: usize,
    /// Number of entries beyond the first, summed over all snapshots.
    pub extra_occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// Load of one link at one timestamp.
pub struct LinkSample {
    pub timestamp: i64,
    pub load: f64,
    /// Time-of-day bin of the timestamp.
    #[serde(rename = "5-min-bin")]
    pub bin: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// [`LinkSample`] tagged with its link, for the concatenation of all links.
pub struct AllLinkSample {
    pub link: String,
    pub timestamp: i64,
    pub load: f64,
    #[serde(rename = "5-min-bin")]
    pub bin: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Number of links connecting two hosts.
pub struct ParallelLinksRecord {
    pub host_a: String,
    pub host_b: String,
    pub links: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// One configuration of the port-configuration frontier.
pub struct PortConfigRecord {
    /// Port rates in Gbps, separated by `,`.
    pub rates: String,
    pub max_capacity: u32,
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// Total power in W of each adaptation strategy at one load.
pub struct StrategyRecord {
    pub load: f64,
    pub idle: f64,
    pub no_adaptation: f64,
    pub sleeping: f64,
    pub rate_adaptation: f64,
    pub opt_rate_adaptation: f64,
    pub opt_rate_adaptation_sleep: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serialize_sleeping_record() {
        let x = SleepingRecord {
            links: 3,
            sum_util: 12.5,
            req_link_1way: 1,
            req_link_2ways: 2,
            timestamp: 1606780800,
        };

        let mut csv = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);
        csv.serialize(&x).unwrap();
        csv.flush().unwrap();
        let ser = String::from_utf8(csv.into_inner().unwrap()).unwrap();
        assert_eq!(
            ser,
            "#links,sum_util,req_link_1way,req_link_2ways,timestamp\n3,12.5,1,2,1606780800\n"
        );

        let mut csv = csv::Reader::from_reader(ser.as_bytes());
        let de: SleepingRecord = csv.deserialize().next().unwrap().unwrap();
        assert_eq!(de, x);
    }

    #[test]
    fn serialize_rate_adaptation_record() {
        let mut csv = csv::Writer::from_writer(vec![]);
        csv.serialize(RateAdaptationRecord {
            timestamp: 0,
            count_10: 1,
            count_25: 0,
            count_100: 2,
            total_count: 3,
        })
        .unwrap();
        let ser = String::from_utf8(csv.into_inner().unwrap()).unwrap();
        assert_eq!(
            ser,
            "timestamp,10_count,25_count,100_count,total_count\n0,1,0,2,3\n"
        );
    }

    #[test]
    fn serialize_link_sample() {
        let mut csv = csv::Writer::from_writer(vec![]);
        csv.serialize(LinkSample {
            timestamp: 600,
            load: 1.5,
            bin: 2,
        })
        .unwrap();
        let ser = String::from_utf8(csv.into_inner().unwrap()).unwrap();
        assert_eq!(ser, "timestamp,load,5-min-bin\n600,1.5,2\n");
    }
}
