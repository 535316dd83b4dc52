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
//! Resolution of directed observations into bidirectional links.
//!
//! Traffic from `A` to `B` and from `B` to `A` crosses the same physical link, so a link has to
//! be dimensioned for the larger of the two directions. Every unordered pair of endpoints (plus
//! label) yields exactly one [`LinkPair`], such that summaries over pairs never count a link twice.

use std::collections::BTreeMap;

use crate::snapshot::{LinkLoad, Observations};

/// Number of links of `capacity` needed to carry `load`.
pub fn required_links(load: f64, capacity: f64) -> u32 {
    (load / capacity).ceil().max(0.0) as u32
}

/// One physical link (or bundle of parallel links) with the observations of both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPair {
    /// Endpoint with the smaller name.
    pub a: String,
    /// Endpoint with the larger name.
    pub b: String,
    pub label: Option<String>,
    /// Observation from `a` to `b`, if present in the snapshot.
    pub forward: Option<LinkLoad>,
    /// Observation from `b` to `a`, if present in the snapshot.
    pub backward: Option<LinkLoad>,
}

impl LinkPair {
    /// Larger load of the two directions. A missing direction does not contribute.
    pub fn governing_load(&self) -> f64 {
        self.forward
            .iter()
            .chain(self.backward.iter())
            .map(|l| l.load)
            .fold(0.0, f64::max)
    }

    /// Smaller load of the two directions, or the load of the only direction observed.
    ///
    /// This is what a link needs if its mirror is ignored, independent of the host names.
    pub fn one_way_load(&self) -> f64 {
        match (self.forward, self.backward) {
            (Some(fw), Some(bw)) => fw.load.min(bw.load),
            (Some(l), None) | (None, Some(l)) => l.load,
            (None, None) => 0.0,
        }
    }

    /// Sum of the load of both directions.
    pub fn total_load(&self) -> f64 {
        self.forward.iter().chain(self.backward.iter()).map(|l| l.load).sum()
    }

    /// Number of physical links between the endpoints, as seen from the direction listing more.
    pub fn links(&self) -> usize {
        self.forward
            .iter()
            .chain(self.backward.iter())
            .map(|l| l.entries)
            .max()
            .unwrap_or_default()
    }

    /// Links needed to carry both directions.
    pub fn required_links(&self, capacity: f64) -> u32 {
        required_links(self.governing_load(), capacity)
    }

    /// Links needed to carry the lighter direction only. Never more than [`Self::required_links`].
    pub fn required_links_one_way(&self, capacity: f64) -> u32 {
        required_links(self.one_way_load(), capacity)
    }

    pub fn has_mirror(&self) -> bool {
        self.forward.is_some() && self.backward.is_some()
    }
}

/// Pair up every directed observation with its mirror.
pub fn resolve_mirrors(observations: &Observations) -> Vec<LinkPair> {
    let mut pairs: BTreeMap<(&str, &str, Option<&str>), LinkPair> = BTreeMap::new();

    for (id, load) in observations.loads.iter() {
        let forward = id.src <= id.dst;
        let (a, b) = if forward {
            (id.src.as_str(), id.dst.as_str())
        } else {
            (id.dst.as_str(), id.src.as_str())
        };
        let pair = pairs
            .entry((a, b, id.label.as_deref()))
            .or_insert_with(|| LinkPair {
                a: a.to_string(),
                b: b.to_string(),
                label: id.label.clone(),
                forward: None,
                backward: None,
            });
        if forward {
            pair.forward = Some(*load);
        } else {
            pair.backward = Some(*load);
        }
    }

    pairs.into_values().collect()
}
