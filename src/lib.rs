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
//! Library for estimating the energy savings of putting backbone links to sleep and of adapting
//! the port rate of links to their observed load.
//!
//! The pipeline reads a directory of network snapshots (one YAML file per timestamp, listing the
//! load of every directed link), folds them into per-link and per-timestamp summaries, and writes
//! them to CSV. Independently, [`port_config`] enumerates power-optimal multi-port rate
//! assignments under the linear [`power_model`], which [`strategies`] uses to compare adaptation
//! strategies.

pub mod aggregate;
pub mod capacity;
pub mod cli;
pub mod config;
pub mod mirror;
pub mod port_config;
pub mod power_model;
pub mod records;
pub mod snapshot;
pub mod strategies;
pub mod util;

#[cfg(test)]
mod test;

/// Nominal capacity of every link in the dataset, in Gbps.
pub const NOMINAL_CAPACITY: f64 = 100.0;

pub mod prelude {
    pub use super::{
        aggregate::{ScanStats, SnapshotScan},
        capacity::{CapacityTiers, TierCounts},
        config::{AnalysisConfig, InternalNaming},
        mirror::{resolve_mirrors, LinkPair},
        port_config::{all_port_configs, Frontier, PortConfig, PortConfigError},
        power_model::{PowerModel, RateTier},
        snapshot::{LinkId, LinkKeying, Observations, Snapshot},
    };
}
