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
//! Power-optimal rate configurations of a bundle of ports.
//!
//! A bundle of `n` ports connecting two hosts can be configured in many ways: each port at 10, 25
//! or 100 Gbps (or asleep). [`all_port_configs`] enumerates all of them, keeps the cheapest one
//! for each achievable capacity, and drops every configuration for which a larger capacity is
//! available at no extra static power. The remaining [`Frontier`] answers which configuration
//! carries a given load at minimal power.
//!
//! The enumeration is a brute-force Cartesian product over `3^n` (or `4^n` with sleeping) tuples,
//! so it is only meant for a handful of ports.

use std::{collections::BTreeMap, iter};

use itertools::Itertools;

use crate::{
    power_model::{PowerModel, RateTier},
    records::PortConfigRecord,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortConfigError {
    #[error("A load of {load} Gbps exceeds the maximum capacity of {max_capacity} Gbps")]
    CapacityExceeded { load: f64, max_capacity: u32 },
    #[error("A port configuration needs at least one port")]
    NoPorts,
    #[error("Invalid port rate: {0}")]
    InvalidRate(#[from] strum::ParseError),
}

/// Rates of all ports of a bundle, listed in the order in which they absorb load.
#[derive(Debug, Clone, PartialEq)]
pub struct PortConfig {
    pub rates: Vec<RateTier>,
    /// Sum of the port rates, in Gbps.
    pub capacity: u32,
    /// Sum of the static power of the ports, in W.
    pub static_power: f64,
}

impl PortConfig {
    pub fn new(rates: Vec<RateTier>, model: &PowerModel) -> Self {
        let capacity = rates.iter().map(|r| r.gbps()).sum();
        // sum in a canonical order, such that permutations cost exactly the same
        let static_power = rates
            .iter()
            .sorted()
            .map(|r| model.static_power(*r))
            .sum();
        Self {
            rates,
            capacity,
            static_power,
        }
    }

    pub fn num_ports(&self) -> usize {
        self.rates.len()
    }

    /// Load carried by each port: the first ports are filled up to their rate before the next
    /// ones are used.
    pub fn fill(&self, load: f64) -> Vec<f64> {
        let mut left = load.max(0.0);
        self.rates
            .iter()
            .map(|rate| {
                let port_load = left.min(rate.gbps() as f64);
                left -= port_load;
                port_load
            })
            .collect()
    }

    /// Dynamic power when carrying `load`, in W.
    pub fn dynamic_power(&self, load: f64, model: &PowerModel) -> f64 {
        self.rates
            .iter()
            .zip(self.fill(load))
            .map(|(rate, port_load)| port_load * model.dynamic_power(*rate))
            .sum()
    }

    /// Static and dynamic power when carrying `load`, without the idle power of the chassis.
    pub fn power(&self, load: f64, model: &PowerModel) -> f64 {
        self.static_power + self.dynamic_power(load, model)
    }

    /// Rebuild a configuration from its CSV record.
    pub fn from_record(
        record: &PortConfigRecord,
        model: &PowerModel,
    ) -> Result<Self, PortConfigError> {
        let rates = record
            .rates
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<RateTier>, _>>()?;
        Ok(Self::new(rates, model))
    }

    pub fn record(&self) -> PortConfigRecord {
        PortConfigRecord {
            rates: self.rates.iter().join(","),
            max_capacity: self.capacity,
            power: self.static_power,
        }
    }
}

/// Configurations of a fixed number of ports where more capacity always costs more power.
///
/// Sorted by ascending static power, which is also ascending capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontier {
    num_ports: usize,
    allow_sleeping: bool,
    configs: Vec<PortConfig>,
}

impl Frontier {
    pub fn num_ports(&self) -> usize {
        self.num_ports
    }

    pub fn allow_sleeping(&self) -> bool {
        self.allow_sleeping
    }

    pub fn configs(&self) -> &[PortConfig] {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn max_capacity(&self) -> u32 {
        self.configs.last().map(|c| c.capacity).unwrap_or_default()
    }

    /// Cheapest configuration able to carry `load`: the first one with enough capacity.
    pub fn optimal(&self, load: f64) -> Result<&PortConfig, PortConfigError> {
        let i = self.configs.partition_point(|c| (c.capacity as f64) < load);
        self.configs
            .get(i)
            .ok_or(PortConfigError::CapacityExceeded {
                load,
                max_capacity: self.max_capacity(),
            })
    }

    /// Power of the optimal configuration carrying `load`, without the idle power.
    pub fn power(&self, load: f64, model: &PowerModel) -> Result<f64, PortConfigError> {
        Ok(self.optimal(load)?.power(load, model))
    }

    pub fn records(&self) -> impl Iterator<Item = PortConfigRecord> + '_ {
        self.configs.iter().map(PortConfig::record)
    }
}

/// Enumerate all rate assignments of `num_ports` ports and reduce them to the [`Frontier`].
///
/// For each capacity only the cheapest configuration is kept (on a tie, the last one enumerated,
/// which lists the fastest ports first). Then, every configuration is dropped if some larger
/// capacity is available at lower or equal power.
pub fn all_port_configs(
    num_ports: usize,
    allow_sleeping: bool,
    model: &PowerModel,
) -> Result<Frontier, PortConfigError> {
    if num_ports == 0 {
        return Err(PortConfigError::NoPorts);
    }
    let options = RateTier::options(allow_sleeping);

    let mut cheapest: BTreeMap<u32, PortConfig> = BTreeMap::new();
    for rates in iter::repeat(options.iter().copied())
        .take(num_ports)
        .multi_cartesian_product()
    {
        let config = PortConfig::new(rates, model);
        match cheapest.get(&config.capacity) {
            Some(best) if best.static_power < config.static_power => {}
            _ => {
                cheapest.insert(config.capacity, config);
            }
        }
    }

    let mut configs = Vec::new();
    let mut min_power = f64::INFINITY;
    for config in cheapest.into_values().rev() {
        if config.static_power < min_power {
            min_power = config.static_power;
            configs.push(config);
        }
    }
    configs.reverse();

    log::debug!(
        "{} optimal configurations for {num_ports} ports (sleeping: {allow_sleeping})",
        configs.len()
    );
    Ok(Frontier {
        num_ports,
        allow_sleeping,
        configs,
    })
}
