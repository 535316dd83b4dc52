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
//! Power of a bundle of ports under different adaptation strategies, as a function of its load.
//!
//! - `idle`: the chassis alone, as a lower bound.
//! - `no_adaptation`: all ports at 100G.
//! - `sleeping`: just enough ports at 100G to carry the load, the others asleep.
//! - `rate_adaptation`: all ports at the same rate, the smallest one carrying an even share.
//! - `opt_rate_adaptation`: the power-optimal mix of rates (see [`crate::port_config`]).
//! - `opt_rate_adaptation_sleep`: the same, where ports may also sleep.

use crate::{
    capacity::CapacityTiers,
    port_config::{all_port_configs, Frontier, PortConfigError},
    power_model::{PowerModel, RateTier},
    records::StrategyRecord,
    NOMINAL_CAPACITY,
};

/// Maximum loads compared when nothing else is requested, in Gbps.
pub const DEFAULT_MAX_LOADS: [f64; 3] = [100.0, 200.0, 400.0];
/// Number of evenly spaced loads evaluated per comparison.
pub const DEFAULT_DATAPOINTS: usize = 101;

/// `compare_strategies_<n>ports.csv`
pub fn output_file(num_ports: usize) -> String {
    format!("compare_strategies_{num_ports}ports.csv")
}

/// `port_configs_<n>ports.csv`, or `port_configs_<n>ports_sleep.csv`
pub fn frontier_file(num_ports: usize, allow_sleeping: bool) -> String {
    if allow_sleeping {
        format!("port_configs_{num_ports}ports_sleep.csv")
    } else {
        format!("port_configs_{num_ports}ports.csv")
    }
}

/// Number of 100G ports needed to carry `max_load` (at least one).
pub fn ports_for_load(max_load: f64) -> usize {
    ((max_load / NOMINAL_CAPACITY).ceil() as usize).max(1)
}

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Evaluates all strategies for a fixed number of ports.
#[derive(Debug, Clone)]
pub struct Strategies<'a> {
    model: &'a PowerModel,
    num_ports: usize,
    tiers: CapacityTiers,
    frontier: Frontier,
    frontier_sleep: Frontier,
}

impl<'a> Strategies<'a> {
    pub fn new(num_ports: usize, model: &'a PowerModel) -> Result<Self, PortConfigError> {
        Ok(Self {
            model,
            num_ports,
            tiers: CapacityTiers::standard(),
            frontier: all_port_configs(num_ports, false, model)?,
            frontier_sleep: all_port_configs(num_ports, true, model)?,
        })
    }

    pub fn frontier(&self, allow_sleeping: bool) -> &Frontier {
        if allow_sleeping {
            &self.frontier_sleep
        } else {
            &self.frontier
        }
    }

    /// Power of `count` ports at rate `tier` carrying `load` together, plus the idle power.
    fn uniform(&self, tier: RateTier, count: usize, load: f64) -> f64 {
        self.model.idle_power
            + count as f64 * self.model.static_power(tier)
            + load * self.model.dynamic_power(tier)
    }

    pub fn evaluate(&self, load: f64) -> Result<StrategyRecord, PortConfigError> {
        let idle = self.model.idle_power;
        let n = self.num_ports;

        let awake = (load / NOMINAL_CAPACITY).ceil().max(0.0) as usize;
        let shared_rate = RateTier::from_gbps(self.tiers.bound(load / n as f64))
            .unwrap_or(RateTier::G100);

        Ok(StrategyRecord {
            load,
            idle,
            no_adaptation: self.uniform(RateTier::G100, n, load),
            sleeping: self.uniform(RateTier::G100, awake, load),
            rate_adaptation: self.uniform(shared_rate, n, load),
            opt_rate_adaptation: idle + self.frontier.power(load, self.model)?,
            opt_rate_adaptation_sleep: idle + self.frontier_sleep.power(load, self.model)?,
        })
    }
}

/// Power of every strategy at `datapoints` loads evenly spaced between 0 and `max_load`.
///
/// Fails if `max_load` exceeds the capacity of `num_ports` ports at 100G.
pub fn compare_strategies(
    max_load: f64,
    num_ports: usize,
    datapoints: usize,
    model: &PowerModel,
) -> Result<Vec<StrategyRecord>, PortConfigError> {
    let strategies = Strategies::new(num_ports, model)?;
    linspace(0.0, max_load, datapoints)
        .into_iter()
        .map(|load| strategies.evaluate(load))
        .collect()
}
