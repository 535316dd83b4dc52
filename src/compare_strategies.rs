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
//! Compare the power drawn by a bundle of ports under the different adaptation strategies, and
//! dump the power-optimal port configurations.
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use strum::IntoEnumIterator;

use linkpower::{
    aggregate::write_records,
    power_model::{Calibration, PowerModel, RateTier},
    strategies::{self, Strategies, DEFAULT_DATAPOINTS, DEFAULT_MAX_LOADS},
    util::{self, PathBufExt},
};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Directory where the CSV files are written.
    #[arg(short, long, default_value = ".")]
    output_path: PathBuf,
    /// Maximum load of a comparison, in Gbps. Can be given multiple times.
    #[arg(short, long = "max-load", default_values_t = DEFAULT_MAX_LOADS)]
    max_loads: Vec<f64>,
    /// Number of ports. Defaults to just enough 100G ports for the maximum load.
    #[arg(short, long)]
    num_ports: Option<usize>,
    /// Number of evenly spaced loads evaluated.
    #[arg(long, default_value_t = DEFAULT_DATAPOINTS)]
    datapoints: usize,
}

fn log_calibration(model: &PowerModel) {
    let calibration = Calibration::wedge();
    log::info!(
        "Load profile at 100G: {:.4} W/Gbps over {} active ports",
        calibration.profile_slope(),
        calibration.num_active_ports
    );
    for tier in RateTier::iter().filter(|t| *t != RateTier::Off) {
        log::info!(
            "{tier:>3}G: static {:.2} W, dynamic {:.3} W/Gbps (measured {:.4})",
            model.static_power(tier),
            model.dynamic_power(tier),
            calibration.dynamic_power(tier)
        );
    }
}

fn main() -> anyhow::Result<()> {
    util::init_logging();
    let args = Args::parse();
    let model = PowerModel::wedge();
    log_calibration(&model);

    for max_load in args.max_loads {
        let num_ports = args
            .num_ports
            .unwrap_or_else(|| strategies::ports_for_load(max_load));
        log::info!("Comparing strategies up to {max_load} Gbps on {num_ports} ports");

        let comparison = Strategies::new(num_ports, &model)?;
        for allow_sleeping in [false, true] {
            let frontier = comparison.frontier(allow_sleeping);
            let path = args
                .output_path
                .clone()
                .then(strategies::frontier_file(num_ports, allow_sleeping));
            write_records(&path, frontier.records())
                .with_context(|| format!("writing {path:?}"))?;
            log::debug!("{} configurations written to {path:?}", frontier.len());
        }

        let records = strategies::linspace(0.0, max_load, args.datapoints)
            .into_iter()
            .map(|load| comparison.evaluate(load))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{num_ports} ports cannot carry {max_load} Gbps"))?;
        let path = args
            .output_path
            .clone()
            .then(strategies::output_file(num_ports));
        write_records(&path, records).with_context(|| format!("writing {path:?}"))?;
        log::info!("Strategy comparison written to {path:?}");
    }
    Ok(())
}
