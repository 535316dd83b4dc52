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
//! Run the whole analysis: metadata and per-link series, sleeping and rate-adaptation potential,
//! the all-link concatenation, and the comparison of adaptation strategies.
use anyhow::Context;
use clap::Parser;

use linkpower::{
    aggregate::{link_data, metadata, rate_adaptation, sleeping},
    cli::DatasetArgs,
    power_model::PowerModel,
    strategies::{self, DEFAULT_DATAPOINTS, DEFAULT_MAX_LOADS},
    util::{self, PathBufExt},
};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(flatten)]
    dataset: DatasetArgs,
    /// Skip the strategy comparison.
    #[arg(long)]
    skip_strategies: bool,
}

fn main() -> anyhow::Result<()> {
    let multi = util::init_logging();
    let args = Args::parse();
    let config = args.dataset.into_config();
    log::info!("Analyzing {:?}, writing to {:?}", config.dataset_path, config.output_path);

    let extraction = metadata::extract(&config, &util::progress_bar(&multi, 0))
        .context("extracting the link metadata")?;
    log::info!(
        "{} links, {} duplicate identities, {} host pairs",
        extraction.metadata.len(),
        extraction.duplicates.len(),
        extraction.parallel_links.len()
    );
    metadata::with_counts(&config, &util::progress_bar(&multi, 0))
        .context("counting the link utilization")?;

    sleeping::run(&config, &util::progress_bar(&multi, 0))
        .context("computing the sleeping potential")?;
    rate_adaptation::run(&config, &util::progress_bar(&multi, 0))
        .context("computing the rate-adaptation potential")?;
    link_data::concat(&config, &util::progress_bar(&multi, 0))
        .context("concatenating the per-link data")?;

    if !args.skip_strategies {
        let model = PowerModel::wedge();
        for max_load in DEFAULT_MAX_LOADS {
            let num_ports = strategies::ports_for_load(max_load);
            let records =
                strategies::compare_strategies(max_load, num_ports, DEFAULT_DATAPOINTS, &model)?;
            let path = config
                .output_path
                .clone()
                .then(strategies::output_file(num_ports));
            linkpower::aggregate::write_records(&path, records)
                .with_context(|| format!("writing {path:?}"))?;
        }
    }

    log::info!("Done.");
    Ok(())
}
