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
//! Extract the metadata and time series of every link, then count how often each link's load fits
//! each capacity tier.
use anyhow::Context;
use clap::Parser;

use linkpower::{aggregate::metadata, cli::DatasetArgs, util};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(flatten)]
    dataset: DatasetArgs,
    /// Only add the counters, reusing the metadata and series of a previous run.
    #[arg(long)]
    counts_only: bool,
}

fn main() -> anyhow::Result<()> {
    let multi = util::init_logging();
    let args = Args::parse();
    let config = args.dataset.into_config();

    if !args.counts_only {
        let extraction = metadata::extract(&config, &util::progress_bar(&multi, 0))
            .with_context(|| format!("extracting the link metadata of {:?}", config.dataset_path))?;
        log::info!(
            "Found {} links in {} snapshots",
            extraction.metadata.len(),
            extraction.stats.parsed
        );
    }

    let records = metadata::with_counts(&config, &util::progress_bar(&multi, 0))
        .context("counting the link utilization")?;
    log::info!("Counted the utilization of {} links", records.len());
    Ok(())
}
