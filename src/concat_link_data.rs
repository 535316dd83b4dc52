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
//! Concatenate the per-link series within the plot window into a single file.
use anyhow::Context;
use clap::Parser;

use linkpower::{aggregate::link_data, cli::DatasetArgs, util};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(flatten)]
    dataset: DatasetArgs,
}

fn main() -> anyhow::Result<()> {
    let multi = util::init_logging();
    let config = Args::parse().dataset.into_config();

    link_data::concat(&config, &util::progress_bar(&multi, 0))
        .context("concatenating the per-link data (run extract_metadata first)")?;
    Ok(())
}
