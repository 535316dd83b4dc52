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
//! Utility module collection of functions

use std::{
    env,
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use indicatif_log_bridge::LogWrapper;

/// Logging configuration picked up from the working directory, if present.
pub const LOG_CONFIG: &str = "log4rs.yml";

/// Initialize logging and return the handle progress bars should be attached to.
///
/// Uses `log4rs.yml` if it exists (progress bars are hidden then, as log4rs writes to the console
/// on its own). Otherwise, logs through `pretty_env_logger` (`RUST_LOG`, default `info`) without
/// disturbing the progress bars.
pub fn init_logging() -> MultiProgress {
    if Path::new(LOG_CONFIG).exists() {
        match log4rs::init_file(LOG_CONFIG, Default::default()) {
            Ok(()) => return MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            Err(e) => eprintln!("Cannot load {LOG_CONFIG}, falling back to env logger: {e}"),
        }
    }

    let multi = MultiProgress::new();
    let logger = pretty_env_logger::formatted_builder()
        .parse_filters(&env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .build();
    let level = logger.filter();
    match LogWrapper::new(multi.clone(), logger).try_init() {
        Ok(()) => log::set_max_level(level),
        Err(e) => eprintln!("Logger was already initialized: {e}"),
    }
    multi
}

/// Progress bar over `len` files, attached to `multi`.
pub fn progress_bar(multi: &MultiProgress, len: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "[{bar:80}] files: {pos:>7}/{len:7}, elapsed: {elapsed}, eta: {eta}",
    )
    .map(|style| style.progress_chars("##-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    multi.add(ProgressBar::new(len as u64).with_style(style))
}

/// Open a CSV file for writing with a header row, truncating what was there before.
pub fn csv_writer(path: impl AsRef<Path>) -> io::Result<csv::Writer<fs::File>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(csv::WriterBuilder::new().has_headers(true).from_writer(
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
    ))
}

pub trait PathBufExt: Sized {
    fn then(self, p: impl AsRef<Path>) -> PathBuf;
}

impl PathBufExt for PathBuf {
    fn then(mut self, p: impl AsRef<Path>) -> PathBuf {
        self.push(p);
        self
    }
}

impl PathBufExt for &Path {
    fn then(self, p: impl AsRef<Path>) -> PathBuf {
        let mut path = self.to_path_buf();
        path.push(p);
        path
    }
}
