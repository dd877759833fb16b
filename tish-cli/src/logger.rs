// This file is part of tish, a tiny job-control shell.
// Copyright (C) 2026 tish contributors
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
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Logger that prints diagnostic messages
//!
//! Messages are written to the standard error, which the shell redirects to
//! the standard output at startup. The `-v` option raises the maximum level to
//! `Debug`; otherwise, only warnings and errors are printed.
//!
//! Signal handlers must not log.

use log::LevelFilter;
use log::Log;
use std::io::Write;

/// Logger that writes each record as a line
pub struct SimpleLogger<W: Send + Sync>
where
    for<'a> &'a W: Write,
{
    target: W,
    prefix: &'static str,
}

impl<W: Send + Sync> Log for SimpleLogger<W>
where
    for<'a> &'a W: Write,
{
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.level() <= log::STATIC_MAX_LEVEL
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(&self.target, "{}{}", self.prefix, record.args());
        }
    }

    fn flush(&self) {
        let _ = (&self.target).flush();
    }
}

impl SimpleLogger<std::io::Stderr> {
    /// Creates a logger that writes to the standard error.
    pub fn to_stderr(prefix: &'static str) -> SimpleLogger<std::io::Stderr> {
        SimpleLogger {
            target: std::io::stderr(),
            prefix,
        }
    }
}

/// Returns the maximum log level for the verbosity.
pub fn max_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Installs the logger.
///
/// Does nothing if a logger has already been installed.
pub fn init(verbose: bool) {
    if log::set_boxed_logger(Box::new(SimpleLogger::to_stderr("tish: "))).is_ok() {
        log::set_max_level(max_level(verbose));
    }
}
