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

//! Command line argument parser for the shell
//!
//! The shell accepts the following options:
//!
//! - `-h`: print the usage and exit
//! - `-v`: print additional diagnostic information
//! - `-p`: do not print a prompt
//!
//! Options can be combined in a single argument like `-vp`. Parsing stops at
//! `--` or the first argument that is not an option. Operands are ignored.

use thiserror::Error;

/// Message printed for the `-h` option or an invalid option
pub const USAGE: &str = "\
Usage: shell [-hvp]
   -h   print this message
   -v   print additional diagnostic information
   -p   do not emit a command prompt
";

/// Configuration for starting the main read-eval loop
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Run {
    /// Whether debug messages are logged (the `-v` option)
    pub verbose: bool,
    /// Whether the prompt is printed (cleared by the `-p` option)
    pub prompt: bool,
}

impl Default for Run {
    fn default() -> Self {
        Run {
            verbose: false,
            prompt: true,
        }
    }
}

/// Parse result
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Parse {
    /// Runs the shell
    Run(Run),
    /// Prints help message and exit
    Help,
}

impl From<Run> for Parse {
    fn from(run: Run) -> Self {
        Parse::Run(run)
    }
}

/// Error in command line parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Short option that is not defined
    #[error("unknown option `{0}`")]
    UnknownShortOption(char),
}

/// Parses command line arguments.
///
/// The first item is the command name, which is ignored.
pub fn parse<I, S>(args: I) -> Result<Parse, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut result = Run::default();

    for arg in args.into_iter().map(Into::into).skip(1) {
        let Some(options) = arg.strip_prefix('-') else {
            break;
        };
        if options.is_empty() || options == "-" {
            break;
        }

        for option in options.chars() {
            match option {
                'h' => return Ok(Parse::Help),
                'v' => result.verbose = true,
                'p' => result.prompt = false,
                _ => return Err(Error::UnknownShortOption(option)),
            }
        }
    }

    Ok(result.into())
}
