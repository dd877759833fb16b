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

//! Job target parsing
//!
//! The `bg` and `fg` built-ins take an operand that selects a job in one of
//! two forms:
//!
//! - A decimal number `N` refers to the job whose process ID is `N`.
//! - `%N` refers to the job whose job ID is `N`.
//!
//! You parse an operand with [`parse`] to get a [`Target`] and then resolve it
//! against a job table with [`Target::find`].

use super::Job;
use super::JobTable;
use super::Pid;
use std::num::NonZeroUsize;
use thiserror::Error;

/// Result of parsing a job operand
///
/// The numbers are kept as written. A number that cannot name any job, such
/// as zero or a process ID out of range, simply fails to be found.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Target {
    /// Job selected by process ID (`N`)
    Process(usize),
    /// Job selected by job ID (`%N`)
    Job(usize),
}

/// Error that may occur in job operand [parsing](parse)
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
#[error("argument must be a PID or %jobid")]
pub struct ParseError;

/// Parses a job operand.
///
/// The operand must be a non-empty sequence of ASCII digits, optionally
/// preceded by `%`. Numbers too large to represent saturate, so they never
/// name an existing job.
///
/// ```
/// # use tish_env::job::id::{ParseError, Target, parse};
/// assert_eq!(parse("123"), Ok(Target::Process(123)));
/// assert_eq!(parse("%2"), Ok(Target::Job(2)));
/// assert_eq!(parse("%"), Err(ParseError));
/// assert_eq!(parse("-1"), Err(ParseError));
/// assert_eq!(parse("12a"), Err(ParseError));
/// ```
pub fn parse(operand: &str) -> Result<Target, ParseError> {
    let (digits, is_job) = match operand.strip_prefix('%') {
        Some(digits) => (digits, true),
        None => (operand, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError);
    }
    let number = digits.parse().unwrap_or(usize::MAX);
    Ok(if is_job {
        Target::Job(number)
    } else {
        Target::Process(number)
    })
}

/// Error that may occur in [`Target::find`]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum FindError {
    /// No job has the job ID.
    #[error("no such job")]
    NoSuchJob,

    /// No job has the process ID.
    #[error("no such process")]
    NoSuchProcess,
}

impl Target {
    /// Returns the job selected by the target.
    pub fn find<'a>(&self, table: &'a JobTable) -> Result<&'a Job, FindError> {
        match *self {
            Target::Process(pid) => to_pid(pid)
                .and_then(|pid| table.find_by_pid(pid))
                .ok_or(FindError::NoSuchProcess),
            Target::Job(id) => NonZeroUsize::new(id)
                .and_then(|id| table.find_by_jid(id))
                .ok_or(FindError::NoSuchJob),
        }
    }
}

fn to_pid(number: usize) -> Option<Pid> {
    i32::try_from(number).ok().map(Pid::from_raw)
}
