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

//! Job report formatting
//!
//! A job report is the line the `jobs` built-in prints for each job, and also
//! the announcement printed when a job starts or resumes in the background.
//! The report includes the job ID, the process ID, the current state, and the
//! job name, in this order:
//!
//! ```text
//! [2] (24437) Running sleep 10 &
//! ```
//!
//! To format a job, you create an instance of [`Report`] and use the `Display`
//! trait's method. Formatting never allocates memory, so reports can also be
//! written into a [`StackWriter`](crate::io::StackWriter) in a signal handler.
//!
//! ```
//! # use tish_env::job::{JobState, JobTable, Pid};
//! use tish_env::job::fmt::Report;
//! let mut table = JobTable::new();
//! table.insert(Pid::from_raw(123), JobState::Stopped, "sleep 10").unwrap();
//! let job = table.find_by_pid(Pid::from_raw(123)).unwrap();
//! assert_eq!(Report { job }.to_string(), "[1] (123) Stopped sleep 10");
//! ```

use super::Job;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Wrapper that formats a job report
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    /// Job to report
    pub job: &'a Job,
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let job = self.job;
        write!(f, "[{}] ({}) {} {}", job.id, job.pid, job.state, job.name)
    }
}
