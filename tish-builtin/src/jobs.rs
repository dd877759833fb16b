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

//! Jobs built-in
//!
//! The **`jobs`** built-in prints the jobs that are running in the background
//! or stopped, one [report](tish_env::job::fmt) line per job in the order of
//! the job table slots. The foreground job is never listed.
//!
//! # Synopsis
//!
//! ```sh
//! jobs
//! ```
//!
//! Operands are ignored.

use crate::common::report_fatal;
use std::fmt::Write;
use std::ops::ControlFlow::Continue;
use tish_env::Env;
use tish_env::System;
use tish_env::job::Job;
use tish_env::job::fmt::Report;
use tish_env::semantics::ExitStatus;

/// Entry point of the `jobs` built-in
pub fn main<S: System>(env: &mut Env<S>, _args: Vec<String>) -> crate::Result {
    let snapshot = env
        .jobs
        .with(|table| table.list_background_and_stopped().copied().collect::<Vec<Job>>());
    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(errno) => return report_fatal(env, &format!("sigprocmask error: {errno}")),
    };

    let mut print = String::new();
    for job in &snapshot {
        writeln!(print, "{}", Report { job }).ok();
    }
    env.print(&print);
    (ExitStatus::SUCCESS, Continue(()))
}
