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

//! Fg built-in
//!
//! The **`fg`** built-in resumes a job in the foreground.
//!
//! # Synopsis
//!
//! ```sh
//! fg job
//! ```
//!
//! # Description
//!
//! The built-in sends `SIGCONT` to the process group of the job and marks the
//! job as the foreground job in one critical section. It then waits until the
//! job finishes or stops again, like the shell does for a command started in
//! the foreground.
//!
//! # Operands
//!
//! Operand *job* is a process ID or a job ID prefixed with `%`, as for the
//! [`bg`](crate::bg) built-in.
//!
//! # Errors
//!
//! The same errors as for `bg` are reported, except that the job must be
//! stopped or running in the background:
//! `fg error - Job is not STOPPED or in BACKGROUND.`

use crate::bg::{Mode, report_resume_error, resume};
use crate::common::report_fatal;
use std::ops::ControlFlow::Continue;
use tish_env::Env;
use tish_env::System;
use tish_env::semantics::ExitStatus;

/// Entry point of the `fg` built-in
pub fn main<S: System>(env: &mut Env<S>, args: Vec<String>) -> crate::Result {
    let pid = match resume(env, Mode::Foreground, &args) {
        Ok(pid) => pid,
        Err(error) => return report_resume_error(env, error),
    };
    match env.wait_for_foreground(pid) {
        Ok(()) => (ExitStatus::SUCCESS, Continue(())),
        Err(errno) => report_fatal(env, &format!("sigsuspend error: {errno}")),
    }
}
