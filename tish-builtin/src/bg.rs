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

//! Bg built-in
//!
//! The **`bg`** built-in resumes a stopped job in the background.
//!
//! # Synopsis
//!
//! ```sh
//! bg job
//! ```
//!
//! # Operands
//!
//! Operand *job* is a process ID or a job ID prefixed with `%`. See the
//! [`tish_env::job::id`] module for the format. Operands after the first are
//! ignored.
//!
//! # Description
//!
//! The built-in sends `SIGCONT` to the process group of the job, prints the
//! job report line, and marks the job as running in the background. All of
//! this happens in one critical section, so a signal handler never sees the
//! job half-resumed.
//!
//! # Errors
//!
//! The operand is checked in this order, and the first failure is reported:
//!
//! 1. `bg command requires PID or %jobid argument` if there is no operand.
//! 2. `bg: argument must be a PID or %jobid` if the operand is not a number.
//! 3. `no such job` or `no such process` if no job matches.
//! 4. `bg error - Job is not STOPPED.` if the job is not stopped.
//!
//! These errors do not affect any job. If `kill` fails, the shell exits.

// Some definitions in this module are shared with the `fg` built-in.

use crate::common::{report_failure, report_fatal};
use std::fmt::Display;
use std::ops::ControlFlow::Continue;
use thiserror::Error;
use tish_env::Env;
use tish_env::System;
use tish_env::job::JobState;
use tish_env::job::Pid;
use tish_env::job::StateError;
use tish_env::job::fmt::Report;
use tish_env::job::id::FindError;
use tish_env::job::id::parse;
use tish_env::semantics::ExitStatus;
use tish_env::system::Errno;
use tish_env::system::Signal;

/// Way a job is resumed
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Mode {
    Background,
    Foreground,
}

impl Mode {
    /// Name of the built-in that resumes in this mode
    pub const fn name(self) -> &'static str {
        match self {
            Mode::Background => "bg",
            Mode::Foreground => "fg",
        }
    }

    /// Description of the states a job can be resumed from
    pub const fn requirement(self) -> &'static str {
        match self {
            Mode::Background => "STOPPED",
            Mode::Foreground => "STOPPED or in BACKGROUND",
        }
    }

    /// Whether a job in the state can be resumed
    pub fn accepts(self, state: JobState) -> bool {
        match self {
            Mode::Background => state == JobState::Stopped,
            Mode::Foreground => state != JobState::Foreground,
        }
    }

    /// State of the job after resumption
    pub const fn new_state(self) -> JobState {
        match self {
            Mode::Background => JobState::Background,
            Mode::Foreground => JobState::Foreground,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that may occur when resuming a job
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub(crate) enum ResumeError {
    #[error("{0} command requires PID or %jobid argument")]
    MissingOperand(Mode),
    #[error("{0}: argument must be a PID or %jobid")]
    InvalidOperand(Mode),
    #[error(transparent)]
    UnidentifiedJob(#[from] FindError),
    #[error("{} error - Job is not {}.", .0.name(), .0.requirement())]
    NotResumable(Mode),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("kill failed: {0}")]
    SystemError(#[from] Errno),
    #[error("sigprocmask error: {0}")]
    MaskError(Errno),
}

impl ResumeError {
    /// Whether the shell cannot continue after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResumeError::SystemError(_) | ResumeError::MaskError(_))
    }
}

/// Resumes the job specified by the operand in `args[1]`.
///
/// On success, returns the process ID of the resumed job. The job report is
/// printed inside the critical section if resuming in the background.
pub(crate) fn resume<S: System>(
    env: &mut Env<S>,
    mode: Mode,
    args: &[String],
) -> Result<Pid, ResumeError> {
    let operand = args.get(1).ok_or(ResumeError::MissingOperand(mode))?;
    let target = parse(operand).map_err(|_| ResumeError::InvalidOperand(mode))?;

    let jobs = env.jobs;
    jobs.with(|table| -> Result<Pid, ResumeError> {
        let job = target.find(table)?;
        if !mode.accepts(job.state) {
            return Err(ResumeError::NotResumable(mode));
        }
        let pid = job.pid;
        env.system
            .kill(Pid::from_raw(-pid.as_raw()), Some(Signal::SIGCONT))?;
        table.set_state(pid, mode.new_state())?;

        if mode == Mode::Background {
            if let Some(job) = table.find_by_pid(pid) {
                env.print(&format!("{}\n", Report { job }));
            }
        }
        Ok(pid)
    })
    .map_err(ResumeError::MaskError)?
}

/// Converts a resumption error to the built-in result.
pub(crate) fn report_resume_error<S: System>(
    env: &mut Env<S>,
    error: ResumeError,
) -> crate::Result {
    if error.is_fatal() {
        report_fatal(env, &error.to_string())
    } else {
        report_failure(env, &error.to_string())
    }
}

/// Entry point of the `bg` built-in
pub fn main<S: System>(env: &mut Env<S>, args: Vec<String>) -> crate::Result {
    match resume(env, Mode::Background, &args) {
        Ok(_) => (ExitStatus::SUCCESS, Continue(())),
        Err(error) => report_resume_error(env, error),
    }
}
