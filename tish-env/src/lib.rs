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

//! This crate defines the shell execution environment.
//!
//! A shell execution environment, [`Env`], is a collection of data that may
//! affect or be affected by the execution of commands: the built-ins, the
//! environment variables passed to commands, the job table, and the interface
//! to the underlying system.
//!
//! The [`System`] trait is the interface to the system-managed parts.
//! [`RealSystem`] provides an implementation for `System` that interacts with
//! the underlying system. [`VirtualSystem`] is a dummy for simulating the
//! system's behavior without affecting the actual system.
//!
//! The job table is shared with signal handlers, so the environment refers to
//! it through a `&'static` [`JobCell`] rather than owning it. The
//! [`trap`] module defines what the handlers do; the [`critical`] module
//! defines the signal-masking discipline both sides follow.

pub mod builtin;
pub mod critical;
pub mod io;
pub mod job;
pub mod semantics;
pub mod system;
pub mod trap;

use self::builtin::Builtin;
use self::critical::BlockAll;
use self::io::Fd;
use self::job::JobCell;
use self::job::JobTable;
use self::job::Pid;
use self::semantics::ExitStatus;
#[doc(no_inline)]
pub use self::system::System;
#[doc(no_inline)]
pub use self::system::real::RealSystem;
#[doc(no_inline)]
pub use self::system::r#virtual::VirtualSystem;
use self::trap::Action;
use nix::errno::Errno;
use std::collections::HashMap;

/// Whole shell execution environment.
#[derive(Debug)]
pub struct Env<S> {
    /// Built-in utilities available in the environment.
    pub builtins: HashMap<&'static str, Builtin<S>>,

    /// Exit status of the last executed command.
    pub exit_status: ExitStatus,

    /// Jobs managed in the environment.
    pub jobs: &'static JobCell,

    /// Environment variables passed to external utilities.
    ///
    /// `PATH` is looked up here when searching for a command.
    pub variables: HashMap<String, String>,

    /// Interface to the system-managed parts of the environment.
    pub system: S,
}

impl<S: System> Env<S> {
    /// Creates a new environment with the given system and job table.
    ///
    /// Members of the new environment other than `system` and `jobs` are
    /// empty.
    pub fn with_system(system: S, jobs: &'static JobCell) -> Self {
        Env {
            builtins: HashMap::new(),
            exit_status: ExitStatus::default(),
            jobs,
            variables: HashMap::new(),
            system,
        }
    }

    /// Prints the text to the standard output, ignoring any errors.
    pub fn print(&mut self, text: &str) {
        self.system.write_all(Fd::STDOUT, text.as_bytes()).ok();
    }

    /// Prints the text to the standard error, ignoring any errors.
    pub fn print_error(&mut self, text: &str) {
        self.system.write_all(Fd::STDERR, text.as_bytes()).ok();
    }

    /// Waits until the job is no longer in the foreground.
    ///
    /// The job leaves the foreground when it is reaped or stopped by a signal
    /// handler. This function checks the job table with all signals blocked
    /// and suspends with the previous signal mask, so a signal arriving
    /// between the check and the suspension wakes the shell instead of being
    /// lost.
    ///
    /// Signals that the [`System::suspend`] implementation returns rather than
    /// handles are dispatched to [`trap::handle_signal`] here.
    pub fn wait_for_foreground(&mut self, pid: Pid) -> Result<(), Errno> {
        loop {
            let guard = BlockAll::new()?;
            if self.jobs.with(|table| table.foreground_pid())? != Some(pid) {
                return Ok(());
            }
            let caught = self.system.suspend(guard.previous())?;
            drop(guard);

            for signal in caught {
                if let Action::Exit(exit_status) =
                    trap::handle_signal(&mut self.system, self.jobs, signal)
                {
                    self.system.exit(exit_status);
                }
            }
        }
    }
}

impl Env<VirtualSystem> {
    /// Creates a new environment with a virtual system.
    ///
    /// The job table is leaked so that it lives as long as the test.
    pub fn new_virtual() -> Self {
        let jobs = Box::leak(Box::new(JobCell::new(JobTable::new())));
        Env::with_system(VirtualSystem::new(), jobs)
    }
}
