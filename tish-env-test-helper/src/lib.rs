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

//! This crate contains utility functions for use in tests that interact with
//! the shell environment ([`tish_env::Env`]).

use assert_matches::assert_matches;
use std::cell::RefCell;
use std::ffi::CString;
use std::rc::Rc;
use tish_env::Env;
use tish_env::job::JobState;
use tish_env::job::Pid;
use tish_env::system::ForkResult;
use tish_env::system::System;
use tish_env::system::r#virtual::{SystemState, VirtualSystem};

/// Runs a function in a virtual system.
///
/// This function creates an [`Env`] with a [`VirtualSystem`] and a fresh job
/// table, and calls `f` with the environment and a shared reference to the
/// system state. The system state can be used to script child statuses and
/// pending signals, or to inspect the output.
pub fn in_virtual_system<F, T>(f: F) -> T
where
    F: FnOnce(Env<VirtualSystem>, Rc<RefCell<SystemState>>) -> T,
{
    let env = Env::new_virtual();
    let state = Rc::clone(&env.system.state);
    f(env, state)
}

/// Makes the virtual system regard the path as an executable file.
pub fn stub_executable(state: &RefCell<SystemState>, path: &str) {
    let path = CString::new(path).unwrap();
    state.borrow_mut().executables.insert(path);
}

/// Forks a virtual child and registers it in the job table.
///
/// The child is placed in its own process group like the shell does for real
/// commands. Returns the process ID of the child.
pub fn spawn_job(env: &mut Env<VirtualSystem>, state: JobState, name: &str) -> Pid {
    let child = assert_matches!(env.system.fork(), Ok(ForkResult::Parent { child }) => child);
    env.system.setpgid(child, child).unwrap();
    env.jobs
        .with(|table| table.insert(child, state, name))
        .unwrap()
        .unwrap();
    child
}

/// Helper function for asserting on the content of the standard output
///
/// The argument function `f` is called with the content of the standard output
/// as a string slice.
///
/// This function panics if the standard output does not contain a valid UTF-8
/// string.
///
/// # Example
///
/// ```
/// # use std::rc::Rc;
/// # use tish_env::Env;
/// # use tish_env::io::Fd;
/// # use tish_env::system::System;
/// # use tish_env_test_helper::assert_stdout;
/// let mut env = Env::new_virtual();
/// let state = Rc::clone(&env.system.state);
/// env.system.write(Fd::STDOUT, b"Hello, world!\n").unwrap();
/// assert_stdout(&state, |stdout| assert_eq!(stdout, "Hello, world!\n"));
/// ```
pub fn assert_stdout<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    let state = state.borrow();
    f(std::str::from_utf8(&state.stdout).unwrap())
}

/// Helper function for asserting on the content of the standard error
///
/// This function is analogous to [`assert_stdout`]. See its documentation for
/// an example.
pub fn assert_stderr<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    let state = state.borrow();
    f(std::str::from_utf8(&state.stderr).unwrap())
}

/// Returns a copy of the job table of the environment.
pub fn job_table(env: &Env<VirtualSystem>) -> tish_env::job::JobTable {
    env.jobs.with(|table| table.clone()).unwrap()
}
