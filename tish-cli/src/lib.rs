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

//! This is an internal library crate for the tish shell. **This crate is not
//! intended to be used as a library by other crates.**
//!
//! The entry point for the shell is the [`main`] function, which is to be used
//! as the `main` function in the binary crate. The function sets up the shell
//! environment and runs the main read-eval loop.

pub mod logger;
pub mod startup;

use self::startup::args::Parse;
use self::startup::args::USAGE;
use self::startup::configure_environment;
use std::ops::ControlFlow::{Break, Continue};
use tish_env::Env;
use tish_env::RealSystem;
use tish_env::System;
use tish_env::job::JobCell;
use tish_env::job::JobTable;
use tish_semantics::ExitStatus;
use tish_semantics::ReadEvalLoop;

/// Job table of the shell process
///
/// The signal handlers update this table, so it has to outlive them.
static JOBS: JobCell = JobCell::new(JobTable::new());

fn run_as_shell_process<S: System>(env: &mut Env<S>) -> ExitStatus {
    // Parse the command-line arguments
    let run = match self::startup::args::parse(std::env::args()) {
        Ok(Parse::Run(run)) => run,
        Ok(Parse::Help) => {
            env.print(USAGE);
            return ExitStatus::FAILURE;
        }
        Err(e) => {
            let arg0 = std::env::args().next().unwrap_or_else(|| "tish".to_owned());
            env.print_error(&format!("{arg0}: {e}\n"));
            env.print(USAGE);
            return ExitStatus::FAILURE;
        }
    };

    logger::init(run.verbose);

    if let Err(errno) = configure_environment(env, std::env::vars()) {
        env.print_error(&format!("sigaction error: {errno}\n"));
        return ExitStatus::FAILURE;
    }

    let mut read_eval_loop = ReadEvalLoop::new(env);
    if !run.prompt {
        read_eval_loop.set_prompt(None);
    }
    match read_eval_loop.run() {
        Continue(()) => ExitStatus::SUCCESS,
        Break(divert) => divert.exit_status().unwrap_or(env.exit_status),
    }
}

pub fn main() -> ! {
    // SAFETY: This is the only instance of RealSystem we create in the whole
    // process.
    let system = unsafe { RealSystem::new() };
    let mut env = Env::with_system(system, &JOBS);
    let exit_status = run_as_shell_process(&mut env);
    log::debug!("Exiting with status {exit_status}");
    env.system.exit(exit_status)
}
