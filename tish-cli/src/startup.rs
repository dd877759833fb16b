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

//! Shell startup

use tish_env::Env;
use tish_env::System;
use tish_env::io::Fd;
use tish_env::system::Errno;
use tish_env::system::Signal;
use tish_env::system::SignalHandling;
use tish_env::trap;

pub mod args;

/// Prepares the environment for running the read-eval loop.
///
/// This function redirects the standard error to the standard output so that
/// every message the shell prints appears on the standard output, restores
/// the default handling of `SIGPIPE`, registers the built-ins, and installs
/// the signal handlers. The environment variables passed in `vars` are
/// imported into the environment.
///
/// An error is returned if the signal handlers cannot be installed.
pub fn configure_environment<S, I>(env: &mut Env<S>, vars: I) -> Result<(), Errno>
where
    S: System,
    I: IntoIterator<Item = (String, String)>,
{
    env.system.dup2(Fd::STDOUT, Fd::STDERR).ok();

    // Rust by default sets SIGPIPE to SIG_IGN, which is not desired.
    env.system
        .sigaction(Signal::SIGPIPE, SignalHandling::Default)
        .ok();

    env.builtins.extend(tish_builtin::builtins());
    env.variables.extend(vars);

    trap::install(&mut env.system, env.jobs)
}
