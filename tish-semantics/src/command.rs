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

//! Command line evaluation

use crate::command_line;
use crate::command_search::Target;
use crate::command_search::search;
use crate::external::start_external_utility;
use std::ops::ControlFlow::Continue;
use tish_env::Env;
use tish_env::System;
use tish_env::semantics::ExitStatus;
use tish_env::semantics::Result;

/// Evaluates a command line.
///
/// The trailing newline of `line` is ignored. A line that contains no words
/// does nothing. If the command name is a built-in, the built-in is executed
/// in the shell process. Otherwise, the command is started as a new job (see
/// [`start_external_utility`]).
///
/// The result is `Break` if the shell should exit.
///
/// ```
/// # use std::ops::ControlFlow::Continue;
/// # use tish_env::Env;
/// # use tish_semantics::evaluate;
/// let mut env = Env::new_virtual();
/// assert_eq!(evaluate(&mut env, "   \n"), Continue(()));
/// ```
pub fn evaluate<S: System>(env: &mut Env<S>, line: &str) -> Result {
    let text = line.trim_end_matches(['\n', '\r']);
    let Some(command_line) = command_line::parse(text) else {
        return Continue(());
    };

    match search(env, command_line.name()) {
        Some(Target::Builtin(builtin)) => {
            let (exit_status, divert) = (builtin.execute)(env, command_line.words);
            env.exit_status = exit_status;
            divert
        }
        Some(Target::External { path }) => start_external_utility(env, path, &command_line, text),
        None => {
            env.print_error(&format!("{}: Command not found\n", command_line.name()));
            env.exit_status = ExitStatus::NOT_FOUND;
            Continue(())
        }
    }
}
