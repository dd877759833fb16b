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

//! Common items for implementing built-ins.

use std::ops::ControlFlow::{Break, Continue};
use tish_env::Env;
use tish_env::System;
use tish_env::semantics::Divert;
use tish_env::semantics::ExitStatus;

/// Prints an error message for a failure local to the built-in.
///
/// The message is printed on a line of its own to the standard output. The
/// shell keeps reading commands.
pub fn report_failure<S: System>(env: &mut Env<S>, message: &str) -> crate::Result {
    env.print(&format!("{message}\n"));
    (ExitStatus::FAILURE, Continue(()))
}

/// Prints an error message for a failed system call the shell cannot do
/// without.
///
/// The result makes the shell exit with [`ExitStatus::FAILURE`].
pub fn report_fatal<S: System>(env: &mut Env<S>, message: &str) -> crate::Result {
    env.print(&format!("{message}\n"));
    let exit_status = ExitStatus::FAILURE;
    (exit_status, Break(Divert::Abort(Some(exit_status))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tish_env_test_helper::assert_stdout;

    #[test]
    fn failure_continues() {
        let mut env = Env::new_virtual();
        let state = Rc::clone(&env.system.state);
        let result = report_failure(&mut env, "no such job");
        assert_eq!(result, (ExitStatus::FAILURE, Continue(())));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "no such job\n"));
    }

    #[test]
    fn fatal_aborts() {
        let mut env = Env::new_virtual();
        let result = report_fatal(&mut env, "kill failed");
        assert_eq!(
            result,
            (
                ExitStatus::FAILURE,
                Break(Divert::Abort(Some(ExitStatus::FAILURE)))
            )
        );
    }
}
