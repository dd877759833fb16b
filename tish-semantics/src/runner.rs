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

//! Implementation of the read-eval loop

use crate::command::evaluate;
use crate::input::FdReader;
use std::ops::ControlFlow::{Break, Continue};
use tish_env::Env;
use tish_env::System;
use tish_env::io::Fd;
use tish_env::semantics::Divert;
use tish_env::semantics::ExitStatus;
use tish_env::semantics::Result;

/// Prompt printed before reading each line by default
pub const DEFAULT_PROMPT: &str = "tish> ";

/// Read-eval loop
///
/// A read-eval loop reads lines from the standard input and
/// [evaluates](evaluate) them one by one until the input ends or the
/// evaluation results in a `Break(Divert::...)`.
///
/// The loop returns `Continue(())` at the end of input. If reading the input
/// fails, the loop prints `fgets error` and returns
/// `Break(Divert::Abort(Some(ExitStatus::FAILURE)))`.
///
/// # Example
///
/// ```
/// # use std::ops::ControlFlow::Continue;
/// # use std::rc::Rc;
/// # use tish_env::Env;
/// # use tish_semantics::ReadEvalLoop;
/// let mut env = Env::new_virtual();
/// let state = Rc::clone(&env.system.state);
/// state.borrow_mut().stdin.extend(b"\n\n");
/// let result = ReadEvalLoop::new(&mut env).run();
/// assert_eq!(result, Continue(()));
/// assert_eq!(state.borrow().stdout_str(), "tish> tish> tish> ");
/// ```
#[derive(Debug)]
#[must_use = "the loop must be run to have any effect"]
pub struct ReadEvalLoop<'a, S> {
    env: &'a mut Env<S>,
    reader: FdReader,
    prompt: Option<&'a str>,
}

impl<'a, S: System> ReadEvalLoop<'a, S> {
    /// Creates a new read-eval loop that prints the [default
    /// prompt](DEFAULT_PROMPT).
    pub fn new(env: &'a mut Env<S>) -> Self {
        Self {
            env,
            reader: FdReader::new(Fd::STDIN),
            prompt: Some(DEFAULT_PROMPT),
        }
    }

    /// Sets the prompt.
    ///
    /// If `prompt` is `None`, the loop does not print a prompt.
    pub fn set_prompt(&mut self, prompt: Option<&'a str>) {
        self.prompt = prompt;
    }

    /// Runs the read-eval loop.
    pub fn run(self) -> Result {
        loop {
            if let Some(prompt) = self.prompt {
                self.env.print(prompt);
            }

            let line = match self.reader.next_line(&mut self.env.system) {
                Ok(Some(line)) => line,
                Ok(None) => return Continue(()),
                Err(errno) => {
                    log::error!("cannot read the standard input: {errno}");
                    self.env.print_error("fgets error\n");
                    return Break(Divert::Abort(Some(ExitStatus::FAILURE)));
                }
            };

            evaluate(self.env, &line)?;
        }
    }
}
