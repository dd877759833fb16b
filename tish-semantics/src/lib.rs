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

//! This crate defines how the shell evaluates command lines.
//!
//! A command line is [split into words](command_line::parse). The first word
//! names the command, which is [searched](command_search::search) among the
//! built-ins and in the `PATH`. A built-in runs in the shell process, and any
//! other command is [started as a job](external::start_external_utility) in a
//! child process. [`evaluate`] puts these steps together, and
//! [`ReadEvalLoop`] evaluates the lines read from the standard input.

pub mod command;
pub mod command_line;
pub mod command_search;
pub mod external;
pub mod input;
mod runner;

pub use self::command::evaluate;
pub use self::runner::DEFAULT_PROMPT;
pub use self::runner::ReadEvalLoop;
#[doc(no_inline)]
pub use tish_env::semantics::*;
