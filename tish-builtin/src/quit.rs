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

//! Quit built-in
//!
//! The **`quit`** built-in terminates the shell immediately with exit status
//! zero. Jobs that are still running are left alone.
//!
//! # Synopsis
//!
//! ```sh
//! quit
//! ```
//!
//! Operands are ignored.

use std::ops::ControlFlow::Break;
use tish_env::Env;
use tish_env::System;
use tish_env::semantics::Divert;
use tish_env::semantics::ExitStatus;

/// Entry point of the `quit` built-in
pub fn main<S: System>(_env: &mut Env<S>, _args: Vec<String>) -> crate::Result {
    let exit_status = ExitStatus::SUCCESS;
    (exit_status, Break(Divert::Exit(Some(exit_status))))
}
