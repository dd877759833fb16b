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

//! Type definitions for built-in utilities.
//!
//! This module provides data types for defining built-in utilities.
//!
//! Note that concrete implementations of built-ins are not included in the
//! `tish_env` crate. For implementations of specific built-ins like `jobs` and
//! `fg`, see the `tish_builtin` crate.

use crate::Env;
use crate::semantics::Divert;
use crate::semantics::ExitStatus;
use std::fmt::Debug;
use std::ops::ControlFlow;

/// Result of built-in utility execution.
///
/// The `ControlFlow` is `Break` if the built-in wants the shell to exit.
pub type Result = (ExitStatus, ControlFlow<Divert>);

/// Type of functions that implement the behavior of a built-in.
///
/// The function receives the command words including the built-in name.
pub type Main<S> = fn(&mut Env<S>, Vec<String>) -> Result;

/// Built-in utility definition.
pub struct Builtin<S> {
    /// Function that implements the behavior of the built-in.
    pub execute: Main<S>,
}

impl<S> Clone for Builtin<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Builtin<S> {}

impl<S> Debug for Builtin<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").finish_non_exhaustive()
    }
}
