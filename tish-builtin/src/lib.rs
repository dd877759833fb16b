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

//! Implementation of the shell built-in utilities.
//!
//! Each built-in utility is implemented in the submodule named after the
//! utility. The submodule contains the `main` function that implements the
//! built-in utility. The module documentation for each submodule describes
//! the behavior of the built-in utility.
//!
//! The [`common`] module provides common functions that are used for
//! implementing built-in utilities.

pub mod bg;
pub mod common;
pub mod fg;
pub mod jobs;
pub mod quit;

#[doc(no_inline)]
pub use tish_env::builtin::*;
use tish_env::System;

/// Returns all the implemented built-in utilities.
///
/// The items are ordered alphabetically.
pub fn builtins<S: System>() -> [(&'static str, Builtin<S>); 4] {
    [
        ("bg", Builtin { execute: bg::main }),
        ("fg", Builtin { execute: fg::main }),
        ("jobs", Builtin { execute: jobs::main }),
        ("quit", Builtin { execute: quit::main }),
    ]
}
