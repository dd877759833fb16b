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

//! Command search.
//!
//! The [command search](search) determines what a command name refers to. A
//! [target](Target) is either a built-in utility or an external utility.
//!
//! If the command name contains a slash, the target is always an external
//! utility named by the path. Otherwise, a built-in of the name takes
//! priority. For other names, the directories in the `PATH` variable are
//! searched for an executable file.

use std::collections::HashMap;
use std::ffi::CStr;
use std::ffi::CString;
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;
use tish_env::Env;
use tish_env::System;
use tish_env::builtin::Builtin;

/// Target of a command execution.
///
/// This is the result of the [command search](search).
#[derive(Debug)]
pub enum Target<S> {
    /// Built-in utility.
    Builtin(Builtin<S>),
    /// External utility.
    External {
        /// Path to the external utility.
        ///
        /// The path may not name an existing executable file. If the name is
        /// not found in `PATH`, the name itself is used so that executing it
        /// fails in the child process.
        path: CString,
    },
}

impl<S> From<Builtin<S>> for Target<S> {
    fn from(builtin: Builtin<S>) -> Self {
        Target::Builtin(builtin)
    }
}

/// Part of the shell execution environment command path search depends on.
pub trait PathEnv {
    /// Returns the value of the `PATH` variable.
    fn path(&self) -> Option<&str>;
    /// Whether there is an executable file at the specified path.
    fn is_executable_file(&self, path: &CStr) -> bool;
}

/// Part of the shell execution environment command search depends on.
pub trait SearchEnv: PathEnv {
    /// System type of the built-ins
    type System;
    /// Accesses the built-in set in the environment.
    fn builtins(&self) -> &HashMap<&'static str, Builtin<Self::System>>;
}

impl<S: System> PathEnv for Env<S> {
    fn path(&self) -> Option<&str> {
        self.variables.get("PATH").map(String::as_str)
    }
    fn is_executable_file(&self, path: &CStr) -> bool {
        self.system.is_executable_file(path)
    }
}

impl<S: System> SearchEnv for Env<S> {
    type System = S;
    fn builtins(&self) -> &HashMap<&'static str, Builtin<S>> {
        &self.builtins
    }
}

/// Performs command search.
///
/// Returns `None` if the name cannot be converted to a C string.
pub fn search<E: SearchEnv>(env: &E, name: &str) -> Option<Target<E::System>> {
    if !name.contains('/') {
        if let Some(builtin) = env.builtins().get(name) {
            return Some((*builtin).into());
        }
        if let Some(path) = search_path(env, name) {
            return Some(Target::External { path });
        }
    }

    let path = CString::new(name).ok()?;
    Some(Target::External { path })
}

/// Searches the `PATH` for an executable file.
///
/// Returns the path if successful. Note that the returned path may not be
/// absolute if the `PATH` contains a relative path. An empty directory name
/// refers to the current working directory.
pub fn search_path<E: PathEnv + ?Sized>(env: &E, name: &str) -> Option<CString> {
    let path = env.path()?;
    for dir in path.split(':') {
        let mut file = PathBuf::new();
        file.push(if dir.is_empty() { "." } else { dir });
        file.push(name);
        if let Ok(file) = CString::new(file.into_os_string().into_vec()) {
            if env.is_executable_file(&file) {
                return Some(file);
            }
        }
    }
    None
}
