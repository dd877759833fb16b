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

//! Type definitions for command execution.

use std::ops::ControlFlow;
use std::os::raw::c_int;

/// Number that summarizes the result of command execution.
///
/// Utilities return an exit status of zero when successful and non-zero
/// otherwise. The shell itself exits with the exit status carried by the
/// [`Divert`] that ends its read loop.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for c_int {
    fn from(exit_status: ExitStatus) -> c_int {
        exit_status.0
    }
}

impl ExitStatus {
    /// Exit status of 0: success.
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    /// Exit status of 1: failure.
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Exit Status of 126: command not executable.
    pub const NOEXEC: ExitStatus = ExitStatus(126);

    /// Exit status of 127: command not found.
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);
}

/// Result of interrupted command execution.
///
/// `Divert` implements `Ord`. Values are ordered by severity.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Divert {
    /// Exit from the shell as requested by the user.
    Exit(Option<ExitStatus>),

    /// Exit from the shell because of an unrecoverable error.
    ///
    /// This is used when a system call the shell cannot do without (`fork`,
    /// `kill`, `sigprocmask`) fails.
    Abort(Option<ExitStatus>),
}

impl Divert {
    /// Returns the exit status associated with the `Divert`.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Divert::Exit(exit_status) | Divert::Abort(exit_status) => *exit_status,
        }
    }
}

/// Result of command execution.
///
/// If the command wants the shell to stop reading commands, the result value
/// will be a `Break` having a [`Divert`] value which specifies how to exit.
pub type Result<T = ()> = ControlFlow<Divert, T>;
