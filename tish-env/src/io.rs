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

//! Type definitions for I/O.

use std::fmt::Write;
use std::os::unix::io::RawFd;

/// File descriptor
///
/// This is the `newtype` pattern applied to [`RawFd`], which is merely a type
/// alias.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub RawFd);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

/// Fixed-capacity text buffer living on the stack
///
/// Signal handlers must not allocate memory, so they cannot use `format!`.
/// They format messages into a `StackWriter` with `write!` instead and then
/// pass [`as_bytes`](Self::as_bytes) to the `write` system call.
///
/// Text that does not fit in the buffer is truncated and the `write!` call
/// that overflowed returns an error.
///
/// ```
/// use std::fmt::Write;
/// use tish_env::io::StackWriter;
/// let mut writer = StackWriter::<16>::new();
/// write!(writer, "[{}] ({})", 1, 42).unwrap();
/// assert_eq!(writer.as_bytes(), b"[1] (42)");
/// ```
#[derive(Clone, Debug)]
pub struct StackWriter<const N: usize> {
    buffer: [u8; N],
    len: usize,
}

impl<const N: usize> StackWriter<N> {
    /// Creates an empty writer.
    pub const fn new() -> Self {
        StackWriter {
            buffer: [0; N],
            len: 0,
        }
    }

    /// Returns the text written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Formats a line (the displayed value followed by a newline).
    ///
    /// Overflowing text is truncated, but the newline is always kept.
    pub fn line<D: std::fmt::Display>(value: D) -> Self {
        let mut writer = Self::new();
        if write!(writer, "{value}").is_err() {
            writer.len = writer.len.min(N.saturating_sub(1));
        }
        writer.write_str("\n").ok();
        writer
    }
}

impl<const N: usize> Default for StackWriter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for StackWriter<N> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let available = N - self.len;
        let count = s.len().min(available);
        self.buffer[self.len..self.len + count].copy_from_slice(&s.as_bytes()[..count]);
        self.len += count;
        if count == s.len() {
            Ok(())
        } else {
            Err(std::fmt::Error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_writer_truncates_overflowing_text() {
        let mut writer = StackWriter::<4>::new();
        assert!(write!(writer, "abcdef").is_err());
        assert_eq!(writer.as_bytes(), b"abcd");
    }

    #[test]
    fn stack_writer_line_keeps_newline() {
        let writer = StackWriter::<8>::line("job");
        assert_eq!(writer.as_bytes(), b"job\n");

        let writer = StackWriter::<4>::line("overflow");
        assert_eq!(writer.as_bytes(), b"ove\n");
    }
}
