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

//! Reading input lines

use std::slice::from_mut;
use tish_env::System;
use tish_env::io::Fd;
use tish_env::system::Errno;

/// Line reader that reads from a file descriptor.
///
/// The reader reads one byte at a time so that it never consumes input past
/// the end of the current line. The input remaining after the shell exits is
/// left for other processes to read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FdReader {
    /// File descriptor to read from
    fd: Fd,
}

impl FdReader {
    /// Creates a new `FdReader` instance.
    pub fn new(fd: Fd) -> Self {
        FdReader { fd }
    }

    /// Reads the next line.
    ///
    /// The returned line includes the trailing newline unless the input ends
    /// without one. Returns `Ok(None)` at the end of input. Invalid UTF-8
    /// sequences are replaced with U+FFFD.
    pub fn next_line<S: System>(&self, system: &mut S) -> Result<Option<String>, Errno> {
        let mut bytes = Vec::new();
        loop {
            let mut byte = 0;
            match system.read(self.fd, from_mut(&mut byte))? {
                // End of input
                0 => break,
                _ => {
                    bytes.push(byte);
                    if byte == b'\n' {
                        break;
                    }
                }
            }
        }

        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tish_env::VirtualSystem;

    #[test]
    fn empty_input() {
        let mut system = VirtualSystem::new();
        let reader = FdReader::new(Fd::STDIN);
        assert_eq!(reader.next_line(&mut system), Ok(None));
    }

    #[test]
    fn lines_are_read_one_by_one() {
        let mut system = VirtualSystem::new();
        system.state.borrow_mut().stdin.extend(b"jobs\nfg %1\nquit");
        let reader = FdReader::new(Fd::STDIN);

        assert_eq!(reader.next_line(&mut system), Ok(Some("jobs\n".to_string())));
        assert_eq!(system.state.borrow().stdin.len(), 10);
        assert_eq!(reader.next_line(&mut system), Ok(Some("fg %1\n".to_string())));
        assert_eq!(reader.next_line(&mut system), Ok(Some("quit".to_string())));
        assert_eq!(reader.next_line(&mut system), Ok(None));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut system = VirtualSystem::new();
        system.state.borrow_mut().stdin.extend(b"a\xffb\n");
        let reader = FdReader::new(Fd::STDIN);
        assert_eq!(
            reader.next_line(&mut system),
            Ok(Some("a\u{fffd}b\n".to_string()))
        );
    }

    #[test]
    fn read_error() {
        let mut system = VirtualSystem::new();
        system.state.borrow_mut().read_error = Some(Errno::EIO);
        let reader = FdReader::new(Fd::STDIN);
        assert_eq!(reader.next_line(&mut system), Err(Errno::EIO));
    }
}
