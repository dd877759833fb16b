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

//! [System] and its implementors.

pub mod real;
pub mod r#virtual;

use crate::io::Fd;
use crate::job::Pid;
use crate::semantics::ExitStatus;
#[doc(no_inline)]
pub use nix::errno::Errno;
#[doc(no_inline)]
pub use nix::sys::signal::SigSet;
#[doc(no_inline)]
pub use nix::sys::signal::SigmaskHow;
#[doc(no_inline)]
pub use nix::sys::signal::Signal;
#[doc(no_inline)]
pub use nix::sys::wait::WaitStatus;
#[doc(no_inline)]
pub use nix::unistd::ForkResult;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::fmt::Debug;

/// API to the system-managed parts of the environment.
///
/// The `System` trait defines a collection of methods to access the underlying
/// operating system from the shell as an application program. There are two
/// implementors for this trait: [`RealSystem`](self::real::RealSystem) and
/// [`VirtualSystem`](self::virtual::VirtualSystem).
///
/// Methods that signal handlers call (`write`, `kill`, `wait`, and `exit`)
/// must not allocate memory in the real implementation.
pub trait System: Debug {
    /// Whether there is an executable regular file at the specified path.
    fn is_executable_file(&self, path: &CStr) -> bool;

    /// Duplicates a file descriptor.
    ///
    /// This is a thin wrapper around the `dup2` system call.
    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd, Errno>;

    /// Reads from the file descriptor.
    ///
    /// This is a thin wrapper around the `read` system call, retried on
    /// `EINTR`. Returns the number of bytes read, which is zero at the end of
    /// input.
    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize, Errno>;

    /// Writes to the file descriptor.
    ///
    /// This is a thin wrapper around the `write` system call, retried on
    /// `EINTR`. Returns the number of bytes written.
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize, Errno>;

    /// Writes the whole buffer to the file descriptor.
    ///
    /// This function calls [`write`](Self::write) repeatedly until the buffer
    /// is exhausted. A write that makes no progress fails with `EIO`.
    fn write_all(&mut self, fd: Fd, mut buffer: &[u8]) -> Result<(), Errno> {
        while !buffer.is_empty() {
            match self.write(fd, buffer)? {
                0 => return Err(Errno::EIO),
                count => buffer = &buffer[count..],
            }
        }
        Ok(())
    }

    /// Gets and/or sets the signal blocking mask.
    ///
    /// This is a thin wrapper around the `sigprocmask` system call.
    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        oldset: Option<&mut SigSet>,
    ) -> Result<(), Errno>;

    /// Gets and sets the handler for a signal.
    ///
    /// This is an abstract wrapper around the `sigaction` system call. This
    /// function returns the previous handling if successful.
    ///
    /// When you set the handling to [`SignalHandling::Catch`], the signal is
    /// handled by [`trap::handle_signal`](crate::trap::handle_signal). The
    /// handler restarts interrupted system calls.
    fn sigaction(&mut self, signal: Signal, handling: SignalHandling)
    -> Result<SignalHandling, Errno>;

    /// Waits for a signal to be caught.
    ///
    /// This function temporarily replaces the signal blocking mask with `mask`
    /// and blocks until a signal is caught, then restores the original mask.
    /// It is the `sigsuspend` system call in the real system, where the caught
    /// signal has already been handled when this function returns and the
    /// result is always empty.
    ///
    /// A virtual system cannot run real handlers. It returns the signals that
    /// were pending instead, and the caller is responsible for passing them to
    /// [`trap::handle_signal`](crate::trap::handle_signal).
    fn suspend(&mut self, mask: &SigSet) -> Result<Vec<Signal>, Errno>;

    /// Sends a signal.
    ///
    /// This is a thin wrapper around the `kill` system call. A negative
    /// `target` selects the process group `-target`. If `signal` is `None`,
    /// permission to send a signal is checked, but no signal is sent.
    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> Result<(), Errno>;

    /// Reports updated status of any child process.
    ///
    /// This function performs `waitpid(-1, ..., WUNTRACED | WNOHANG)`.
    /// Despite the name, this function does not block: it returns
    /// `StillAlive` if no child has changed its state and fails with `ECHILD`
    /// if there are no children.
    fn wait(&mut self) -> Result<WaitStatus, Errno>;

    /// Creates a new child process.
    ///
    /// This is a thin wrapper around the `fork` system call.
    fn fork(&mut self) -> Result<ForkResult, Errno>;

    /// Moves a process into a process group.
    ///
    /// This is a thin wrapper around the `setpgid` system call.
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<(), Errno>;

    /// Replaces the current process with an external utility.
    ///
    /// This is a thin wrapper around the `execve` system call.
    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString])
    -> Result<Infallible, Errno>;

    /// Terminates the current process immediately.
    ///
    /// This is a thin wrapper around the `_exit` system call. Buffered output
    /// is not flushed and exit handlers do not run.
    fn exit(&mut self, status: ExitStatus) -> !;
}

/// How to handle a signal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SignalHandling {
    /// Perform the default action for the signal.
    #[default]
    Default,
    /// Ignore the signal.
    Ignore,
    /// Catch the signal.
    Catch,
}
