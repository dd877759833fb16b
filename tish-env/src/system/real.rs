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

//! Implementation of `System` that actually interacts with the system.

use super::Errno;
use super::ForkResult;
use super::SigSet;
use super::SigmaskHow;
use super::Signal;
use super::SignalHandling;
use super::System;
use super::WaitStatus;
use crate::io::Fd;
use crate::job::Pid;
use crate::semantics::ExitStatus;
use crate::trap::catch_signal;
use nix::sys::signal::SaFlags;
use nix::sys::signal::SigAction;
use nix::sys::signal::SigHandler;
use nix::sys::wait::WaitPidFlag;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::mem::MaybeUninit;

fn is_executable(path: &CStr) -> bool {
    unsafe { libc::faccessat(libc::AT_FDCWD, path.as_ptr(), libc::X_OK, libc::AT_EACCESS) == 0 }
}

fn is_regular_file(path: &CStr) -> bool {
    let mut stat = MaybeUninit::uninit();
    unsafe {
        libc::stat(path.as_ptr(), stat.as_mut_ptr()) == 0 && {
            let stat = stat.assume_init();
            stat.st_mode & libc::S_IFMT == libc::S_IFREG
        }
    }
}

/// Implementation of `System` that actually interacts with the system.
///
/// `RealSystem` is an empty `struct` because the underlying operating system
/// manages the system's internal state.
#[derive(Debug)]
pub struct RealSystem(());

impl RealSystem {
    /// Returns an instance of `RealSystem`.
    ///
    /// # Safety
    ///
    /// This function is marked `unsafe` because improper use of `RealSystem`
    /// may lead to undefined behavior. Remember that `fork` is not safe in a
    /// multi-threaded program. You should never use `RealSystem` in a
    /// multi-threaded program. Signal handlers may create their own instance,
    /// as they only call the async-signal-safe methods.
    pub unsafe fn new() -> Self {
        RealSystem(())
    }
}

impl System for RealSystem {
    fn is_executable_file(&self, path: &CStr) -> bool {
        is_regular_file(path) && is_executable(path)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd, Errno> {
        loop {
            let result = unsafe { libc::dup2(from.0, to.0) };
            match Errno::result(result) {
                Ok(fd) => return Ok(Fd(fd)),
                Err(Errno::EINTR) => (),
                Err(e) => return Err(e),
            }
        }
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize, Errno> {
        loop {
            let result = unsafe { libc::read(fd.0, buffer.as_mut_ptr().cast(), buffer.len()) };
            match Errno::result(result) {
                Ok(count) => return Ok(count as usize),
                Err(Errno::EINTR) => (),
                Err(e) => return Err(e),
            }
        }
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize, Errno> {
        loop {
            let result = unsafe { libc::write(fd.0, buffer.as_ptr().cast(), buffer.len()) };
            match Errno::result(result) {
                Ok(count) => return Ok(count as usize),
                Err(Errno::EINTR) => (),
                Err(e) => return Err(e),
            }
        }
    }

    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        oldset: Option<&mut SigSet>,
    ) -> Result<(), Errno> {
        nix::sys::signal::sigprocmask(how, set, oldset)
    }

    fn sigaction(
        &mut self,
        signal: Signal,
        handling: SignalHandling,
    ) -> Result<SignalHandling, Errno> {
        let handler = match handling {
            SignalHandling::Default => SigHandler::SigDfl,
            SignalHandling::Ignore => SigHandler::SigIgn,
            SignalHandling::Catch => SigHandler::Handler(catch_signal),
        };
        let new_action = SigAction::new(handler, SaFlags::SA_RESTART, SigSet::empty());
        // SAFETY: The `catch_signal` function only performs async-signal-safe
        // operations.
        let old_action = unsafe { nix::sys::signal::sigaction(signal, &new_action) }?;
        let old_handling = match old_action.handler() {
            SigHandler::SigDfl => SignalHandling::Default,
            SigHandler::SigIgn => SignalHandling::Ignore,
            SigHandler::Handler(_) | SigHandler::SigAction(_) => SignalHandling::Catch,
        };
        Ok(old_handling)
    }

    fn suspend(&mut self, mask: &SigSet) -> Result<Vec<Signal>, Errno> {
        let result = unsafe { libc::sigsuspend(mask.as_ref()) };
        match Errno::result(result) {
            Err(Errno::EINTR) | Ok(_) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> Result<(), Errno> {
        nix::sys::signal::kill(target, signal)
    }

    fn wait(&mut self) -> Result<WaitStatus, Errno> {
        let options = WaitPidFlag::WUNTRACED | WaitPidFlag::WNOHANG;
        nix::sys::wait::waitpid(Option::<Pid>::None, Some(options))
    }

    fn fork(&mut self) -> Result<ForkResult, Errno> {
        // SAFETY: The shell is single-threaded (see `RealSystem::new`).
        unsafe { nix::unistd::fork() }
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<(), Errno> {
        nix::unistd::setpgid(pid, pgid)
    }

    fn execve(
        &mut self,
        path: &CStr,
        args: &[CString],
        envs: &[CString],
    ) -> Result<Infallible, Errno> {
        loop {
            let result = nix::unistd::execve(path, args, envs);
            if result != Err(Errno::EINTR) {
                return result;
            }
        }
    }

    fn exit(&mut self, status: ExitStatus) -> ! {
        // SAFETY: `_exit` only terminates the process. It is async-signal-safe
        // and does not run destructors or flush buffers that another thread
        // or an interrupted main line might be holding.
        unsafe { libc::_exit(status.0) }
    }
}
