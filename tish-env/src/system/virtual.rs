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

//! System simulated in Rust.
//!
//! [`VirtualSystem`] is a pure Rust implementation of [`System`] that simulates
//! the behavior of the underlying system without any interaction with the
//! actual system. `VirtualSystem` is used for testing the behavior of the shell
//! in unit tests.
//!
//! # Processes
//!
//! Forking never creates a real process. The virtual system always plays the
//! parent: it assigns a new process ID, records the new [`Process`], and
//! returns [`ForkResult::Parent`]. Tests script what happens to the children
//! by pushing [`WaitStatus`]es to [`SystemState::wait_statuses`].
//!
//! # Signals
//!
//! Signals sent with [`kill`](System::kill) are recorded in
//! [`SystemState::sent_signals`]. Signals the shell should receive are pushed
//! to [`SystemState::pending_signals`] and returned from
//! [`suspend`](System::suspend).
//!
//! # I/O
//!
//! The standard input is read from [`SystemState::stdin`]. Writes to the
//! standard output and error accumulate in [`SystemState::stdout`] and
//! [`SystemState::stderr`].

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
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::rc::Rc;

/// Simulated system.
///
/// See the [module-level documentation](self) to grasp a basic understanding of
/// `VirtualSystem`.
///
/// Clones of a virtual system share the same [`SystemState`], so a test can
/// keep a clone to inspect the state after handing the system to an `Env`.
#[derive(Clone, Debug, Default)]
pub struct VirtualSystem {
    /// State of the system.
    pub state: Rc<RefCell<SystemState>>,
}

impl VirtualSystem {
    /// Creates a virtual system with an empty state.
    pub fn new() -> VirtualSystem {
        VirtualSystem::default()
    }
}

/// Process known to the virtual system
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Process {
    /// Process group the process belongs to
    pub pgid: Pid,
}

/// Call to [`execve`](System::execve) recorded by the virtual system
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Execve {
    pub path: CString,
    pub args: Vec<CString>,
    pub envs: Vec<CString>,
}

/// State of the virtual system.
#[derive(Clone, Debug)]
pub struct SystemState {
    /// Process ID of the shell itself
    pub shell_pid: Pid,
    /// Process ID assigned to the next forked child
    pub next_pid: Pid,
    /// Children that have not been reaped
    pub processes: BTreeMap<Pid, Process>,
    /// Paths that [`is_executable_file`](System::is_executable_file) accepts
    pub executables: HashSet<CString>,
    /// Contents of the standard input not yet read
    pub stdin: VecDeque<u8>,
    /// Error returned from the next read, if any
    pub read_error: Option<Errno>,
    /// Everything written to the standard output
    pub stdout: Vec<u8>,
    /// Everything written to the standard error
    pub stderr: Vec<u8>,
    /// Targets of [`dup2`](System::dup2): `to` refers to `from`
    pub fd_aliases: HashMap<Fd, Fd>,
    /// Signals sent with [`kill`](System::kill), in order
    pub sent_signals: Vec<(Pid, Option<Signal>)>,
    /// Error returned from every `kill`, if any
    pub kill_error: Option<Errno>,
    /// Error returned from every `fork`, if any
    pub fork_error: Option<Errno>,
    /// Statuses [`wait`](System::wait) reports, in order
    pub wait_statuses: VecDeque<WaitStatus>,
    /// Signals delivered when the shell [suspends](System::suspend)
    pub pending_signals: VecDeque<Signal>,
    /// Current signal handling settings
    pub signal_handlings: HashMap<Signal, SignalHandling>,
    /// Current signal blocking mask
    pub sigmask: SigSet,
    /// Calls to `execve`
    pub execve_calls: Vec<Execve>,
    /// Exit status passed to [`exit`](System::exit)
    pub exit_status: Option<ExitStatus>,
}

impl Default for SystemState {
    fn default() -> Self {
        SystemState {
            shell_pid: Pid::from_raw(2),
            next_pid: Pid::from_raw(100),
            processes: BTreeMap::new(),
            executables: HashSet::new(),
            stdin: VecDeque::new(),
            read_error: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            fd_aliases: HashMap::new(),
            sent_signals: Vec::new(),
            kill_error: None,
            fork_error: None,
            wait_statuses: VecDeque::new(),
            pending_signals: VecDeque::new(),
            signal_handlings: HashMap::new(),
            sigmask: SigSet::empty(),
            execve_calls: Vec::new(),
            exit_status: None,
        }
    }
}

impl SystemState {
    /// Returns the standard output as a string.
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Returns the standard error as a string.
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    fn resolve_fd(&self, fd: Fd) -> Fd {
        self.fd_aliases.get(&fd).copied().unwrap_or(fd)
    }
}

impl System for VirtualSystem {
    fn is_executable_file(&self, path: &CStr) -> bool {
        self.state.borrow().executables.contains(path)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd, Errno> {
        let mut state = self.state.borrow_mut();
        let from = state.resolve_fd(from);
        if ![Fd::STDIN, Fd::STDOUT, Fd::STDERR].contains(&from) {
            return Err(Errno::EBADF);
        }
        if from == to {
            state.fd_aliases.remove(&to);
        } else {
            state.fd_aliases.insert(to, from);
        }
        Ok(to)
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize, Errno> {
        let mut state = self.state.borrow_mut();
        if state.resolve_fd(fd) != Fd::STDIN {
            return Err(Errno::EBADF);
        }
        if let Some(errno) = state.read_error.take() {
            return Err(errno);
        }
        let count = buffer.len().min(state.stdin.len());
        for (byte, input) in buffer.iter_mut().zip(state.stdin.drain(..count)) {
            *byte = input;
        }
        Ok(count)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize, Errno> {
        let mut state = self.state.borrow_mut();
        match state.resolve_fd(fd) {
            Fd::STDOUT => state.stdout.extend_from_slice(buffer),
            Fd::STDERR => state.stderr.extend_from_slice(buffer),
            _ => return Err(Errno::EBADF),
        }
        Ok(buffer.len())
    }

    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        oldset: Option<&mut SigSet>,
    ) -> Result<(), Errno> {
        let mut state = self.state.borrow_mut();
        if let Some(oldset) = oldset {
            *oldset = state.sigmask;
        }
        if let Some(set) = set {
            match how {
                SigmaskHow::SIG_BLOCK => state.sigmask.extend(set),
                SigmaskHow::SIG_UNBLOCK => {
                    for signal in set.iter() {
                        state.sigmask.remove(signal);
                    }
                }
                _ => state.sigmask = *set,
            }
        }
        Ok(())
    }

    fn sigaction(
        &mut self,
        signal: Signal,
        handling: SignalHandling,
    ) -> Result<SignalHandling, Errno> {
        let mut state = self.state.borrow_mut();
        let old = state.signal_handlings.insert(signal, handling);
        Ok(old.unwrap_or_default())
    }

    /// Returns all pending signals.
    ///
    /// Fails with `EDEADLK` if no signal is pending, since a real shell would
    /// sleep forever.
    fn suspend(&mut self, _mask: &SigSet) -> Result<Vec<Signal>, Errno> {
        let mut state = self.state.borrow_mut();
        if state.pending_signals.is_empty() {
            return Err(Errno::EDEADLK);
        }
        Ok(state.pending_signals.drain(..).collect())
    }

    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> Result<(), Errno> {
        let mut state = self.state.borrow_mut();
        if let Some(errno) = state.kill_error {
            return Err(errno);
        }
        let exists = match target.as_raw() {
            raw if raw > 0 => state.processes.contains_key(&target),
            raw if raw < 0 => {
                let pgid = Pid::from_raw(-raw);
                state.processes.values().any(|process| process.pgid == pgid)
            }
            _ => true,
        };
        if !exists {
            return Err(Errno::ESRCH);
        }
        state.sent_signals.push((target, signal));
        Ok(())
    }

    fn wait(&mut self) -> Result<WaitStatus, Errno> {
        let mut state = self.state.borrow_mut();
        match state.wait_statuses.pop_front() {
            Some(status) => {
                if let WaitStatus::Exited(pid, _) | WaitStatus::Signaled(pid, _, _) = status {
                    state.processes.remove(&pid);
                }
                Ok(status)
            }
            None if state.processes.is_empty() => Err(Errno::ECHILD),
            None => Ok(WaitStatus::StillAlive),
        }
    }

    fn fork(&mut self) -> Result<ForkResult, Errno> {
        let mut state = self.state.borrow_mut();
        if let Some(errno) = state.fork_error {
            return Err(errno);
        }
        let child = state.next_pid;
        state.next_pid = Pid::from_raw(child.as_raw() + 1);
        let pgid = state.shell_pid;
        state.processes.insert(child, Process { pgid });
        Ok(ForkResult::Parent { child })
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<(), Errno> {
        let mut state = self.state.borrow_mut();
        let process = state.processes.get_mut(&pid).ok_or(Errno::ESRCH)?;
        process.pgid = if pgid.as_raw() == 0 { pid } else { pgid };
        Ok(())
    }

    /// Records the call.
    ///
    /// A virtual process cannot be replaced, so this function always fails:
    /// with `ENOENT` if the path is not one of the
    /// [`executables`](SystemState::executables), otherwise with `ENOEXEC`.
    fn execve(
        &mut self,
        path: &CStr,
        args: &[CString],
        envs: &[CString],
    ) -> Result<Infallible, Errno> {
        let mut state = self.state.borrow_mut();
        state.execve_calls.push(Execve {
            path: path.to_owned(),
            args: args.to_vec(),
            envs: envs.to_vec(),
        });
        if state.executables.contains(path) {
            Err(Errno::ENOEXEC)
        } else {
            Err(Errno::ENOENT)
        }
    }

    /// Records the exit status and panics.
    ///
    /// The virtual system has no process to terminate, so the test thread
    /// unwinds instead.
    fn exit(&mut self, status: ExitStatus) -> ! {
        self.state.borrow_mut().exit_status = Some(status);
        panic!("virtual process exited with status {status}")
    }
}
