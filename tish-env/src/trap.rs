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

//! Signal coordination
//!
//! This module turns asynchronous signals into job table updates. The shell
//! catches four signals:
//!
//! - `SIGCHLD`: every child status change available is reaped without
//!   blocking. Exited and killed jobs are removed from the table; stopped jobs
//!   are marked [`Stopped`](JobState::Stopped). A [`Notice`] is printed for
//!   killed and stopped jobs.
//! - `SIGINT` and `SIGTSTP`: the signal is relayed to the process group of the
//!   foreground job, if any. A job that is sent `SIGTSTP` is marked stopped
//!   immediately so that the shell can stop waiting for it.
//! - `SIGQUIT`: the shell prints a message and exits.
//!
//! [`handle_signal`] implements the behavior for a single signal on any
//! [`System`]. The real signal handler registered by [`install`] calls it with
//! a [`RealSystem`]. Everything reachable from `handle_signal` is
//! async-signal-safe: job table access happens in a critical section, messages
//! are formatted on the stack, and nothing allocates.
//!
//! The pure part of reaping, [`apply`], updates a job table according to a
//! single [`Notification`].

use crate::io::Fd;
use crate::io::StackWriter;
use crate::job::JobCell;
use crate::job::JobId;
use crate::job::JobState;
use crate::job::JobTable;
use crate::job::MAX_NAME_LEN;
use crate::job::Pid;
use crate::semantics::ExitStatus;
use crate::system::Errno;
use crate::system::Signal;
use crate::system::SignalHandling;
use crate::system::System;
use crate::system::WaitStatus;
use crate::system::real::RealSystem;
use std::ffi::c_int;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ptr;
use std::sync::atomic::AtomicPtr;
use std::sync::atomic::Ordering;
use thiserror::Error;

/// Signals [`install`] catches
pub const HANDLED_SIGNALS: [Signal; 4] = [
    Signal::SIGCHLD,
    Signal::SIGINT,
    Signal::SIGTSTP,
    Signal::SIGQUIT,
];

/// Message printed before exiting on `SIGQUIT`
pub const QUIT_MESSAGE: &str = "Terminating after receipt of SIGQUIT signal";

/// Job table the real signal handler works on
static REGISTERED_JOBS: AtomicPtr<JobCell> = AtomicPtr::new(ptr::null_mut());

/// Child status change reported by `waitpid`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notification {
    /// The process exited normally.
    Exited { pid: Pid },
    /// The process was terminated by a signal.
    Signaled { pid: Pid, signal: Signal },
    /// The process was stopped by a signal.
    Stopped { pid: Pid, signal: Signal },
    /// The process was resumed.
    Continued { pid: Pid },
}

impl Notification {
    /// Converts a wait status to a notification.
    ///
    /// Returns `None` for `StillAlive` and ptrace events.
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(pid, _) => Some(Notification::Exited { pid }),
            WaitStatus::Signaled(pid, signal, _) => Some(Notification::Signaled { pid, signal }),
            WaitStatus::Stopped(pid, signal) => Some(Notification::Stopped { pid, signal }),
            WaitStatus::Continued(pid) => Some(Notification::Continued { pid }),
            _ => None,
        }
    }
}

/// Message the shell prints when a job is killed or stopped
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notice {
    Terminated { id: JobId, pid: Pid, signal: Signal },
    Stopped { id: JobId, pid: Pid, signal: Signal },
}

/// Formats the notice with the signal number.
///
/// ```
/// # use tish_env::job::{JobId, Pid};
/// # use tish_env::system::Signal;
/// # use tish_env::trap::Notice;
/// let notice = Notice::Terminated {
///     id: JobId::MIN,
///     pid: Pid::from_raw(42),
///     signal: Signal::SIGINT,
/// };
/// assert_eq!(notice.to_string(), "Job [1] (42) terminated by signal 2");
/// ```
impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (id, pid, signal, what) = match *self {
            Notice::Terminated { id, pid, signal } => (id, pid, signal, "terminated"),
            Notice::Stopped { id, pid, signal } => (id, pid, signal, "stopped"),
        };
        write!(f, "Job [{id}] ({pid}) {what} by signal {}", signal as c_int)
    }
}

/// Applies a notification to the job table.
///
/// Returns the notice to print, if any. Notifications for processes that are
/// not in the table are ignored.
pub fn apply(table: &mut JobTable, notification: Notification) -> Option<Notice> {
    match notification {
        Notification::Exited { pid } => {
            table.remove(pid);
            None
        }
        Notification::Signaled { pid, signal } => {
            let job = table.remove(pid)?;
            Some(Notice::Terminated {
                id: job.id,
                pid,
                signal,
            })
        }
        Notification::Stopped { pid, signal } => {
            table.set_state(pid, JobState::Stopped).ok()?;
            let id = table.jid_of(pid)?;
            Some(Notice::Stopped { id, pid, signal })
        }
        Notification::Continued { .. } => None,
    }
}

/// What the shell should do after handling a signal
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use]
pub enum Action {
    /// Resume what the shell was doing.
    Continue,
    /// Exit immediately with the exit status.
    Exit(ExitStatus),
}

/// Error that makes a signal handler terminate the shell
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
enum HandlerError {
    #[error("kill failed: {0}")]
    Kill(Errno),
    #[error("sigprocmask error: {0}")]
    Mask(Errno),
}

/// Handles a caught signal.
///
/// This function is what the real signal handler runs. It can also be called
/// directly with a virtual system to simulate the arrival of a signal.
///
/// If `kill` fails for a reason other than the process group having already
/// vanished, an error message is printed and the result is
/// `Action::Exit(ExitStatus::FAILURE)`.
pub fn handle_signal<S: System>(system: &mut S, jobs: &JobCell, signal: Signal) -> Action {
    let result = match signal {
        Signal::SIGCHLD => reap(system, jobs),
        Signal::SIGINT | Signal::SIGTSTP => relay(system, jobs, signal),
        Signal::SIGQUIT => {
            print_line(system, QUIT_MESSAGE);
            return Action::Exit(ExitStatus::FAILURE);
        }
        _ => Ok(()),
    };
    match result {
        Ok(()) => Action::Continue,
        Err(error) => {
            print_line(system, error);
            Action::Exit(ExitStatus::FAILURE)
        }
    }
}

/// Reaps all available child status changes.
fn reap<S: System>(system: &mut S, jobs: &JobCell) -> Result<(), HandlerError> {
    loop {
        let status = match system.wait() {
            Ok(WaitStatus::StillAlive) | Err(_) => return Ok(()),
            Ok(status) => status,
        };
        let Some(notification) = Notification::from_wait_status(status) else {
            continue;
        };
        let notice = jobs
            .with(|table| apply(table, notification))
            .map_err(HandlerError::Mask)?;
        if let Some(notice) = notice {
            print_line(system, notice);
        }
    }
}

/// Sends the signal to the foreground process group.
fn relay<S: System>(system: &mut S, jobs: &JobCell, signal: Signal) -> Result<(), HandlerError> {
    jobs.with(|table| {
        let Some(pid) = table.foreground_pid() else {
            return Ok(());
        };
        match system.kill(Pid::from_raw(-pid.as_raw()), Some(signal)) {
            Ok(()) | Err(Errno::ESRCH) => (),
            Err(errno) => return Err(HandlerError::Kill(errno)),
        }
        if signal == Signal::SIGTSTP {
            table.set_state(pid, JobState::Stopped).ok();
        }
        Ok(())
    })
    .map_err(HandlerError::Mask)?
}

/// Writes a line to the standard output without allocating.
fn print_line<S: System, D: Display>(system: &mut S, message: D) {
    let line = StackWriter::<{ MAX_NAME_LEN + 128 }>::line(message);
    system.write_all(Fd::STDOUT, line.as_bytes()).ok();
}

/// Registers the job table and catches [`HANDLED_SIGNALS`].
///
/// After this function returns, the real signal handler updates `jobs`. Only
/// the last table passed to this function is updated.
pub fn install<S: System>(system: &mut S, jobs: &'static JobCell) -> Result<(), Errno> {
    REGISTERED_JOBS.store(ptr::from_ref(jobs).cast_mut(), Ordering::Release);
    for signal in HANDLED_SIGNALS {
        system.sigaction(signal, SignalHandling::Catch)?;
    }
    Ok(())
}

/// Signal catching function.
///
/// This function can only perform async-signal-safe operations. It preserves
/// `errno` for the code it interrupted.
pub(crate) extern "C" fn catch_signal(signal: c_int) {
    let saved_errno = errno::errno();

    let jobs = REGISTERED_JOBS.load(Ordering::Acquire);
    // SAFETY: The pointer is null or comes from a `&'static JobCell`.
    if let (Some(jobs), Ok(signal)) = (unsafe { jobs.as_ref() }, Signal::try_from(signal)) {
        // SAFETY: `handle_signal` only calls async-signal-safe methods.
        let mut system = unsafe { RealSystem::new() };
        if let Action::Exit(exit_status) = handle_signal(&mut system, jobs, signal) {
            system.exit(exit_status);
        }
    }

    errno::set_errno(saved_errno);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::r#virtual::VirtualSystem;

    fn pid(raw: i32) -> Pid {
        Pid::from_raw(raw)
    }

    fn leak_jobs() -> &'static JobCell {
        Box::leak(Box::new(JobCell::new(JobTable::new())))
    }

    /// Forks a virtual child and registers it as a job.
    fn spawn(system: &mut VirtualSystem, jobs: &JobCell, state: JobState, name: &str) -> Pid {
        let child = match system.fork() {
            Ok(crate::system::ForkResult::Parent { child }) => child,
            other => panic!("unexpected fork result {other:?}"),
        };
        system.setpgid(child, child).unwrap();
        jobs.with(|table| table.insert(child, state, name))
            .unwrap()
            .unwrap();
        child
    }

    #[test]
    fn apply_exited_removes_silently() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Foreground, "true").unwrap();
        let notification = Notification::Exited { pid: pid(10) };
        assert_eq!(apply(&mut table, notification), None);
        assert!(table.is_empty());
    }

    #[test]
    fn apply_signaled_removes_with_notice() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Background, "a").unwrap();
        table.insert(pid(11), JobState::Foreground, "b").unwrap();
        let notification = Notification::Signaled {
            pid: pid(11),
            signal: Signal::SIGINT,
        };
        let notice = apply(&mut table, notification).unwrap();
        assert_eq!(notice.to_string(), "Job [2] (11) terminated by signal 2");
        assert_eq!(table.find_by_pid(pid(11)), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn apply_stopped_keeps_job_in_both_indices() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Background, "a").unwrap();
        let notification = Notification::Stopped {
            pid: pid(10),
            signal: Signal::SIGTSTP,
        };
        let notice = apply(&mut table, notification).unwrap();
        assert_eq!(
            notice.to_string(),
            format!("Job [1] (10) stopped by signal {}", Signal::SIGTSTP as c_int)
        );
        let job = table.find_by_pid(pid(10)).unwrap();
        assert_eq!(job.state, JobState::Stopped);
        assert_eq!(table.find_by_jid(job.id), Some(job));
    }

    #[test]
    fn apply_ignores_unknown_and_continued_processes() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Stopped, "a").unwrap();
        let before = table.clone();
        let notification = Notification::Signaled {
            pid: pid(99),
            signal: Signal::SIGKILL,
        };
        assert_eq!(apply(&mut table, notification), None);
        assert_eq!(apply(&mut table, Notification::Continued { pid: pid(10) }), None);
        assert_eq!(table, before);
    }

    #[test]
    fn notification_from_wait_status() {
        assert_eq!(
            Notification::from_wait_status(WaitStatus::Stopped(pid(5), Signal::SIGTTIN)),
            Some(Notification::Stopped {
                pid: pid(5),
                signal: Signal::SIGTTIN
            })
        );
        assert_eq!(
            Notification::from_wait_status(WaitStatus::Exited(pid(6), 3)),
            Some(Notification::Exited { pid: pid(6) })
        );
        assert_eq!(Notification::from_wait_status(WaitStatus::StillAlive), None);
    }

    #[test]
    fn sigchld_reaps_all_available_statuses() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        let first = spawn(&mut system, jobs, JobState::Background, "sleep 1 &");
        let second = spawn(&mut system, jobs, JobState::Foreground, "sleep 2");
        let third = spawn(&mut system, jobs, JobState::Background, "sleep 3 &");
        system.state.borrow_mut().wait_statuses.extend([
            WaitStatus::Exited(first, 0),
            WaitStatus::Signaled(second, Signal::SIGTERM, false),
            WaitStatus::Stopped(third, Signal::SIGSTOP),
        ]);

        let action = handle_signal(&mut system, jobs, Signal::SIGCHLD);
        assert_eq!(action, Action::Continue);

        let state = system.state.borrow();
        assert_eq!(
            state.stdout_str(),
            format!(
                "Job [2] ({second}) terminated by signal {}\n\
                 Job [3] ({third}) stopped by signal {}\n",
                Signal::SIGTERM as c_int,
                Signal::SIGSTOP as c_int,
            )
        );
        let table = jobs.with(|table| table.clone()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.find_by_pid(third).unwrap().state, JobState::Stopped);
    }

    #[test]
    fn sigint_is_relayed_to_foreground_group() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        spawn(&mut system, jobs, JobState::Background, "sleep 9 &");
        let foreground = spawn(&mut system, jobs, JobState::Foreground, "sleep 5");

        let action = handle_signal(&mut system, jobs, Signal::SIGINT);
        assert_eq!(action, Action::Continue);
        assert_eq!(
            system.state.borrow().sent_signals,
            [(pid(-foreground.as_raw()), Some(Signal::SIGINT))]
        );
        let state = jobs.with(|table| table.find_by_pid(foreground).map(|job| job.state));
        assert_eq!(state, Ok(Some(JobState::Foreground)));
    }

    #[test]
    fn sigint_without_foreground_job_does_nothing() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        spawn(&mut system, jobs, JobState::Background, "sleep 9 &");
        let action = handle_signal(&mut system, jobs, Signal::SIGINT);
        assert_eq!(action, Action::Continue);
        assert!(system.state.borrow().sent_signals.is_empty());
    }

    #[test]
    fn sigtstp_stops_foreground_job() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        let foreground = spawn(&mut system, jobs, JobState::Foreground, "sleep 5");

        let action = handle_signal(&mut system, jobs, Signal::SIGTSTP);
        assert_eq!(action, Action::Continue);
        assert_eq!(
            system.state.borrow().sent_signals,
            [(pid(-foreground.as_raw()), Some(Signal::SIGTSTP))]
        );
        assert_eq!(jobs.with(|table| table.foreground_pid()), Ok(None));
    }

    #[test]
    fn vanished_process_group_is_not_an_error() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        jobs.with(|table| table.insert(pid(50), JobState::Foreground, "ghost"))
            .unwrap()
            .unwrap();
        let action = handle_signal(&mut system, jobs, Signal::SIGINT);
        assert_eq!(action, Action::Continue);
    }

    #[test]
    fn kill_failure_is_fatal() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        spawn(&mut system, jobs, JobState::Foreground, "sleep 5");
        system.state.borrow_mut().kill_error = Some(Errno::EPERM);

        let action = handle_signal(&mut system, jobs, Signal::SIGTSTP);
        assert_eq!(action, Action::Exit(ExitStatus::FAILURE));
        let stdout = system.state.borrow().stdout_str();
        assert!(stdout.starts_with("kill failed: EPERM"), "{stdout:?}");
    }

    #[test]
    fn sigquit_exits() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        let action = handle_signal(&mut system, jobs, Signal::SIGQUIT);
        assert_eq!(action, Action::Exit(ExitStatus::FAILURE));
        assert_eq!(
            system.state.borrow().stdout_str(),
            "Terminating after receipt of SIGQUIT signal\n"
        );
    }

    #[test]
    fn install_catches_handled_signals() {
        let mut system = VirtualSystem::new();
        let jobs = leak_jobs();
        install(&mut system, jobs).unwrap();
        let state = system.state.borrow();
        for signal in HANDLED_SIGNALS {
            assert_eq!(state.signal_handlings[&signal], SignalHandling::Catch);
        }
    }
}
