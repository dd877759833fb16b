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

//! Critical sections delimited by signal masking
//!
//! The job table is shared between the main line of the shell and the signal
//! handlers. The shell has a single thread, so the only way the two can race
//! is a signal being delivered in the middle of an update. This module
//! provides the one synchronization primitive the shell uses: blocking every
//! signal for the duration of a critical section.
//!
//! [`BlockAll`] is an RAII guard that blocks all signals when created and
//! restores the previous signal mask when dropped. [`MaskedCell`] wraps a
//! value so that it can only be accessed inside such a guard.

use nix::errno::Errno;
use nix::sys::signal::SigSet;
use nix::sys::signal::SigmaskHow;
use nix::sys::signal::pthread_sigmask;
use std::cell::UnsafeCell;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Guard that keeps all signals blocked while it is alive
///
/// Guards can be nested. The innermost guard remembers a mask that already
/// blocks everything, so dropping it leaves the signals blocked until the
/// outermost guard is dropped.
///
/// Signals that cannot be blocked (`SIGKILL` and `SIGSTOP`) are silently left
/// unblocked by the operating system.
#[derive(Debug)]
#[must_use = "signals are unblocked when the guard is dropped"]
pub struct BlockAll {
    previous: SigSet,
}

impl BlockAll {
    /// Blocks all signals.
    pub fn new() -> Result<Self, Errno> {
        let mut previous = SigSet::empty();
        pthread_sigmask(
            SigmaskHow::SIG_BLOCK,
            Some(&SigSet::all()),
            Some(&mut previous),
        )?;
        Ok(BlockAll { previous })
    }

    /// Returns the signal mask that was in effect before this guard was
    /// created.
    ///
    /// This is the mask `sigsuspend` should temporarily install to wait for a
    /// signal without leaving the critical section.
    pub fn previous(&self) -> &SigSet {
        &self.previous
    }
}

impl Drop for BlockAll {
    fn drop(&mut self) {
        // Failure is only possible with an invalid `how`, which we never pass.
        pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None).ok();
    }
}

/// Value that is accessible only while all signals are blocked
///
/// A `MaskedCell` is meant to be placed in a `static` so that signal handlers
/// can reach it. The only accessor, [`with`](Self::with), runs a closure in a
/// critical section; no reference to the contents outlives the closure.
#[derive(Debug)]
pub struct MaskedCell<T> {
    value: UnsafeCell<T>,
    busy: AtomicBool,
}

// SAFETY: The contents are only touched inside `with`, which blocks all
// signals and rejects re-entrant calls, so at most one mutable reference
// exists at any time. The shell does not share the cell among threads.
unsafe impl<T: Send> Sync for MaskedCell<T> {}

impl<T> MaskedCell<T> {
    /// Creates a new cell.
    pub const fn new(value: T) -> Self {
        MaskedCell {
            value: UnsafeCell::new(value),
            busy: AtomicBool::new(false),
        }
    }

    /// Runs the closure with exclusive access to the contents.
    ///
    /// All signals are blocked while the closure runs. This function fails
    /// with the error from `pthread_sigmask` if the signals could not be
    /// blocked, or with `EDEADLK` if called from inside another `with` on the
    /// same cell.
    ///
    /// The closure must not call any function that is unsafe to call in a
    /// signal handler if `with` is called from a signal handler.
    pub fn with<F, R>(&self, f: F) -> Result<R, Errno>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _guard = BlockAll::new()?;
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(Errno::EDEADLK);
        }
        let _release = Release(&self.busy);
        // SAFETY: `busy` was false, so no other reference to the contents
        // exists, and signal handlers cannot run until `_guard` is dropped.
        let value = unsafe { &mut *self.value.get() };
        Ok(f(value))
    }
}

/// Clears the busy flag when the closure returns or unwinds.
struct Release<'a>(&'a AtomicBool);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
