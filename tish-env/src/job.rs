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

//! Type definitions for job management.
//!
//! A [`JobTable`] records the child processes the shell has started and not
//! yet reaped. Each [`Job`] is a single process that leads its own process
//! group, so the process ID doubles as the process group ID.
//!
//! The table is shared with signal handlers (see the [`trap`](crate::trap)
//! module), which remove and update jobs. Hence the table never allocates: it
//! has a fixed number of slots and stores job names inline. The shared
//! instance lives in a [`JobCell`], which only hands out the table inside a
//! critical section.

use crate::critical::MaskedCell;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::num::NonZeroUsize;
use thiserror::Error;

#[doc(no_inline)]
pub use nix::unistd::Pid;

pub mod fmt;
pub mod id;

/// Maximum number of jobs the table can hold at a time
pub const CAPACITY: usize = 16;

/// Maximum length of a job name in bytes
pub const MAX_NAME_LEN: usize = 1024;

/// Number that identifies a job in the `%N` notation
pub type JobId = NonZeroUsize;

/// Job table accessible from both the main line and signal handlers
pub type JobCell = MaskedCell<JobTable>;

/// State of a job
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum JobState {
    /// Running, and the shell waits for it to finish or stop
    Foreground,
    /// Running while the shell keeps reading commands
    Background,
    /// Suspended by a stop signal
    Stopped,
}

impl JobState {
    /// Returns the word used for the state in job reports.
    ///
    /// Background jobs are reported as `Running`.
    pub const fn as_str(self) -> &'static str {
        match self {
            JobState::Foreground => "Foreground",
            JobState::Background => "Running",
            JobState::Stopped => "Stopped",
        }
    }
}

impl Display for JobState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command line text of a job, stored inline
///
/// Text longer than [`MAX_NAME_LEN`] bytes is truncated at a character
/// boundary.
#[derive(Clone, Copy, Eq)]
pub struct Name {
    bytes: [u8; MAX_NAME_LEN],
    len: usize,
}

impl Name {
    /// Copies the text into a new name.
    pub fn new(text: &str) -> Self {
        let mut len = text.len().min(MAX_NAME_LEN);
        while !text.is_char_boundary(len) {
            len -= 1;
        }
        let mut bytes = [0; MAX_NAME_LEN];
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        Name { bytes, len }
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        // The contents were copied from a `str` at a character boundary.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Debug for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Child process started by the shell
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Job {
    /// Process ID of the child, which is also its process group ID
    pub pid: Pid,
    /// Job number
    pub id: JobId,
    /// Current state
    pub state: JobState,
    /// Command line that started the job
    pub name: Name,
}

/// Error in [`JobTable::insert`]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum InsertError {
    /// The process ID is not positive or is already in the table.
    #[error("invalid process ID {0}")]
    InvalidPid(Pid),
    /// All slots are occupied.
    #[error("Tried to create too many jobs")]
    Full,
    /// A foreground job was requested while another job is in the foreground.
    #[error("process {0} is already in the foreground")]
    ForegroundTaken(Pid),
}

/// Error in [`JobTable::set_state`]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum StateError {
    /// No job has the process ID.
    #[error("no such process")]
    NoSuchProcess,
    /// Another job is already in the foreground.
    #[error("process {0} is already in the foreground")]
    ForegroundTaken(Pid),
}

/// Fixed-capacity collection of jobs
///
/// The table maintains these invariants:
///
/// - Process IDs are positive and unique.
/// - Job IDs are unique.
/// - At most one job is in the [`Foreground`](JobState::Foreground) state.
///
/// All operations scan the [`CAPACITY`] slots linearly. None of them allocate
/// memory, so they are safe to use in signal handlers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JobTable {
    slots: [Option<Job>; CAPACITY],
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    /// Creates an empty table.
    pub const fn new() -> Self {
        JobTable {
            slots: [None; CAPACITY],
        }
    }

    /// Returns the number of jobs in the table.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns true if the table has no jobs.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns true if no more jobs can be inserted.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Returns the job ID the next inserted job will get.
    ///
    /// The result is one more than the largest ID in use. If that would
    /// exceed [`CAPACITY`], the smallest unused ID is returned instead so that
    /// job IDs never collide.
    pub fn next_id(&self) -> JobId {
        let max = self.jobs().map(|job| job.id.get()).max().unwrap_or(0);
        if max < CAPACITY {
            return JobId::MIN.saturating_add(max);
        }
        (1..=CAPACITY + 1)
            .filter_map(JobId::new)
            .find(|&id| self.find_by_jid(id).is_none())
            .unwrap_or(JobId::MIN)
    }

    /// Adds a job to the table.
    ///
    /// On success, returns the ID assigned to the new job.
    pub fn insert(&mut self, pid: Pid, state: JobState, name: &str) -> Result<JobId, InsertError> {
        if pid.as_raw() <= 0 || self.find_by_pid(pid).is_some() {
            return Err(InsertError::InvalidPid(pid));
        }
        if state == JobState::Foreground {
            if let Some(foreground) = self.foreground_pid() {
                return Err(InsertError::ForegroundTaken(foreground));
            }
        }
        let id = self.next_id();
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(InsertError::Full)?;
        *slot = Some(Job {
            pid,
            id,
            state,
            name: Name::new(name),
        });
        Ok(id)
    }

    /// Removes the job with the process ID.
    ///
    /// Returns the removed job, or `None` if there is no such job.
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        self.slots
            .iter_mut()
            .find(|slot| slot.is_some_and(|job| job.pid == pid))
            .and_then(Option::take)
    }

    /// Finds the job with the process ID.
    pub fn find_by_pid(&self, pid: Pid) -> Option<&Job> {
        self.jobs().find(|job| job.pid == pid)
    }

    fn find_by_pid_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        self.slots.iter_mut().flatten().find(|job| job.pid == pid)
    }

    /// Finds the job with the job ID.
    pub fn find_by_jid(&self, id: JobId) -> Option<&Job> {
        self.jobs().find(|job| job.id == id)
    }

    /// Returns the job ID of the job with the process ID.
    pub fn jid_of(&self, pid: Pid) -> Option<JobId> {
        self.find_by_pid(pid).map(|job| job.id)
    }

    /// Returns the process ID of the foreground job, if any.
    pub fn foreground_pid(&self) -> Option<Pid> {
        self.jobs()
            .find(|job| job.state == JobState::Foreground)
            .map(|job| job.pid)
    }

    /// Changes the state of the job with the process ID.
    ///
    /// Fails without changing anything if there is no such job or if the job
    /// would become a second foreground job.
    pub fn set_state(&mut self, pid: Pid, state: JobState) -> Result<(), StateError> {
        if state == JobState::Foreground {
            if let Some(foreground) = self.foreground_pid() {
                if foreground != pid {
                    return Err(StateError::ForegroundTaken(foreground));
                }
            }
        }
        let job = self.find_by_pid_mut(pid).ok_or(StateError::NoSuchProcess)?;
        job.state = state;
        Ok(())
    }

    /// Returns an iterator over all jobs in slot order.
    pub fn list_all(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.iter(),
            filter: |_| true,
        }
    }

    /// Returns an iterator over background and stopped jobs in slot order.
    ///
    /// This is what the `jobs` built-in reports.
    pub fn list_background_and_stopped(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.iter(),
            filter: |job| job.state != JobState::Foreground,
        }
    }

    fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.slots.iter().flatten()
    }
}

/// Iterator over jobs in a [`JobTable`]
///
/// The iterator borrows the table, so it cannot escape the critical section
/// the table was obtained in. Clone it to iterate again from the start
/// position of the clone.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    slots: std::slice::Iter<'a, Option<Job>>,
    filter: fn(&Job) -> bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Job;

    fn next(&mut self) -> Option<&'a Job> {
        let filter = self.filter;
        self.slots.by_ref().flatten().find(|job| filter(job))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

impl std::iter::FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pid(raw: i32) -> Pid {
        Pid::from_raw(raw)
    }

    fn jid(raw: usize) -> JobId {
        JobId::new(raw).unwrap()
    }

    #[test]
    fn name_is_truncated_at_char_boundary() {
        let text = format!("{}é", "a".repeat(MAX_NAME_LEN - 1));
        let name = Name::new(&text);
        assert_eq!(name.as_str().len(), MAX_NAME_LEN - 1);
        assert_eq!(Name::new("sleep 5"), "sleep 5");
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut table = JobTable::new();
        assert_eq!(table.insert(pid(10), JobState::Background, "a &"), Ok(jid(1)));
        assert_eq!(table.insert(pid(11), JobState::Background, "b &"), Ok(jid(2)));
        assert_eq!(table.insert(pid(12), JobState::Foreground, "c"), Ok(jid(3)));
        assert_eq!(table.len(), 3);

        let job = table.find_by_pid(pid(11)).unwrap();
        assert_eq!(job.id, jid(2));
        assert_eq!(job.state, JobState::Background);
        assert_eq!(job.name, "b &");
    }

    #[test]
    fn insert_rejects_invalid_pids() {
        let mut table = JobTable::new();
        assert_eq!(
            table.insert(pid(0), JobState::Background, "x"),
            Err(InsertError::InvalidPid(pid(0)))
        );
        assert_eq!(
            table.insert(pid(-3), JobState::Background, "x"),
            Err(InsertError::InvalidPid(pid(-3)))
        );
        table.insert(pid(5), JobState::Background, "x").unwrap();
        assert_eq!(
            table.insert(pid(5), JobState::Stopped, "y"),
            Err(InsertError::InvalidPid(pid(5)))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_rejects_second_foreground_job() {
        let mut table = JobTable::new();
        table.insert(pid(5), JobState::Foreground, "x").unwrap();
        assert_eq!(
            table.insert(pid(6), JobState::Foreground, "y"),
            Err(InsertError::ForegroundTaken(pid(5)))
        );
        assert_eq!(table.foreground_pid(), Some(pid(5)));
    }

    #[test]
    fn insert_into_full_table() {
        let mut table = JobTable::new();
        for i in 0..CAPACITY as i32 {
            table.insert(pid(100 + i), JobState::Background, "x").unwrap();
        }
        assert!(table.is_full());
        assert_eq!(
            table.insert(pid(200), JobState::Background, "y"),
            Err(InsertError::Full)
        );
        assert_eq!(InsertError::Full.to_string(), "Tried to create too many jobs");
    }

    #[test]
    fn next_id_after_removal_of_last_job() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Background, "a").unwrap();
        table.insert(pid(11), JobState::Background, "b").unwrap();
        table.remove(pid(11));
        assert_eq!(table.next_id(), jid(2));
        table.remove(pid(10));
        assert_eq!(table.next_id(), jid(1));
    }

    #[test]
    fn next_id_wraps_to_smallest_unused_id() {
        let mut table = JobTable::new();
        for i in 0..CAPACITY as i32 {
            table.insert(pid(100 + i), JobState::Background, "x").unwrap();
        }
        table.remove(pid(100));
        table.remove(pid(102));
        assert_eq!(table.next_id(), jid(1));
        assert_eq!(table.insert(pid(300), JobState::Background, "y"), Ok(jid(1)));
        assert_eq!(table.insert(pid(301), JobState::Background, "z"), Ok(jid(3)));
    }

    #[test]
    fn remove_frees_the_slot() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Stopped, "a").unwrap();
        let job = table.remove(pid(10)).unwrap();
        assert_eq!(job.pid, pid(10));
        assert_eq!(job.state, JobState::Stopped);
        assert!(table.is_empty());
        assert_eq!(table.remove(pid(10)), None);
    }

    #[test]
    fn lookups_by_pid_and_jid() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Background, "a").unwrap();
        table.insert(pid(20), JobState::Stopped, "b").unwrap();
        assert_eq!(table.jid_of(pid(20)), Some(jid(2)));
        assert_eq!(table.jid_of(pid(30)), None);
        assert_eq!(table.find_by_jid(jid(1)).map(|job| job.pid), Some(pid(10)));
        assert_eq!(table.find_by_jid(jid(3)), None);
    }

    #[test]
    fn set_state_keeps_single_foreground_job() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Background, "a").unwrap();
        table.insert(pid(20), JobState::Stopped, "b").unwrap();

        assert_eq!(table.set_state(pid(20), JobState::Foreground), Ok(()));
        assert_eq!(table.set_state(pid(20), JobState::Foreground), Ok(()));
        assert_matches!(
            table.set_state(pid(10), JobState::Foreground),
            Err(StateError::ForegroundTaken(foreground)) if foreground == pid(20)
        );
        assert_eq!(
            table.set_state(pid(30), JobState::Stopped),
            Err(StateError::NoSuchProcess)
        );
        assert_eq!(table.foreground_pid(), Some(pid(20)));
    }

    #[test]
    fn listings_are_in_slot_order_and_restartable() {
        let mut table = JobTable::new();
        table.insert(pid(10), JobState::Background, "a").unwrap();
        table.insert(pid(20), JobState::Foreground, "b").unwrap();
        table.insert(pid(30), JobState::Stopped, "c").unwrap();
        table.remove(pid(10));
        table.insert(pid(40), JobState::Background, "d").unwrap();

        let all: Vec<_> = table.list_all().map(|job| job.pid.as_raw()).collect();
        assert_eq!(all, [40, 20, 30]);

        let listing = table.list_background_and_stopped();
        let first: Vec<_> = listing.clone().map(|job| job.pid.as_raw()).collect();
        let second: Vec<_> = listing.map(|job| job.pid.as_raw()).collect();
        assert_eq!(first, [40, 30]);
        assert_eq!(first, second);
    }
}
