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

//! Execution of external utilities
//!
//! An external utility runs in a child process that is placed in a new
//! process group, so that the signals the terminal sends to the shell do not
//! reach the child unless the shell relays them. The child is registered in
//! the job table as soon as it is forked. The fork and the registration happen
//! in one critical section so that the signal handler never sees a status
//! change of a child that is not yet in the table.

use crate::command_line::CommandLine;
use itertools::Itertools;
use std::collections::HashMap;
use std::ffi::CStr;
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};
use tish_env::Env;
use tish_env::System;
use tish_env::critical::BlockAll;
use tish_env::job::InsertError;
use tish_env::job::JobId;
use tish_env::job::JobState;
use tish_env::job::Pid;
use tish_env::job::fmt::Report;
use tish_env::semantics::Divert;
use tish_env::semantics::ExitStatus;
use tish_env::semantics::Result;
use tish_env::system::Errno;
use tish_env::system::ForkResult;
use tish_env::system::SigSet;
use tish_env::system::SigmaskHow;
use tish_env::system::SignalHandling;
use tish_env::trap::HANDLED_SIGNALS;

/// Starts an external utility in a new job.
///
/// `text` is the command line as the user typed it, which becomes the name of
/// the job. For a background job, this function prints the job report and
/// returns immediately. For a foreground job, this function returns when the
/// job has finished or stopped.
///
/// A new job is not started if the job table is full. A failure of `fork` or
/// of the signal masking around it is fatal and results in
/// `Break(Divert::Abort(...))`.
pub fn start_external_utility<S: System>(
    env: &mut Env<S>,
    path: CString,
    command_line: &CommandLine,
    text: &str,
) -> Result {
    let full = match env.jobs.with(|table| table.is_full()) {
        Ok(full) => full,
        Err(errno) => return abort(env, &format!("sigprocmask error: {errno}")),
    };
    if full {
        env.print_error(&format!("{}\n", InsertError::Full));
        env.exit_status = ExitStatus::FAILURE;
        return Continue(());
    }

    let args = to_c_strings(&command_line.words);
    let envs = env_c_strings(&env.variables);
    log::debug!(
        "Starting {path:?} with arguments [{}]",
        command_line.words.iter().format(", ")
    );

    let guard = match BlockAll::new() {
        Ok(guard) => guard,
        Err(errno) => return abort(env, &format!("sigprocmask error: {errno}")),
    };

    let child = match env.system.fork() {
        Ok(ForkResult::Parent { child }) => child,
        Ok(ForkResult::Child) => {
            let exit_status = replace_current_process(env, &path, &args, &envs, guard.previous());
            env.system.exit(exit_status)
        }
        Err(errno) => {
            drop(guard);
            return abort(env, &format!("fork failed: {errno}"));
        }
    };

    // The child does the same. Whichever runs first wins, and the loser's
    // error is irrelevant.
    env.system.setpgid(child, child).ok();

    let state = if command_line.background {
        JobState::Background
    } else {
        JobState::Foreground
    };
    let jobs = env.jobs;
    let result = jobs.with(|table| -> std::result::Result<JobId, InsertError> {
        let id = table.insert(child, state, text)?;
        if command_line.background {
            if let Some(job) = table.find_by_jid(id) {
                env.print(&format!("{}\n", Report { job }));
            }
        }
        Ok(id)
    });
    drop(guard);

    match result {
        Ok(Ok(id)) => log::debug!("Added job [{id}] {child} {text}"),
        Ok(Err(error)) => {
            log::warn!("process {child} is not tracked: {error}");
            env.print_error(&format!("{error}\n"));
            env.exit_status = ExitStatus::FAILURE;
            return Continue(());
        }
        Err(errno) => return abort(env, &format!("sigprocmask error: {errno}")),
    }

    if !command_line.background {
        if let Err(errno) = env.wait_for_foreground(child) {
            return abort(env, &format!("sigsuspend error: {errno}"));
        }
    }

    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}

/// Prints the message and returns the result that makes the shell exit.
fn abort<S: System>(env: &mut Env<S>, message: &str) -> Result {
    log::error!("{message}");
    env.print_error(&format!("{message}\n"));
    env.exit_status = ExitStatus::FAILURE;
    Break(Divert::Abort(Some(ExitStatus::FAILURE)))
}

/// Converts words into C strings.
///
/// Words containing a null byte are dropped.
pub fn to_c_strings(words: &[String]) -> Vec<CString> {
    words
        .iter()
        .filter_map(|word| CString::new(word.as_str()).ok())
        .collect()
}

/// Converts variables into `name=value` C strings passed to `execve`.
///
/// The result is sorted by name.
pub fn env_c_strings(variables: &HashMap<String, String>) -> Vec<CString> {
    variables
        .iter()
        .sorted_unstable()
        .filter_map(|(name, value)| CString::new(format!("{name}={value}")).ok())
        .collect()
}

/// Substitutes the current process with the external utility.
///
/// This function performs the part of the external utility execution that
/// happens in the child process. It moves the process to its own process
/// group, restores the default handling of the signals the shell catches,
/// unblocks the signals by restoring `mask`, and calls `execve`.
///
/// If `execve` fails, this function prints an error message and returns the
/// exit status with which the caller should immediately exit: `127` if the
/// utility was not found, `126` otherwise.
pub fn replace_current_process<S: System>(
    env: &mut Env<S>,
    path: &CStr,
    args: &[CString],
    envs: &[CString],
    mask: &SigSet,
) -> ExitStatus {
    env.system
        .setpgid(Pid::from_raw(0), Pid::from_raw(0))
        .ok();
    for signal in HANDLED_SIGNALS {
        env.system.sigaction(signal, SignalHandling::Default).ok();
    }
    env.system
        .sigmask(SigmaskHow::SIG_SETMASK, Some(mask), None)
        .ok();

    let Err(errno) = env.system.execve(path, args, envs);

    let name = match args.first() {
        Some(arg) => arg.to_string_lossy(),
        None => path.to_string_lossy(),
    };
    match errno {
        Errno::ENOENT | Errno::ENOTDIR => {
            env.print_error(&format!("{name}: Command not found\n"));
            ExitStatus::NOT_FOUND
        }
        _ => {
            env.print_error(&format!("{name}: {}\n", errno.desc()));
            ExitStatus::NOEXEC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tish_env::VirtualSystem;
    use tish_env::system::Signal;
    use tish_env_test_helper::assert_stderr;
    use tish_env_test_helper::in_virtual_system;
    use tish_env_test_helper::stub_executable;

    fn c_strings(words: &[&str]) -> Vec<CString> {
        words.iter().map(|word| CString::new(*word).unwrap()).collect()
    }

    #[test]
    fn to_c_strings_drops_words_with_nul() {
        let words = ["a".to_string(), "b\0c".to_string(), "d".to_string()];
        assert_eq!(to_c_strings(&words), c_strings(&["a", "d"]));
    }

    #[test]
    fn env_c_strings_are_sorted() {
        let mut variables = HashMap::new();
        variables.insert("PATH".to_string(), "/bin:/usr/bin".to_string());
        variables.insert("HOME".to_string(), "/root".to_string());
        variables.insert("EMPTY".to_string(), String::new());
        assert_eq!(
            env_c_strings(&variables),
            c_strings(&["EMPTY=", "HOME=/root", "PATH=/bin:/usr/bin"])
        );
    }

    #[test]
    fn replace_current_process_calls_execve() {
        in_virtual_system(|mut env, state| {
            let args = c_strings(&["/bin/sleep", "10"]);
            let envs = c_strings(&["HOME=/"]);
            replace_current_process(&mut env, c"/bin/sleep", &args, &envs, &SigSet::empty());

            let state = state.borrow();
            assert_eq!(state.execve_calls.len(), 1);
            let call = &state.execve_calls[0];
            assert_eq!(call.path.as_c_str(), c"/bin/sleep");
            assert_eq!(call.args, args);
            assert_eq!(call.envs, envs);
        })
    }

    #[test]
    fn replace_current_process_restores_signal_handling() {
        in_virtual_system(|mut env, state| {
            for signal in HANDLED_SIGNALS {
                env.system.sigaction(signal, SignalHandling::Catch).unwrap();
            }
            let mut mask = SigSet::empty();
            mask.add(Signal::SIGUSR1);
            env.system
                .sigmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::all()), None)
                .unwrap();

            let args = c_strings(&["foo"]);
            replace_current_process(&mut env, c"foo", &args, &[], &mask);

            let state = state.borrow();
            for signal in HANDLED_SIGNALS {
                assert_eq!(state.signal_handlings[&signal], SignalHandling::Default);
            }
            assert_eq!(state.sigmask, mask);
        })
    }

    #[test]
    fn command_not_found() {
        in_virtual_system(|mut env, state| {
            let args = c_strings(&["no_such_command", "x"]);
            let exit_status =
                replace_current_process(&mut env, c"no_such_command", &args, &[], &SigSet::empty());
            assert_eq!(exit_status, ExitStatus::NOT_FOUND);
            assert_stderr(&state, |stderr| {
                assert_eq!(stderr, "no_such_command: Command not found\n")
            });
        })
    }

    #[test]
    fn command_not_executable() {
        in_virtual_system(|mut env, state| {
            stub_executable(&state, "/tmp/script");
            let args = c_strings(&["/tmp/script"]);
            let exit_status =
                replace_current_process(&mut env, c"/tmp/script", &args, &[], &SigSet::empty());
            assert_eq!(exit_status, ExitStatus::NOEXEC);
            assert_stderr(&state, |stderr| {
                assert_eq!(stderr, format!("/tmp/script: {}\n", Errno::ENOEXEC.desc()))
            });
        })
    }

    #[test]
    fn full_job_table_refuses_new_job() {
        in_virtual_system(|mut env: Env<VirtualSystem>, state| {
            env.jobs
                .with(|table| {
                    for pid in 1..=tish_env::job::CAPACITY {
                        let pid = Pid::from_raw(pid as i32);
                        table.insert(pid, JobState::Background, "sleep 1").unwrap();
                    }
                })
                .unwrap();
            let command_line = crate::command_line::parse("/bin/sleep 1 &").unwrap();

            let result = start_external_utility(
                &mut env,
                c"/bin/sleep".to_owned(),
                &command_line,
                "/bin/sleep 1 &",
            );
            assert_eq!(result, Continue(()));
            assert_eq!(env.exit_status, ExitStatus::FAILURE);
            assert_stderr(&state, |stderr| {
                assert_eq!(stderr, "Tried to create too many jobs\n")
            });
            assert!(state.borrow().processes.is_empty());
        })
    }

    #[test]
    fn fork_failure_is_fatal() {
        in_virtual_system(|mut env, state| {
            state.borrow_mut().fork_error = Some(Errno::EAGAIN);
            let command_line = crate::command_line::parse("/bin/sleep 1").unwrap();

            let result =
                start_external_utility(&mut env, c"/bin/sleep".to_owned(), &command_line, "/bin/sleep 1");
            assert_eq!(result, Break(Divert::Abort(Some(ExitStatus::FAILURE))));
            assert_stderr(&state, |stderr| {
                assert_eq!(stderr, format!("fork failed: {}\n", Errno::EAGAIN))
            });
            assert!(env.jobs.with(|table| table.is_empty()).unwrap());
        })
    }
}
