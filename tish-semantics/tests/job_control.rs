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

//! Job control scenarios run against the virtual system

use std::cell::RefCell;
use std::ops::ControlFlow::{Break, Continue};
use std::os::raw::c_int;
use std::rc::Rc;
use tish_env::Env;
use tish_env::VirtualSystem;
use tish_env::job::JobState;
use tish_env::job::Pid;
use tish_env::semantics::Divert;
use tish_env::semantics::ExitStatus;
use tish_env::system::Signal;
use tish_env::system::WaitStatus;
use tish_env::system::r#virtual::SystemState;
use tish_env::trap::Action;
use tish_env::trap::handle_signal;
use tish_env_test_helper::assert_stdout;
use tish_env_test_helper::job_table;
use tish_env_test_helper::stub_executable;
use tish_semantics::ReadEvalLoop;
use tish_semantics::evaluate;

fn shell() -> (Env<VirtualSystem>, Rc<RefCell<SystemState>>) {
    let mut env = Env::new_virtual();
    env.builtins.extend(tish_builtin::builtins());
    env.variables
        .insert("PATH".to_string(), "/usr/bin:/bin".to_string());
    let state = Rc::clone(&env.system.state);
    stub_executable(&state, "/bin/sleep");
    (env, state)
}

fn deliver(env: &mut Env<VirtualSystem>, signal: Signal) {
    let action = handle_signal(&mut env.system, env.jobs, signal);
    assert_eq!(action, Action::Continue);
}

#[test]
fn background_job_is_announced_and_listed() {
    let (mut env, state) = shell();

    assert_eq!(evaluate(&mut env, "sleep 5 &\n"), Continue(()));
    assert_stdout(&state, |stdout| {
        assert_eq!(stdout, "[1] (100) Running sleep 5 &\n")
    });

    assert_eq!(evaluate(&mut env, "jobs\n"), Continue(()));
    assert_stdout(&state, |stdout| {
        assert_eq!(
            stdout,
            "[1] (100) Running sleep 5 &\n[1] (100) Running sleep 5 &\n"
        )
    });

    let table = job_table(&env);
    let job = table.find_by_pid(Pid::from_raw(100)).unwrap();
    assert_eq!(job.state, JobState::Background);
    assert_eq!(state.borrow().processes[&job.pid].pgid, job.pid);
}

#[test]
fn foreground_job_interrupted() {
    let (mut env, state) = shell();
    let pid = Pid::from_raw(100);
    {
        let mut state = state.borrow_mut();
        state.pending_signals.extend([Signal::SIGINT, Signal::SIGCHLD]);
        state
            .wait_statuses
            .push_back(WaitStatus::Signaled(pid, Signal::SIGINT, false));
    }

    assert_eq!(evaluate(&mut env, "sleep 5\n"), Continue(()));

    assert_stdout(&state, |stdout| {
        assert_eq!(
            stdout,
            format!("Job [1] (100) terminated by signal {}\n", Signal::SIGINT as c_int)
        )
    });
    assert_eq!(
        state.borrow().sent_signals,
        [(Pid::from_raw(-100), Some(Signal::SIGINT))]
    );
    assert!(job_table(&env).is_empty());
}

#[test]
fn foreground_job_stopped_then_resumed_in_background() {
    let (mut env, state) = shell();
    let pid = Pid::from_raw(100);
    {
        let mut state = state.borrow_mut();
        state.pending_signals.extend([Signal::SIGTSTP, Signal::SIGCHLD]);
        state
            .wait_statuses
            .push_back(WaitStatus::Stopped(pid, Signal::SIGTSTP));
    }

    assert_eq!(evaluate(&mut env, "sleep 5\n"), Continue(()));
    let stopped = format!("Job [1] (100) stopped by signal {}\n", Signal::SIGTSTP as c_int);
    assert_stdout(&state, |stdout| assert_eq!(stdout, stopped));
    let table = job_table(&env);
    assert_eq!(table.find_by_pid(pid).unwrap().state, JobState::Stopped);

    assert_eq!(evaluate(&mut env, "bg %1\n"), Continue(()));
    assert_stdout(&state, |stdout| {
        assert_eq!(stdout, format!("{stopped}[1] (100) Running sleep 5\n"))
    });
    assert_eq!(
        state.borrow().sent_signals,
        [
            (Pid::from_raw(-100), Some(Signal::SIGTSTP)),
            (Pid::from_raw(-100), Some(Signal::SIGCONT)),
        ]
    );
    let table = job_table(&env);
    assert_eq!(table.find_by_pid(pid).unwrap().state, JobState::Background);
}

#[test]
fn stopped_job_resumed_in_foreground_until_exit() {
    let (mut env, state) = shell();
    let pid = Pid::from_raw(100);
    {
        let mut state = state.borrow_mut();
        state.pending_signals.push_back(Signal::SIGTSTP);
    }
    assert_eq!(evaluate(&mut env, "sleep 5\n"), Continue(()));
    assert_eq!(job_table(&env).find_by_pid(pid).unwrap().state, JobState::Stopped);

    {
        let mut state = state.borrow_mut();
        state.pending_signals.push_back(Signal::SIGCHLD);
        state.wait_statuses.push_back(WaitStatus::Exited(pid, 0));
    }
    assert_eq!(evaluate(&mut env, "fg 100\n"), Continue(()));
    assert!(job_table(&env).is_empty());
    assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
}

#[test]
fn bg_without_argument() {
    let (mut env, state) = shell();
    assert_eq!(evaluate(&mut env, "bg\n"), Continue(()));
    assert_stdout(&state, |stdout| {
        assert_eq!(stdout, "bg command requires PID or %jobid argument\n")
    });
    assert_eq!(env.exit_status, ExitStatus::FAILURE);
    assert!(state.borrow().processes.is_empty());
}

#[test]
fn job_ids_follow_the_largest_remaining_id() {
    let (mut env, state) = shell();
    assert_eq!(evaluate(&mut env, "sleep 1 &\n"), Continue(()));
    assert_eq!(evaluate(&mut env, "sleep 2 &\n"), Continue(()));

    state
        .borrow_mut()
        .wait_statuses
        .push_back(WaitStatus::Exited(Pid::from_raw(100), 0));
    deliver(&mut env, Signal::SIGCHLD);

    assert_eq!(evaluate(&mut env, "sleep 3 &\n"), Continue(()));
    assert_stdout(&state, |stdout| {
        assert_eq!(
            stdout,
            "[1] (100) Running sleep 1 &\n\
             [2] (101) Running sleep 2 &\n\
             [3] (102) Running sleep 3 &\n"
        )
    });

    let mut ids: Vec<_> = job_table(&env)
        .list_all()
        .map(|job| (job.id.get(), job.pid.as_raw()))
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, [(2, 101), (3, 102)]);
}

#[test]
fn quit_ends_the_loop() {
    let (mut env, state) = shell();
    state
        .borrow_mut()
        .stdin
        .extend(b"sleep 5 &\njobs\nquit\njobs\n");

    let mut read_eval_loop = ReadEvalLoop::new(&mut env);
    read_eval_loop.set_prompt(None);
    let result = read_eval_loop.run();

    assert_eq!(result, Break(Divert::Exit(Some(ExitStatus::SUCCESS))));
    assert_stdout(&state, |stdout| {
        assert_eq!(
            stdout,
            "[1] (100) Running sleep 5 &\n[1] (100) Running sleep 5 &\n"
        )
    });
    assert_eq!(state.borrow().stdin.len(), "jobs\n".len());
}
