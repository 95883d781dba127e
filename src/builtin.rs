//! Job-control commands executed inside the shell process.

use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::interpreter::Factory;
use crate::state::ShellState;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use nix::sys::signal::{self, Signal};
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use std::io::Write;
use std::process::Command;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "bg" or "exit".
    fn name() -> &'static str;

    /// Executes the command using the provided output stream and shell state.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero
    /// for error.
    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdout, state) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{e}")?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _state: &mut ShellState,
    ) -> Result<ExitCode> {
        write!(stdout, "{}", self.output)?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        name: &str,
        args: &[&str],
        _background: bool,
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

/// Parse a pid argument the way C `atoi` would: skip leading whitespace,
/// accept an optional sign, read digits until the first non-digit, and fall
/// back to 0 when nothing parses. Missing arguments also target pid 0.
fn parse_pid(arg: Option<&String>) -> Pid {
    Pid::from_raw(arg.map(|s| atoi(s)).unwrap_or(0))
}

fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, s.strip_prefix('+').unwrap_or(s)),
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        value = value * 10 + i64::from(d);
        if value > i64::from(i32::MAX) + 1 {
            break;
        }
    }
    (sign * value).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; exit always succeeds with status 0.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        writeln!(stdout, "RKshell exiting")?;
        state.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Resume a stopped process so it keeps running in the background.
pub struct Bg {
    #[argh(positional, greedy)]
    /// pid of the process to resume.
    pub args: Vec<String>,
}

impl BuiltinCommand for Bg {
    fn name() -> &'static str {
        "bg"
    }

    fn execute(self, _stdout: &mut dyn Write, _state: &mut ShellState) -> Result<ExitCode> {
        let target = parse_pid(self.args.first());
        let _ = signal::kill(target, Signal::SIGCONT);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Resume a process and wait for it in the foreground.
pub struct Fg {
    #[argh(positional, greedy)]
    /// pid of the process to bring to the foreground.
    pub args: Vec<String>,
}

impl BuiltinCommand for Fg {
    fn name() -> &'static str {
        "fg"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        let target = parse_pid(self.args.first());
        let _ = signal::kill(target, Signal::SIGCONT);
        state.foreground.set(target);
        let _ = waitpid(target, None);
        state.foreground.clear();
        writeln!(stdout, "Child Complete: pid = {target}")?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List processes via the system process-listing utility.
pub struct Jobs {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Jobs {
    fn name() -> &'static str {
        "jobs"
    }

    fn execute(self, _stdout: &mut dyn Write, _state: &mut ShellState) -> Result<ExitCode> {
        // Opaque collaborator: its output goes straight to the terminal and
        // is never parsed here.
        let status = Command::new("ps")
            .args(["-o", "pid,tty,stat,time,comm"])
            .status()
            .context("jobs: failed to run ps")?;
        Ok(status.code().unwrap_or(1))
    }
}

#[derive(FromArgs)]
/// Forcibly terminate a process.
pub struct Kill {
    #[argh(positional, greedy)]
    /// pid of the process to terminate.
    pub args: Vec<String>,
}

impl BuiltinCommand for Kill {
    fn name() -> &'static str {
        "kill"
    }

    fn execute(self, _stdout: &mut dyn Write, _state: &mut ShellState) -> Result<ExitCode> {
        let target = parse_pid(self.args.first());
        let _ = signal::kill(target, Signal::SIGKILL);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Suspend a running process.
pub struct Stop {
    #[argh(positional, greedy)]
    /// pid of the process to suspend.
    pub args: Vec<String>,
}

impl BuiltinCommand for Stop {
    fn name() -> &'static str {
        "stop"
    }

    fn execute(self, _stdout: &mut dyn Write, _state: &mut ShellState) -> Result<ExitCode> {
        let target = parse_pid(self.args.first());
        let _ = signal::kill(target, Signal::SIGSTOP);
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::foreground_test_lock;
    use nix::sys::wait::{WaitPidFlag, WaitStatus};
    use std::time::{Duration, Instant};

    #[test]
    fn test_atoi_is_permissive() {
        assert_eq!(atoi("123"), 123);
        assert_eq!(atoi("  42"), 42);
        assert_eq!(atoi("-17"), -17);
        assert_eq!(atoi("+7"), 7);
        assert_eq!(atoi("12ab"), 12);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi(""), 0);
        assert_eq!(atoi("99999999999999999999"), i32::MAX);
    }

    #[test]
    fn test_parse_pid_defaults_to_zero() {
        assert_eq!(parse_pid(None), Pid::from_raw(0));
        assert_eq!(parse_pid(Some(&"nonsense".to_string())), Pid::from_raw(0));
        assert_eq!(parse_pid(Some(&"314".to_string())), Pid::from_raw(314));
    }

    #[test]
    fn test_exit_prints_farewell_and_raises_flag() {
        let mut out = Vec::new();
        let mut state = ShellState::new();
        let code = Exit { _args: Vec::new() }
            .execute(&mut out, &mut state)
            .expect("exit");

        assert_eq!(code, 0);
        assert!(state.should_exit);
        assert_eq!(String::from_utf8(out).expect("utf8"), "RKshell exiting\n");
    }

    #[test]
    fn test_stop_then_bg_drives_child_through_stop_and_continue() {
        let mut child = std::process::Command::new("sleep")
            .arg("5")
            .spawn()
            .expect("spawn sleep");
        let pid = Pid::from_raw(child.id() as i32);
        let pid_arg = vec![pid.to_string()];

        let mut out = Vec::new();
        let mut state = ShellState::new();

        Stop {
            args: pid_arg.clone(),
        }
        .execute(&mut out, &mut state)
        .expect("stop");
        let status = waitpid(pid, Some(WaitPidFlag::WUNTRACED)).expect("waitpid");
        assert_eq!(status, WaitStatus::Stopped(pid, Signal::SIGSTOP));

        Bg { args: pid_arg }
            .execute(&mut out, &mut state)
            .expect("bg");
        let status = waitpid(pid, Some(WaitPidFlag::WCONTINUED)).expect("waitpid");
        assert_eq!(status, WaitStatus::Continued(pid));

        child.kill().expect("kill");
        let _ = child.wait();
    }

    #[test]
    fn test_fg_waits_for_exact_pid_and_reports() {
        let _lock = foreground_test_lock();
        let child = std::process::Command::new("sleep")
            .arg("1")
            .spawn()
            .expect("spawn sleep");
        let pid = Pid::from_raw(child.id() as i32);

        let mut out = Vec::new();
        let mut state = ShellState::new();
        let started = Instant::now();
        let code = Fg {
            args: vec![pid.to_string()],
        }
        .execute(&mut out, &mut state)
        .expect("fg");

        assert_eq!(code, 0);
        assert!(started.elapsed() >= Duration::from_millis(900));
        assert_eq!(state.foreground.get(), None);
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, format!("Child Complete: pid = {pid}\n"));
        // The fg wait reaped the child; nothing further to collect here.
    }

    #[test]
    fn test_jobs_delegates_to_ps() {
        if std::process::Command::new("ps").arg("--version").output().is_err() {
            return; // no ps on this machine, nothing to delegate to
        }
        let mut out = Vec::new();
        let mut state = ShellState::new();
        let code = Jobs { _args: Vec::new() }
            .execute(&mut out, &mut state)
            .expect("jobs");
        assert_eq!(code, 0);
    }
}
