//! Launching external programs in the foreground or background.

use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::interpreter::Factory;
use crate::state::ShellState;
use anyhow::{Context, Result};
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, execvp, fork};
use std::ffi::CString;
use std::io::Write;

/// Command that is not a builtin: forked off and exec'd by name, with the
/// executable search path doing the lookup.
pub struct ExternalCommand {
    argv: Vec<String>,
    background: bool,
}

impl ExternalCommand {
    pub fn new(argv: Vec<String>, background: bool) -> Self {
        Self { argv, background }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    /// The fallback factory: any name reaches the launcher. A name that
    /// resolves to nothing fails inside the child, not here.
    fn try_create(
        &self,
        name: &str,
        args: &[&str],
        background: bool,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let argv = std::iter::once(name)
            .chain(args.iter().copied())
            .map(str::to_owned)
            .collect();
        Some(Box::new(ExternalCommand::new(argv, background)))
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Fork and exec `argv[0]`.
    ///
    /// Foreground: the child is recorded in the foreground slot, waited on
    /// by pid until it terminates (status ignored), and the slot is cleared
    /// once the wait returns. Background: the pid is reported and the child
    /// is never waited on again by the shell.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode> {
        let argv: Vec<CString> = self
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<_, _>>()
            .context("argument contains an interior NUL byte")?;

        match unsafe { fork() }.context("fork failed")? {
            ForkResult::Child => {
                // execvp only returns on failure; the parent shell must not
                // see this branch continue.
                let _ = execvp(&argv[0], &argv);
                eprintln!("execvp failed");
                std::process::exit(1);
            }
            ForkResult::Parent { child } => {
                if self.background {
                    writeln!(stdout, "[Child PID = {child}, background = TRUE]")?;
                } else {
                    writeln!(stdout, "[Child PID = {child}, background = FALSE]")?;
                    state.foreground.set(child);
                    let _ = waitpid(child, None);
                    state.foreground.clear();
                    writeln!(stdout, "Child process complete.")?;
                }
                Ok(0)
            }
        }
    }
}
