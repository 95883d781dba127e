//! The read-eval loop and the command dispatch chain.

use crate::command::{CommandFactory, ExitCode};
use crate::lexer::{self, LineBuffer};
use crate::state::ShellState;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — BuiltinCommand and
/// ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal interactive shell that runs job-control built-ins in-process
/// and forks everything else.
///
/// The shell owns a [`ShellState`] and a list of [`CommandFactory`] objects
/// queried in order to create commands by name. See [`Default`] for the
/// factories included out of the box.
pub struct Shell {
    state: ShellState,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Shell {
    /// Create a new shell with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            state: ShellState::new(),
            commands,
        }
    }

    /// Dispatch one tokenized line, writing reports to the real stdout.
    ///
    /// An empty argument vector is a no-op. The first argument selects a
    /// built-in by exact, case-sensitive match; anything else reaches the
    /// external launcher together with the background flag.
    pub fn dispatch(&mut self, argv: &[&str], background: bool) -> Result<ExitCode> {
        let mut stdout = std::io::stdout();
        self.dispatch_with_output(argv, background, &mut stdout)
    }

    /// Same as [`dispatch`](Shell::dispatch) with the output stream supplied
    /// by the caller.
    pub fn dispatch_with_output(
        &mut self,
        argv: &[&str],
        background: bool,
        stdout: &mut dyn Write,
    ) -> Result<ExitCode> {
        let Some((name, args)) = argv.split_first() else {
            return Ok(0);
        };
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(name, args, background) {
                let code = cmd.execute(stdout, &mut self.state)?;
                stdout.flush()?;
                return Ok(code);
            }
        }
        // Unreachable with the default chain: the external factory accepts
        // every name.
        Err(anyhow::anyhow!("command not found: {}", name))
    }

    /// Whether a previously dispatched command asked the loop to terminate.
    pub fn should_exit(&self) -> bool {
        self.state.should_exit
    }

    /// The interactive Read-Eval-Print Loop.
    ///
    /// One line is read per prompt; the prompt counter advances on every
    /// read, blank lines included. End-of-input (and an interrupt at the
    /// prompt) ends the loop cleanly; a read error is fatal and terminates
    /// the process with status -1.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut buffer = LineBuffer::new();
        let mut command_no: u32 = 0;

        loop {
            command_no += 1;
            let prompt = format!("RKshell[{command_no}] $ ");
            match rl.readline(&prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    buffer.fill(&line);
                    let split = lexer::split_args(buffer.as_str());
                    if split.argv.is_empty() {
                        continue;
                    }
                    if let Err(err) = self.dispatch(&split.argv, split.background) {
                        eprintln!("{err:#}");
                    }
                    if self.state.should_exit {
                        break;
                    }
                }
                Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
                Err(err) => {
                    eprintln!("error reading the command: {err}");
                    std::process::exit(-1);
                }
            }
        }

        Ok(())
    }
}

impl Default for Shell {
    /// Create a shell with the default set of commands:
    /// - built-ins: `exit`, `bg`, `fg`, `jobs`, `kill`, `stop`
    /// - the external command launcher as the fallback
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Bg>::default()),
            Box::new(Factory::<Fg>::default()),
            Box::new(Factory::<Jobs>::default()),
            Box::new(Factory::<Kill>::default()),
            Box::new(Factory::<Stop>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
