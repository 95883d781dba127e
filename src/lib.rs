//! A tiny interactive shell focused on process and job control.
//!
//! This crate provides the building blocks of a line-oriented command
//! interpreter: a tokenizer that splits one input line into an argument
//! vector, a launcher that forks and execs external programs in the
//! foreground or background, a small set of job-control built-ins, and a
//! signal relay that forwards an interactive SIGQUIT to whichever child is
//! currently running in the foreground. It is intentionally small and easy
//! to read, suitable for experiments with process management.
//!
//! The main entry point is [`Shell`], which owns the dispatch chain and the
//! read-eval loop. The public modules [`command`], [`lexer`], [`signals`]
//! and [`state`] expose the traits and types the shell is assembled from.

mod builtin;
pub mod command;
mod external;
mod interpreter;
pub mod lexer;
pub mod signals;
pub mod state;

/// Just a convenient re-export of the interactive command loop.
///
/// See [`Shell`] for the high-level API.
pub use interpreter::Shell;
