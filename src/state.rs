//! Mutable, shell-level state threaded through command execution.

use crate::signals::ForegroundSlot;

/// Context shared between the dispatcher, the built-ins and the launcher.
///
/// `foreground` is the single-slot handle also read by the signal relay;
/// `should_exit` is the flag the read-eval loop checks to know when to
/// terminate.
pub struct ShellState {
    /// Pid slot naming the child currently waited on in the foreground.
    pub foreground: ForegroundSlot,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            foreground: ForegroundSlot::shared(),
            should_exit: false,
        }
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}
