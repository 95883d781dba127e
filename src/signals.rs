//! Relaying the interactive quit signal to the foreground child.
//!
//! The shell keeps exactly one piece of process-wide mutable state: the pid
//! of the child currently being waited on in the foreground. The dispatch
//! thread writes it around its blocking wait; the SIGQUIT handler only reads
//! it and forwards the signal. No other signal disposition is touched.

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::Pid;
use std::sync::atomic::{AtomicI32, Ordering};

const NO_PID: i32 = -1;

static FOREGROUND_PID: AtomicI32 = AtomicI32::new(NO_PID);

/// Handle to the single-slot foreground pid shared with the signal handler.
///
/// The slot is set immediately before a blocking wait begins and cleared
/// immediately after that wait returns, always on the dispatch thread. The
/// handler never writes, so no lock is needed.
#[derive(Clone, Copy)]
pub struct ForegroundSlot {
    pid: &'static AtomicI32,
}

impl ForegroundSlot {
    /// The process-wide slot read by the SIGQUIT handler.
    pub fn shared() -> Self {
        Self {
            pid: &FOREGROUND_PID,
        }
    }

    /// Mark `pid` as the current foreground child.
    pub fn set(&self, pid: Pid) {
        self.pid.store(pid.as_raw(), Ordering::SeqCst);
    }

    /// Mark the shell as having no foreground child.
    pub fn clear(&self) {
        self.pid.store(NO_PID, Ordering::SeqCst);
    }

    /// Pid of the current foreground child, if any.
    pub fn get(&self) -> Option<Pid> {
        match self.pid.load(Ordering::SeqCst) {
            NO_PID => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }
}

/// Install the SIGQUIT relay. Registered once; `SA_RESTART` keeps the
/// handler in place across deliveries and restarts interrupted waits.
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(forward_sigquit),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe { signal::sigaction(Signal::SIGQUIT, &action) }?;
    Ok(())
}

// Runs in signal context: restricted to an atomic load, write(2) and
// kill(2). With no foreground child the signal is observed and dropped.
extern "C" fn forward_sigquit(_signum: libc::c_int) {
    let raw = FOREGROUND_PID.load(Ordering::SeqCst);
    if raw != NO_PID {
        const NOTICE: &[u8] = b"Caught <control> <\\> signal\n";
        unsafe {
            libc::write(libc::STDOUT_FILENO, NOTICE.as_ptr().cast(), NOTICE.len());
        }
        let _ = signal::kill(Pid::from_raw(raw), Signal::SIGQUIT);
    }
}

#[cfg(test)]
pub(crate) fn foreground_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
}
