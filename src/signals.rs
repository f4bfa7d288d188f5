//! Interrupt handling around foreground commands.
//!
//! The shell is in one of two dispositions:
//!
//! - [`Disposition::Idle`]: the shell owns the terminal. An interrupt (Ctrl-C)
//!   never kills it; the loop notices it and starts over at a fresh prompt.
//! - [`Disposition::Foreground`]: an external program is running. The shell
//!   ignores interrupts, and on Unix terminal stop requests (Ctrl-Z) are
//!   ignored by both the shell and the program.
//!
//! SIGINT is always caught by a flag handler rather than ignored. A caught
//! signal reverts to its default action across `exec`, so a spawned program
//! still gets ordinary Ctrl-C behaviour. SIGTSTP is the opposite: it is set to
//! `SIG_IGN` for the foreground period, which the program inherits. There is
//! no job control, so a stopped program could never be resumed.

use signal_hook::SigId;
use signal_hook::consts::SIGINT;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Idle,
    Foreground,
}

pub struct SignalPolicy {
    state: Disposition,
    interrupted: Arc<AtomicBool>,
    handlers: Vec<SigId>,
    // SIGTSTP action to put back when leaving `Foreground`.
    #[cfg(unix)]
    saved_stop: Option<libc::sigaction>,
}

impl SignalPolicy {
    /// Registers the process signal handlers and starts out `Idle`.
    pub fn install() -> io::Result<Self> {
        let interrupted = Arc::new(AtomicBool::new(false));
        let handlers = vec![signal_hook::flag::register(SIGINT, Arc::clone(&interrupted))?];

        Ok(Self {
            state: Disposition::Idle,
            interrupted,
            handlers,
            #[cfg(unix)]
            saved_stop: None,
        })
    }

    pub fn disposition(&self) -> Disposition {
        self.state
    }

    /// Moves to `Idle`. Returns `true` if an interrupt arrived while the shell
    /// itself was busy since the last reset; interrupts aimed at a foreground
    /// program are discarded.
    pub fn reset(&mut self) -> bool {
        let previous = self.state;
        self.state = Disposition::Idle;
        self.restore_stop();

        let pending = self.interrupted.swap(false, Ordering::SeqCst);
        if previous != Disposition::Idle {
            debug!(from = ?previous, "signal disposition reset to idle");
        }
        pending && previous == Disposition::Idle
    }

    /// Moves to `Foreground`, right before an external program is spawned.
    pub fn enter_foreground(&mut self) -> io::Result<()> {
        self.suppress_stop()?;
        self.interrupted.store(false, Ordering::SeqCst);
        self.state = Disposition::Foreground;
        debug!("signal disposition set to foreground");
        Ok(())
    }

    #[cfg(unix)]
    fn suppress_stop(&mut self) -> io::Result<()> {
        if self.saved_stop.is_none() {
            self.saved_stop = Some(ignore_stop()?);
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn suppress_stop(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn restore_stop(&mut self) {
        if let Some(previous) = self.saved_stop.take() {
            if let Err(err) = set_stop_action(&previous) {
                warn!(error = %err, "failed to restore SIGTSTP action");
            }
        }
    }

    #[cfg(not(unix))]
    fn restore_stop(&mut self) {}
}

impl Drop for SignalPolicy {
    fn drop(&mut self) {
        self.restore_stop();
        for id in self.handlers.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}

/// Sets SIGTSTP to `SIG_IGN` and returns the action it replaced.
#[cfg(unix)]
fn ignore_stop() -> io::Result<libc::sigaction> {
    // SAFETY: an all-zero `sigaction` is a valid value, and `sigaction` only
    // reads `ignore` and writes `previous`.
    unsafe {
        let mut ignore: libc::sigaction = std::mem::zeroed();
        ignore.sa_sigaction = libc::SIG_IGN;
        libc::sigemptyset(&mut ignore.sa_mask);
        let mut previous: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(libc::SIGTSTP, &ignore, &mut previous) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(previous)
    }
}

#[cfg(unix)]
fn set_stop_action(action: &libc::sigaction) -> io::Result<()> {
    // SAFETY: `action` was filled in by a previous `sigaction` call.
    let rc = unsafe { libc::sigaction(libc::SIGTSTP, action, std::ptr::null_mut()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_signals;

    #[cfg(unix)]
    fn current_stop_handler() -> libc::sighandler_t {
        // SAFETY: a null new action only queries the current one.
        unsafe {
            let mut current: libc::sigaction = std::mem::zeroed();
            assert_eq!(libc::sigaction(libc::SIGTSTP, std::ptr::null(), &mut current), 0);
            current.sa_sigaction
        }
    }

    #[test]
    fn starts_idle_and_toggles() {
        let _lock = lock_signals();
        let mut policy = SignalPolicy::install().unwrap();
        assert_eq!(policy.disposition(), Disposition::Idle);

        policy.enter_foreground().unwrap();
        assert_eq!(policy.disposition(), Disposition::Foreground);

        assert!(!policy.reset());
        assert_eq!(policy.disposition(), Disposition::Idle);
    }

    #[test]
    #[cfg(unix)]
    fn interrupt_while_idle_is_reported_not_fatal() {
        let _lock = lock_signals();
        let mut policy = SignalPolicy::install().unwrap();

        signal_hook::low_level::raise(SIGINT).unwrap();

        // Still alive, and the loop is told to start over.
        assert!(policy.reset());
        assert!(!policy.reset());
    }

    #[test]
    #[cfg(unix)]
    fn interrupt_in_foreground_does_not_reach_the_shell() {
        let _lock = lock_signals();
        let mut policy = SignalPolicy::install().unwrap();

        policy.enter_foreground().unwrap();
        signal_hook::low_level::raise(SIGINT).unwrap();

        assert!(!policy.reset());
        assert_eq!(policy.disposition(), Disposition::Idle);
    }

    #[test]
    #[cfg(unix)]
    fn stop_request_in_foreground_is_ignored() {
        use signal_hook::consts::SIGTSTP;

        let _lock = lock_signals();
        let before = current_stop_handler();
        let mut policy = SignalPolicy::install().unwrap();

        policy.enter_foreground().unwrap();
        assert_eq!(current_stop_handler(), libc::SIG_IGN);
        // Would stop the test process if it were not ignored.
        signal_hook::low_level::raise(SIGTSTP).unwrap();

        policy.reset();
        assert_eq!(current_stop_handler(), before);
    }

    #[test]
    #[cfg(unix)]
    fn repeated_foreground_keeps_the_idle_action() {
        let _lock = lock_signals();
        let before = current_stop_handler();
        let mut policy = SignalPolicy::install().unwrap();

        policy.enter_foreground().unwrap();
        policy.enter_foreground().unwrap();
        policy.reset();

        assert_eq!(current_stop_handler(), before);
    }

    #[test]
    #[cfg(unix)]
    fn dropping_in_foreground_restores_the_stop_action() {
        let _lock = lock_signals();
        let before = current_stop_handler();

        let mut policy = SignalPolicy::install().unwrap();
        policy.enter_foreground().unwrap();
        drop(policy);

        assert_eq!(current_stop_handler(), before);
    }
}
