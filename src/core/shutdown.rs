//! # Termination signals.
//!
//! [`wait_for_shutdown_signal`] completes on the first termination signal and
//! reports which one arrived, so the binary can log it before stopping the
//! server.
//!
//! | platform | signals                      |
//! |----------|------------------------------|
//! | Unix     | `SIGINT`, `SIGTERM`, `SIGQUIT` |
//! | other    | Ctrl-C                       |

use std::fmt;

/// A termination signal observed by [`wait_for_shutdown_signal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Ctrl-C / `SIGINT`.
    Interrupt,
    /// `SIGTERM` (service managers, `kill`).
    Terminate,
    /// `SIGQUIT`.
    Quit,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
        })
    }
}

/// Waits for a termination signal.
///
/// Each call installs its own listeners. Fails only if they cannot be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let sig = tokio::select! {
        _ = sigint.recv()  => ShutdownSignal::Interrupt,
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sigquit.recv() => ShutdownSignal::Quit,
    };
    Ok(sig)
}

/// Waits for a termination signal.
///
/// Each call installs its own listeners. Fails only if they cannot be registered.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownSignal::Interrupt)
}
