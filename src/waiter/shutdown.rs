//! Cross-platform OS signal handling.
//!
//! [`wait_for_shutdown_signal`] completes when the process receives a
//! termination signal, logging which one arrived. The waiter's run loop
//! selects on it next to the cancellation token so either path stops the
//! scheduler.

use tracing::info;

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners. On Unix this listens
/// for `SIGINT`, `SIGTERM` and `SIGQUIT`; elsewhere it falls back to
/// [`tokio::signal::ctrl_c`].
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let received = tokio::select! {
        _ = tokio::signal::ctrl_c() => "ctrl_c",
        _ = sigint.recv()  => "sigint",
        _ = sigterm.recv() => "sigterm",
        _ = sigquit.recv() => "sigquit",
    };
    info!(signal = received, "termination signal received");
    Ok(())
}

/// Waits for a termination signal (`Ctrl-C` on non-Unix platforms).
///
/// Returns `Ok(())` when the signal is received, or `Err` if registration
/// fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!(signal = "ctrl_c", "termination signal received");
    Ok(())
}
