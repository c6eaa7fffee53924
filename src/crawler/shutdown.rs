//! Termination signal forwarding
//!
//! SIGINT and SIGTERM (Ctrl-C only on non-Unix targets) are turned into
//! [`StopSignal`] messages on a channel. The engine decides what a signal
//! means based on its own lifecycle state: a save-then-stop while running, an
//! immediate exit otherwise.

use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A termination request delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Installs the process signal handlers and returns the receiving end
///
/// Must be called from within a tokio runtime. Handlers are installed before
/// this returns, so no signal delivered afterwards falls through to the
/// default (process-killing) disposition.
#[cfg(unix)]
pub fn listen_for_signals() -> std::io::Result<UnboundedReceiver<StopSignal>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => StopSignal::Interrupt,
                Some(()) = terminate.recv() => StopSignal::Terminate,
                else => break,
            };

            if !forward(&tx, received) {
                break;
            }
        }
    });

    Ok(rx)
}

#[cfg(not(unix))]
pub fn listen_for_signals() -> std::io::Result<UnboundedReceiver<StopSignal>> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !forward(&tx, StopSignal::Interrupt) {
                break;
            }
        }
    });

    Ok(rx)
}

fn forward(tx: &UnboundedSender<StopSignal>, signal: StopSignal) -> bool {
    tracing::debug!("Received {}", signal);
    tx.send(signal).is_ok()
}

/// Waits for the next stop signal
///
/// Resolves to `None` when there is no receiver or every sender is gone, so a
/// `tokio::select!` branch matching `Some(_)` is simply disabled.
pub(crate) async fn next_stop_signal(
    rx: &mut Option<UnboundedReceiver<StopSignal>>,
) -> Option<StopSignal> {
    match rx {
        Some(rx) => rx.recv().await,
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(StopSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(StopSignal::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn test_next_stop_signal_without_receiver() {
        let mut rx = None;
        assert_eq!(next_stop_signal(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_next_stop_signal_delivers_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut rx = Some(rx);

        tx.send(StopSignal::Terminate).unwrap();
        tx.send(StopSignal::Interrupt).unwrap();
        drop(tx);

        assert_eq!(next_stop_signal(&mut rx).await, Some(StopSignal::Terminate));
        assert_eq!(next_stop_signal(&mut rx).await, Some(StopSignal::Interrupt));
        assert_eq!(next_stop_signal(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_listen_for_signals_installs_handlers() {
        assert!(listen_for_signals().is_ok());
    }
}
