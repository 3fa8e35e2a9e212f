//! The session event loop.
//!
//! One task owns the [`Session`] and multiplexes three sources: a periodic
//! polling tick, parsed commands from the terminal, and a stop signal.
//! Everything the loop wants shown to the operator goes out through an
//! unbounded output channel; the binary prints it, tests read it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::command::Command;
use crate::session::{CommandOutcome, Session, SessionError};

/// Handle for feeding a running [`SessionDriver`] from other tasks.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    command_tx: mpsc::Sender<Command>,
    stop_tx: mpsc::Sender<()>,
}

impl DriverHandle {
    /// Forward one parsed command to the loop. Returns `false` if the loop
    /// has already exited.
    pub async fn send_command(&self, command: Command) -> bool {
        self.command_tx.send(command).await.is_ok()
    }

    /// Ask the loop to shut down. Returns `false` if it already has.
    pub async fn stop(&self) -> bool {
        self.stop_tx.send(()).await.is_ok()
    }
}

/// The event loop around one [`Session`].
pub struct SessionDriver<B: Backend> {
    session: Session<B>,
    poll_interval: Duration,
    command_rx: mpsc::Receiver<Command>,
    stop_rx: mpsc::Receiver<()>,
    output_tx: mpsc::UnboundedSender<String>,
}

impl<B: Backend> SessionDriver<B> {
    /// Wrap a session in a driver. Returns the driver, the handle used to
    /// feed it, and the receiving end of the output stream.
    pub fn new(
        session: Session<B>,
        poll_interval: Duration,
    ) -> (Self, DriverHandle, mpsc::UnboundedReceiver<String>) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let driver = Self {
            session,
            poll_interval,
            command_rx,
            stop_rx,
            output_tx,
        };
        let handle = DriverHandle {
            command_tx,
            stop_tx,
        };
        (driver, handle, output_rx)
    }

    /// Run the loop until quit, stop, or a fatal error.
    ///
    /// Backend errors during polling are logged and retried on the next
    /// tick; a missing-baseline error means the session can never sync and
    /// aborts the loop. The session is handed back on clean shutdown.
    pub async fn run(mut self) -> Result<Session<B>, SessionError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.session.poll().await {
                        Ok(lines) => {
                            for line in lines {
                                self.emit(line);
                            }
                        }
                        Err(error @ SessionError::Baseline(_)) => {
                            return Err(error);
                        }
                        Err(error) => {
                            warn!(%error, "poll failed, retrying on next tick");
                        }
                    }
                }
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        debug!("command channel closed, shutting down");
                        break;
                    };
                    match self.session.dispatch(&command).await {
                        Ok(CommandOutcome::Output(text)) => self.emit(text),
                        Ok(CommandOutcome::Lines(lines)) => {
                            for line in lines {
                                self.emit(line);
                            }
                        }
                        Ok(CommandOutcome::Quit) => break,
                        Err(error) => self.emit(error.to_string()),
                    }
                }
                _ = self.stop_rx.recv() => {
                    debug!("stop requested");
                    if self.session.is_connected() {
                        if let Err(error) = self.session.disconnect().await {
                            warn!(%error, "disconnect on stop failed");
                        }
                    }
                    break;
                }
            }
        }

        Ok(self.session)
    }

    fn emit(&self, line: String) {
        // The receiver may be gone during shutdown; output is best-effort.
        let _ = self.output_tx.send(line);
    }
}
