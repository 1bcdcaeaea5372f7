//! Per-socket worker thread.
//!
//! One dedicated worker per socket consumes a single mailbox carrying both
//! native commands and relayed transport events, so all state-machine
//! processing is strictly sequential. The worker exclusively owns the loaded
//! bridge/document; no other thread touches it.
//!
//! # Ordering
//!
//! Send commands arriving before the `Opened` event has been processed are
//! buffered and flushed in original order once it is — nothing evaluates
//! against a document whose transport is not yet open, and nothing is lost
//! or reordered.
//!
//! # Teardown
//!
//! The loop exits after the terminal `Closed` event is processed, after a
//! Close command on an instance that never opened, after a failed document
//! bootstrap, or when every mailbox sender is gone. On every exit path the
//! instance is marked closed so no blocked caller hangs, and the bridge is
//! dropped on this thread.

// ============================================================================
// Imports
// ============================================================================

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::bridge::{BridgeProvider, ScriptBridge};
use crate::error::Error;
use crate::identifiers::SocketId;
use crate::protocol::command::{CLOSE_SCRIPT, send_script};
use crate::protocol::{Command, SocketEvent};

use super::callbacks::CallbackRelay;
use super::state::Shared;

// ============================================================================
// WorkerMessage
// ============================================================================

/// Mailbox item: a native command or a relayed transport event.
pub(crate) enum WorkerMessage {
    /// Native-issued directive.
    Command(Command),
    /// Transport event forwarded by the callback relay.
    Inbound(SocketEvent),
}

// ============================================================================
// Worker
// ============================================================================

/// State and wiring consumed by the worker thread.
pub(crate) struct Worker {
    pub(crate) id: SocketId,
    pub(crate) target_url: String,
    pub(crate) document: String,
    pub(crate) provider: Arc<dyn BridgeProvider>,
    pub(crate) shared: Arc<Shared>,
    pub(crate) mailbox: Receiver<WorkerMessage>,
    pub(crate) events: Sender<SocketEvent>,
    pub(crate) relay: Arc<CallbackRelay>,
    /// Bound on the wait for the transport's close confirmation.
    pub(crate) close_timeout: Duration,
}

impl Worker {
    /// Spawns the worker on its own named thread.
    pub(crate) fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("sockjs-worker-{}", self.id.short()))
            .spawn(move || self.run())
    }

    fn run(self) {
        let mut bridge: Option<Box<dyn ScriptBridge>> = None;
        let mut pending: Vec<String> = Vec::new();
        let mut open = false;

        while let Ok(message) = self.mailbox.recv() {
            match message {
                WorkerMessage::Command(Command::Initialize) => {
                    if bridge.is_some() {
                        warn!(socket = %self.id, "Duplicate initialize ignored");
                        continue;
                    }
                    match self.bootstrap() {
                        Ok(loaded) => bridge = Some(loaded),
                        Err(e) => {
                            self.fail_bootstrap(&e);
                            break;
                        }
                    }
                }

                WorkerMessage::Command(Command::Send { payload }) => {
                    if self.shared.is_closed() {
                        debug!(socket = %self.id, "Send after close discarded");
                        continue;
                    }
                    if !open {
                        debug!(
                            socket = %self.id,
                            buffered = pending.len() + 1,
                            "Send buffered until transport opens"
                        );
                        pending.push(payload);
                        continue;
                    }
                    self.evaluate(&mut bridge, &send_script(&payload));
                }

                WorkerMessage::Command(Command::Close) => {
                    if self.shared.is_closed() || bridge.is_none() {
                        debug!(socket = %self.id, "Close on inactive instance, tearing down");
                        break;
                    }
                    self.evaluate(&mut bridge, CLOSE_SCRIPT);
                    self.await_close_confirmation(&mut bridge);
                    break;
                }

                WorkerMessage::Inbound(SocketEvent::Opened) => {
                    open = true;
                    self.emit(SocketEvent::Opened);
                    if !pending.is_empty() {
                        debug!(
                            socket = %self.id,
                            flushed = pending.len(),
                            "Flushing buffered sends"
                        );
                        for payload in pending.drain(..) {
                            self.evaluate(&mut bridge, &send_script(&payload));
                        }
                    }
                }

                WorkerMessage::Inbound(event @ SocketEvent::Message { .. }) => {
                    self.emit(event);
                }

                WorkerMessage::Inbound(event @ SocketEvent::Closed { .. }) => {
                    self.emit(event);
                    break;
                }
            }
        }

        // Bridge (and its document context) dies on this thread; any caller
        // still blocked in init()/close() must wake.
        drop(bridge);
        self.shared.try_mark_closed();
        debug!(socket = %self.id, "Worker terminated");
    }

    /// Creates the bridge and loads the socket document.
    fn bootstrap(&self) -> crate::error::Result<Box<dyn ScriptBridge>> {
        let mut bridge = self.provider.create_bridge()?;
        let callbacks: Arc<dyn crate::bridge::SocketCallbacks> = Arc::clone(&self.relay) as _;
        bridge.load_document(&self.target_url, &self.document, callbacks)?;
        debug!(socket = %self.id, url = %self.target_url, "Socket document loaded");
        Ok(bridge)
    }

    /// Surfaces a failed bootstrap as a terminal abnormal closure.
    fn fail_bootstrap(&self, error: &Error) {
        warn!(socket = %self.id, error = %error, "Document bootstrap failed");
        if self.shared.try_mark_closed() {
            self.emit(SocketEvent::closed(
                1006,
                format!("Document load failed: {error}"),
            ));
        }
    }

    /// Evaluates a script fragment, logging failures instead of propagating
    /// them — the command was accepted asynchronously.
    fn evaluate(&self, bridge: &mut Option<Box<dyn ScriptBridge>>, script: &str) {
        match bridge {
            Some(bridge) => {
                if let Err(e) = bridge.evaluate(script) {
                    warn!(socket = %self.id, error = %e, "Script evaluation failed");
                }
            }
            None => debug!(socket = %self.id, "Evaluation skipped, no document loaded"),
        }
    }

    /// Drains the mailbox until the transport confirms closure, still
    /// best-effort evaluating sends and forwarding messages, bounded by
    /// the close timeout.
    fn await_close_confirmation(&self, bridge: &mut Option<Box<dyn ScriptBridge>>) {
        let deadline = Instant::now() + self.close_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(socket = %self.id, "Transport never confirmed close");
                return;
            }
            match self.mailbox.recv_timeout(remaining) {
                Ok(WorkerMessage::Inbound(event @ SocketEvent::Closed { .. })) => {
                    self.emit(event);
                    return;
                }
                Ok(WorkerMessage::Inbound(event @ SocketEvent::Message { .. })) => {
                    self.emit(event);
                }
                Ok(WorkerMessage::Command(Command::Send { payload })) => {
                    self.evaluate(bridge, &send_script(&payload));
                }
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {
                    warn!(socket = %self.id, "Transport never confirmed close");
                    return;
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    fn emit(&self, event: SocketEvent) {
        if self.events.send(event).is_err() {
            debug!(socket = %self.id, "Event delivery gone, event dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
