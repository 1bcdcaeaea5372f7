//! Socket instances.
//!
//! A [`Socket`] is a cheap cloneable handle over one transport instance
//! hosted in its own script document. Each instance owns two threads: a
//! worker that serializes all command and event processing against the
//! document, and a delivery thread that hands events to the caller's sink.
//!
//! # Threading
//!
//! | Thread | Role |
//! |--------|------|
//! | `sockjs-worker-*` | Owns the bridge, processes commands and events in order |
//! | `sockjs-events-*` | Drains worker-emitted events into the caller's sink |
//!
//! Handle methods never touch the bridge directly; they enqueue commands
//! into the worker mailbox and, for the blocking calls, wait on the shared
//! lifecycle flags.

// ============================================================================
// Modules
// ============================================================================

mod callbacks;
mod events;
mod state;
mod worker;

pub(crate) use callbacks::CallbackRelay;
pub(crate) use events::spawn_delivery;
pub(crate) use state::Shared;
pub(crate) use worker::{Worker, WorkerMessage};

pub use events::EventSink;
pub use state::Lifecycle;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::SocketId;
use crate::protocol::Command;

use state::{CloseDecision, InitWait};

// ============================================================================
// Socket
// ============================================================================

/// Handle to one live socket instance.
///
/// Clones share the same underlying instance. Dropping every handle does not
/// close the transport; call [`Socket::close`] for a graceful shutdown.
#[derive(Clone)]
pub struct Socket {
    inner: Arc<SocketInner>,
}

struct SocketInner {
    id: SocketId,
    url: String,
    mailbox: Arc<Sender<WorkerMessage>>,
    shared: Arc<Shared>,
    init_timeout: Duration,
    close_timeout: Duration,
}

impl Socket {
    pub(crate) fn new(
        id: SocketId,
        url: String,
        mailbox: Arc<Sender<WorkerMessage>>,
        shared: Arc<Shared>,
        init_timeout: Duration,
        close_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SocketInner {
                id,
                url,
                mailbox,
                shared,
                init_timeout,
                close_timeout,
            }),
        }
    }

    /// This instance's identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SocketId {
        self.inner.id
    }

    /// The target URL this instance connects to.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Returns `true` while the transport connection is established.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.shared.is_open()
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.inner.shared.lifecycle()
    }

    /// Enqueues a message for transmission and returns immediately.
    ///
    /// Never fails: sends issued before the transport opens are buffered and
    /// flushed in order once it does, and sends issued after closure are
    /// discarded. Returns `&Self` so calls chain.
    pub fn send(&self, message: impl Into<String>) -> &Self {
        let payload = message.into();
        let enqueued = self
            .inner
            .mailbox
            .send(WorkerMessage::Command(Command::Send { payload }))
            .is_ok();
        if !enqueued {
            debug!(socket = %self.inner.id, "Worker gone, send discarded");
        }
        self
    }

    /// Closes the instance gracefully, blocking until the transport confirms
    /// closure or the close timeout passes.
    ///
    /// Safe to call from multiple threads and repeatedly: exactly one close
    /// command reaches the transport, every caller blocks until closure, and
    /// closing an already-closed instance returns immediately. An instance
    /// that never opened is marked closed without a transport round trip and
    /// its sink receives no `Closed` event.
    ///
    /// # Errors
    ///
    /// [`Error::CloseTimeout`] if confirmation does not arrive in time. The
    /// instance is marked closed regardless.
    pub fn close(&self) -> Result<()> {
        match self.inner.shared.begin_close() {
            CloseDecision::AlreadyClosed => Ok(()),
            CloseDecision::ClosedBeforeOpen => {
                debug!(socket = %self.inner.id, "Closed before open, no transport round trip");
                // Wake the worker so it tears the document down.
                let _ = self.inner.mailbox.send(WorkerMessage::Command(Command::Close));
                Ok(())
            }
            CloseDecision::RequestClose => {
                debug!(socket = %self.inner.id, "Requesting transport close");
                if self
                    .inner
                    .mailbox
                    .send(WorkerMessage::Command(Command::Close))
                    .is_err()
                {
                    // Worker already terminated; the instance is dead.
                    self.inner.shared.try_mark_closed();
                    return Ok(());
                }
                self.await_closed()
            }
            CloseDecision::AwaitClose => self.await_closed(),
        }
    }

    fn await_closed(&self) -> Result<()> {
        if self.inner.shared.wait_closed(self.inner.close_timeout) {
            return Ok(());
        }
        // Give up on the transport; the instance is closed from here on.
        self.inner.shared.try_mark_closed();
        Err(Error::close_timeout(
            self.inner.close_timeout.as_millis() as u64
        ))
    }

    /// Issues the Initialize command and blocks until the transport either
    /// opens or closes, or the init timeout passes.
    ///
    /// A transport that is refused (closes without opening) completes the
    /// wait normally; the refusal reaches the sink as a `Closed` event.
    pub(crate) fn init(&self) -> Result<()> {
        self.inner.shared.mark_initializing();
        self.inner
            .mailbox
            .send(WorkerMessage::Command(Command::Initialize))
            .map_err(|_| Error::bridge("worker unavailable"))?;

        match self.inner.shared.wait_init(self.inner.init_timeout) {
            InitWait::Completed => Ok(()),
            InitWait::TimedOut => {
                self.abort();
                Err(Error::init_timeout(
                    self.inner.init_timeout.as_millis() as u64
                ))
            }
        }
    }

    /// Marks the instance closed and nudges the worker to tear down.
    pub(crate) fn abort(&self) {
        self.inner.shared.try_mark_closed();
        let _ = self.inner.mailbox.send(WorkerMessage::Command(Command::Close));
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("id", &self.inner.id)
            .field("url", &self.inner.url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
