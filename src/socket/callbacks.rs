//! Inbound callback relay.
//!
//! The script host invokes [`crate::bridge::SocketCallbacks`] on whatever
//! thread it likes. The relay applies the arrival-time rules under the
//! instance lock — duplicate `Opened` and anything after `Closed` is
//! discarded here, and the lifecycle flags are flipped so blocked `init()` /
//! `close()` callers wake immediately — then forwards surviving events into
//! the worker mailbox, where they are processed in order relative to native
//! commands.

// ============================================================================
// Imports
// ============================================================================

use std::sync::mpsc::Sender;
use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use crate::bridge::SocketCallbacks;
use crate::identifiers::SocketId;
use crate::protocol::SocketEvent;

use super::state::Shared;
use super::worker::WorkerMessage;

// ============================================================================
// CallbackRelay
// ============================================================================

/// Bridges host-invoked callbacks into the worker mailbox.
///
/// Holds the mailbox sender weakly: the worker itself owns the relay (via
/// the bridge's callback table), so a strong sender here would keep the
/// worker's own mailbox open forever. The strong sender lives in the socket
/// handle; once every handle is gone the channel disconnects and the worker
/// can wind down.
pub(crate) struct CallbackRelay {
    id: SocketId,
    shared: Arc<Shared>,
    mailbox: Weak<Sender<WorkerMessage>>,
}

impl CallbackRelay {
    pub(crate) fn new(
        id: SocketId,
        shared: Arc<Shared>,
        mailbox: Weak<Sender<WorkerMessage>>,
    ) -> Self {
        Self {
            id,
            shared,
            mailbox,
        }
    }

    fn forward(&self, event: SocketEvent) {
        trace!(socket = %self.id, event = event.label(), "Relaying inbound event");
        let delivered = self
            .mailbox
            .upgrade()
            .is_some_and(|tx| tx.send(WorkerMessage::Inbound(event)).is_ok());
        if !delivered {
            debug!(socket = %self.id, "Worker gone, inbound event dropped");
        }
    }
}

impl SocketCallbacks for CallbackRelay {
    fn on_opened(&self) {
        if !self.shared.try_mark_opened() {
            debug!(socket = %self.id, "Duplicate or post-close open ignored");
            return;
        }
        self.forward(SocketEvent::Opened);
    }

    fn on_message(&self, data: &str) {
        if !self.shared.accepts_messages() {
            debug!(socket = %self.id, "Message outside open window discarded");
            return;
        }
        self.forward(SocketEvent::message(data));
    }

    fn on_closed(&self, code: i32, reason: &str) {
        if !self.shared.try_mark_closed() {
            debug!(socket = %self.id, code, "Duplicate close ignored");
            return;
        }
        debug!(socket = %self.id, code, reason, "Transport closed");
        self.forward(SocketEvent::closed(code, reason));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;

    struct Rig {
        relay: CallbackRelay,
        rx: mpsc::Receiver<WorkerMessage>,
        shared: Arc<Shared>,
        // Keeps the weak mailbox alive for the duration of the test.
        _mailbox: Arc<Sender<WorkerMessage>>,
    }

    fn rig() -> Rig {
        let shared = Arc::new(Shared::new());
        let (tx, rx) = mpsc::channel();
        let mailbox = Arc::new(tx);
        let relay = CallbackRelay::new(
            SocketId::generate(),
            Arc::clone(&shared),
            Arc::downgrade(&mailbox),
        );
        Rig {
            relay,
            rx,
            shared,
            _mailbox: mailbox,
        }
    }

    #[test]
    fn test_opened_forwarded_once() {
        let rig = rig();

        rig.relay.on_opened();
        rig.relay.on_opened();

        assert!(matches!(
            rig.rx.try_recv(),
            Ok(WorkerMessage::Inbound(SocketEvent::Opened))
        ));
        assert!(rig.rx.try_recv().is_err());
        assert!(rig.shared.is_open());
    }

    #[test]
    fn test_pre_open_message_discarded() {
        let rig = rig();

        rig.relay.on_message("early");
        assert!(rig.rx.try_recv().is_err());
    }

    #[test]
    fn test_message_after_close_discarded() {
        let rig = rig();

        rig.relay.on_opened();
        rig.relay.on_closed(1000, "done");
        rig.relay.on_message("late");
        rig.relay.on_closed(1000, "again");

        assert!(matches!(
            rig.rx.try_recv(),
            Ok(WorkerMessage::Inbound(SocketEvent::Opened))
        ));
        assert!(matches!(
            rig.rx.try_recv(),
            Ok(WorkerMessage::Inbound(SocketEvent::Closed { code: 1000, .. }))
        ));
        assert!(rig.rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_before_opened_rejects_open() {
        let rig = rig();

        rig.relay.on_closed(1006, "refused");
        rig.relay.on_opened();

        assert!(matches!(
            rig.rx.try_recv(),
            Ok(WorkerMessage::Inbound(SocketEvent::Closed { code: 1006, .. }))
        ));
        assert!(rig.rx.try_recv().is_err());
        assert!(!rig.shared.is_open());
        assert!(rig.shared.is_closed());
    }

    #[test]
    fn test_forward_without_worker_is_silent() {
        let shared = Arc::new(Shared::new());
        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        let mailbox = Arc::new(tx);
        let relay = CallbackRelay::new(
            SocketId::generate(),
            Arc::clone(&shared),
            Arc::downgrade(&mailbox),
        );
        drop(mailbox);
        drop(rx);

        // Must not panic; the event is dropped but state still transitions.
        relay.on_opened();
        assert!(shared.is_open());
    }
}
