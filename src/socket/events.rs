//! Event delivery to the caller.
//!
//! Worker-emitted events are handed to the caller's sink on a dedicated
//! delivery thread, so a slow or blocking consumer can never stall the
//! worker's state machine. Delivery order is the worker's processing order.

// ============================================================================
// Imports
// ============================================================================

use std::io;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::identifiers::SocketId;
use crate::protocol::SocketEvent;

// ============================================================================
// EventSink
// ============================================================================

/// Consumer of a socket's lifecycle and message events.
///
/// Implemented for any `FnMut(SocketEvent) + Send` closure, so a channel
/// sender or a logging hook drops in directly:
///
/// ```
/// use sockjs_bridge::{EventSink, SocketEvent};
///
/// let (tx, rx) = std::sync::mpsc::channel();
/// let mut sink = move |event: SocketEvent| {
///     let _ = tx.send(event);
/// };
/// sink.deliver(SocketEvent::Opened);
/// assert_eq!(rx.recv().unwrap(), SocketEvent::Opened);
/// ```
pub trait EventSink: Send {
    /// Receives the next event. Called from the delivery thread, one event
    /// at a time, never concurrently.
    fn deliver(&mut self, event: SocketEvent);
}

impl<F> EventSink for F
where
    F: FnMut(SocketEvent) + Send,
{
    fn deliver(&mut self, event: SocketEvent) {
        self(event);
    }
}

// ============================================================================
// Delivery Thread
// ============================================================================

/// Spawns the delivery thread draining `receiver` into `sink`.
///
/// The thread exits once the worker drops its event sender.
pub(crate) fn spawn_delivery(
    id: SocketId,
    mut sink: Box<dyn EventSink>,
    receiver: Receiver<SocketEvent>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("sockjs-events-{}", id.short()))
        .spawn(move || {
            for event in receiver.iter() {
                sink.deliver(event);
            }
            debug!(socket = %id, "Event delivery finished");
        })
}

// ============================================================================
// Tests
// ============================================================================
