//! Inbound socket event types.
//!
//! Events are notifications originating from the transport's lifecycle
//! callbacks inside the script environment, relayed through the worker to the
//! caller's event sink.
//!
//! # Delivery Guarantees
//!
//! | Event | Cardinality |
//! |-------|-------------|
//! | `Opened` | at most once |
//! | `Message` | zero or more |
//! | `Closed` | at most once, terminal |
//!
//! Events are delivered in arrival order; anything arriving after `Closed`
//! is discarded.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// SocketEvent
// ============================================================================

/// A notification delivered to the caller's event sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SocketEvent {
    /// The transport connection is established.
    Opened,

    /// An application message arrived from the transport.
    Message {
        /// Message payload.
        data: String,
    },

    /// The transport connection ended. Terminal.
    ///
    /// A normal close carries code 1000; transport-level failures are relayed
    /// with their non-normal code and reason, uninterpreted.
    Closed {
        /// Close code as reported by the transport.
        code: i32,
        /// Human-readable close reason.
        reason: String,
    },
}

impl SocketEvent {
    /// Creates a message event.
    #[inline]
    #[must_use]
    pub fn message(data: impl Into<String>) -> Self {
        Self::Message { data: data.into() }
    }

    /// Creates a closed event.
    #[inline]
    #[must_use]
    pub fn closed(code: i32, reason: impl Into<String>) -> Self {
        Self::Closed {
            code,
            reason: reason.into(),
        }
    }

    /// Returns a short label for logging.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Message { .. } => "message",
            Self::Closed { .. } => "closed",
        }
    }

    /// Returns `true` if this event ends the instance.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
