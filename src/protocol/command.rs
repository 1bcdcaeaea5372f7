//! Outbound command directives.
//!
//! Each socket instance receives its directives through a strictly-ordered,
//! single-consumer mailbox. Commands are immutable once enqueued and are
//! applied in enqueue order; the worker renders `Send` and `Close` into
//! script fragments evaluated against the loaded document.
//!
//! # Command Set
//!
//! | Command | Effect on the worker |
//! |---------|----------------------|
//! | `Initialize` | Create the bridge and load the socket document |
//! | `Send` | Evaluate `sock.send(<payload>);` (buffered until open) |
//! | `Close` | Evaluate `sock.close();` and await confirmation |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Command
// ============================================================================

/// A directive enqueued to a socket's dedicated worker.
///
/// Exactly one `Initialize` is issued per instance, before any `Send` or
/// `Close` takes effect. `Send` and `Close` may be enqueued at any time;
/// the worker decides whether they evaluate (a closed instance turns them
/// into no-ops).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Bootstrap the script environment and load the socket document.
    Initialize,

    /// Transmit an application message through the transport.
    Send {
        /// Message payload, passed through verbatim.
        payload: String,
    },

    /// Request a graceful transport close.
    Close,
}

impl Command {
    /// Returns a short label for logging.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Send { .. } => "send",
            Self::Close => "close",
        }
    }
}

// ============================================================================
// Script Rendering
// ============================================================================

/// Script fragment that requests a graceful transport close.
pub(crate) const CLOSE_SCRIPT: &str = "sock.close();";

/// Renders the script fragment transmitting `payload`.
///
/// The payload is embedded as a JSON string literal, which is also a valid
/// JavaScript string literal, so quotes, backslashes and control characters
/// in application messages cannot break out of the call.
#[must_use]
pub(crate) fn send_script(payload: &str) -> String {
    format!("sock.send({});", js_string_literal(payload))
}

/// Renders `s` as a JavaScript string literal.
#[inline]
#[must_use]
pub(crate) fn js_string_literal(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

// ============================================================================
// Tests
// ============================================================================
