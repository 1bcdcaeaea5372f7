//! Script bridge abstraction.
//!
//! The actual network I/O happens inside an embedded script-execution host
//! (a WebView, a headless JS engine, ...) that is not part of this crate.
//! This module defines the narrow capability surface the bridge consumes:
//!
//! - [`ScriptBridge`] — load a document, evaluate script fragments in it.
//! - [`BridgeProvider`] — create one isolated bridge per socket instance.
//! - [`SocketCallbacks`] — the native handler table the host invokes when the
//!   transport's lifecycle events fire inside the document.
//!
//! # Host Contract
//!
//! `load_document` must expose the supplied [`SocketCallbacks`] to script code
//! as a global object named [`CALLBACK_OBJECT`] with methods `onOpened()`,
//! `onMessage(data)` and `onClosed(code, reason)`, before the document's
//! scripts run. The generated document (see the factory) wires the transport's
//! `onopen`/`onmessage`/`onclose` events to exactly those entry points.
//!
//! Callback invocations may arrive on any thread the host chooses; the bridge
//! serializes them against native commands internally, so host implementations
//! need no ordering discipline beyond invoking callbacks in event order.

// ============================================================================
// Submodules
// ============================================================================

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Global object name under which the host exposes [`SocketCallbacks`] to
/// script code.
pub const CALLBACK_OBJECT: &str = "callback";

// ============================================================================
// SocketCallbacks
// ============================================================================

/// Native entry points invoked by script code inside the loaded document.
///
/// Implementations must be cheap and non-blocking: they run on whatever
/// thread the script host delivers them on.
pub trait SocketCallbacks: Send + Sync {
    /// The transport connection opened.
    fn on_opened(&self);

    /// An application message arrived.
    fn on_message(&self, data: &str);

    /// The transport connection closed.
    fn on_closed(&self, code: i32, reason: &str);
}

// ============================================================================
// ScriptBridge
// ============================================================================

/// An isolated script-execution context hosting one transport instance.
///
/// A bridge is created and used exclusively on its socket's worker thread;
/// it only needs to be `Send` so it can move there. Dropping the bridge tears
/// down the document context.
pub trait ScriptBridge: Send {
    /// Loads `html` as the bridge's document, registering `callbacks` under
    /// [`CALLBACK_OBJECT`] before any document script runs.
    ///
    /// `base_url` is the document's base URL (the socket's target URL, so
    /// same-origin transport fallbacks resolve correctly).
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot create or load the document.
    fn load_document(
        &mut self,
        base_url: &str,
        html: &str,
        callbacks: Arc<dyn SocketCallbacks>,
    ) -> Result<()>;

    /// Evaluates a script fragment against the loaded document.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails; callers on the worker path log
    /// and swallow it, since the command was accepted asynchronously.
    fn evaluate(&mut self, script: &str) -> Result<()>;
}

// ============================================================================
// BridgeProvider
// ============================================================================

/// Factory for per-socket script bridges.
///
/// Each socket gets a fresh, isolated bridge: no script state is shared
/// between instances. `create_bridge` is invoked on the socket's worker
/// thread, so hosts that require thread-affine contexts can create them
/// in place.
pub trait BridgeProvider: Send + Sync {
    /// Creates a new isolated bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot allocate a script context.
    fn create_bridge(&self) -> Result<Box<dyn ScriptBridge>>;
}
