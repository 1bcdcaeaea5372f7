//! SockJS bridge - Native socket handles over a script-hosted transport.
//!
//! This library exposes ordinary blocking socket objects whose transport is
//! the SockJS JavaScript library running inside an embedded script host
//! (a WebView or any other engine that can load a document and call back
//! into native code).
//!
//! # Architecture
//!
//! Each socket is one self-contained HTML document loaded into its own
//! script host:
//!
//! - **Native side (Rust)**: [`Socket`] handles enqueue commands; two
//!   threads per socket serialize processing and deliver events
//! - **Script side (JS)**: the transport library, inlined as a base64 data
//!   URI, plus a generated snippet wiring its events to the registered
//!   callback object
//!
//! Key design principles:
//!
//! - One worker thread per socket owns the document; all command and event
//!   processing is strictly sequential
//! - Sends issued before the transport opens are buffered and flushed in
//!   order; sends after closure are discarded
//! - Every blocking wait is timeout-bounded; a stuck transport can never
//!   hang a caller forever
//! - The script host is abstracted behind [`ScriptBridge`], so the library
//!   is testable without any embedded engine
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sockjs_bridge::{BridgeProvider, Result, ScriptBridge, SocketEvent, SocketFactory};
//!
//! # struct WebViewProvider;
//! # impl BridgeProvider for WebViewProvider {
//! #     fn create_bridge(&self) -> Result<Box<dyn ScriptBridge>> {
//! #         unimplemented!("platform script host")
//! #     }
//! # }
//! fn main() -> Result<()> {
//!     // The provider hands out platform script hosts (e.g. WebViews).
//!     let factory = SocketFactory::new(Arc::new(WebViewProvider))?;
//!
//!     // Blocks until the transport opens (or is refused).
//!     let socket = factory.create_socket("https://example.test/echo", |event: SocketEvent| {
//!         println!("event: {event:?}");
//!     })?;
//!
//!     socket.send("ping");
//!     socket.close()?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Script host abstraction: [`ScriptBridge`], [`BridgeProvider`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`factory`] | [`SocketFactory`], library resolution, document templating |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Command and event types crossing the boundary |
//! | [`socket`] | [`Socket`] handles and per-socket threading |

// ============================================================================
// Modules
// ============================================================================

/// Script host abstraction.
///
/// Implement [`BridgeProvider`] and [`ScriptBridge`] for the platform's
/// embedded engine; the rest of the crate is host-agnostic.
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Socket factory and transport library handling.
///
/// Use [`SocketFactory::builder()`] for custom configuration.
pub mod factory;

/// Type-safe identifiers for socket instances.
pub mod identifiers;

/// Messages crossing the native/script boundary.
pub mod protocol;

/// Socket handles and per-socket machinery.
pub mod socket;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{BridgeProvider, CALLBACK_OBJECT, ScriptBridge, SocketCallbacks};

// Error types
pub use error::{Error, Result};

// Factory types
pub use factory::{DEFAULT_LIBRARY_URL, FactoryBuilder, LibrarySource, SocketFactory};

// Identifier types
pub use identifiers::SocketId;

// Protocol types
pub use protocol::{Command, SocketEvent};

// Socket types
pub use socket::{EventSink, Lifecycle, Socket};
