//! Cross-boundary message types.
//!
//! The bridge speaks two directions:
//!
//! - [`Command`] — native-issued directives carried by a socket's worker
//!   mailbox and rendered into script fragments.
//! - [`SocketEvent`] — transport-originated notifications relayed to the
//!   caller's event sink.

// ============================================================================
// Submodules
// ============================================================================

/// Outbound command directives and their script rendering.
pub mod command;

/// Inbound socket event types.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::Command;
pub use event::SocketEvent;
