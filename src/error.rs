//! Error types for the SockJS bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use sockjs_bridge::{Result, SocketFactory};
//!
//! fn example(factory: &SocketFactory) -> Result<()> {
//!     let socket = factory.create_socket("https://example.test/echo", sink)?;
//!     socket.send("ping");
//!     socket.close()?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Construction | [`Error::LibraryFetch`], [`Error::Config`] |
//! | Blocking waits | [`Error::InitTimeout`], [`Error::CloseTimeout`] |
//! | Bridge | [`Error::Bridge`] |
//! | External | [`Error::Io`] |
//!
//! Transport-level failures are never surfaced as errors: they arrive as a
//! terminal `Closed` event with a non-normal code, per the bridge contract.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// Transport library fetch failed.
    ///
    /// Returned when the factory cannot obtain the transport library bytes
    /// at construction time. No socket or worker thread is created.
    #[error("Failed to fetch transport library from {url}: {message}")]
    LibraryFetch {
        /// Library URL that could not be fetched.
        url: String,
        /// Description of the fetch failure.
        message: String,
    },

    /// Configuration error.
    ///
    /// Returned when factory configuration or a target URL is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Blocking Wait Errors
    // ========================================================================
    /// Initialization handshake timed out.
    ///
    /// Returned when neither `Opened` nor `Closed` is observed within the
    /// configured init timeout. The instance is torn down before this is
    /// surfaced.
    #[error("Socket initialization timed out after {timeout_ms}ms")]
    InitTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Graceful close timed out.
    ///
    /// Returned when the transport does not confirm closure within the
    /// configured close timeout. The instance is marked closed regardless.
    #[error("Socket close timed out after {timeout_ms}ms")]
    CloseTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Bridge Errors
    // ========================================================================
    /// Script bridge failure.
    ///
    /// Returned when the script host cannot load a document or evaluate a
    /// fragment on a path where the failure must propagate. Worker-side
    /// evaluation failures are logged, never propagated.
    #[error("Script bridge error: {message}")]
    Bridge {
        /// Description of the bridge failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a library fetch error.
    #[inline]
    pub fn library_fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LibraryFetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an init timeout error.
    #[inline]
    pub fn init_timeout(timeout_ms: u64) -> Self {
        Self::InitTimeout { timeout_ms }
    }

    /// Creates a close timeout error.
    #[inline]
    pub fn close_timeout(timeout_ms: u64) -> Self {
        Self::CloseTimeout { timeout_ms }
    }

    /// Creates a script bridge error.
    #[inline]
    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::InitTimeout { .. } | Self::CloseTimeout { .. })
    }

    /// Returns `true` if this is a construction-time error.
    #[inline]
    #[must_use]
    pub fn is_construction_error(&self) -> bool {
        matches!(self, Self::LibraryFetch { .. } | Self::Config { .. })
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry. An interrupted blocking wait
    /// leaves the instance in a defined state: `close()` has already marked
    /// it closed, and a timed-out `init()` has already been torn down.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InitTimeout { .. } | Self::CloseTimeout { .. } | Self::LibraryFetch { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
