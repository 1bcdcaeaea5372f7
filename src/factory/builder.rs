//! Factory configuration.
//!
//! [`FactoryBuilder`] collects the library source, the bridge provider and
//! the blocking-wait timeouts, validates them, and performs the one-time
//! library resolution when [`FactoryBuilder::build`] runs.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::bridge::BridgeProvider;
use crate::error::{Error, Result};

use super::assets::library_script_tag;
use super::core::SocketFactory;
use super::source::LibrarySource;

// ============================================================================
// Defaults
// ============================================================================

/// Default bound on the `init()` wait.
pub(crate) const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on the `close()` wait.
pub(crate) const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// FactoryBuilder
// ============================================================================

/// Builder for [`SocketFactory`].
///
/// | Setting | Default |
/// |---------|---------|
/// | Library source | [`LibrarySource::default_url`] |
/// | Bridge provider | required, no default |
/// | Init timeout | 30s |
/// | Close timeout | 30s |
pub struct FactoryBuilder {
    source: Option<LibrarySource>,
    provider: Option<Arc<dyn BridgeProvider>>,
    init_timeout: Duration,
    close_timeout: Duration,
}

impl Default for FactoryBuilder {
    fn default() -> Self {
        Self {
            source: None,
            provider: None,
            init_timeout: DEFAULT_INIT_TIMEOUT,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

impl FactoryBuilder {
    /// Creates a builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL to fetch the transport library from.
    #[must_use]
    pub fn library_url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(LibrarySource::url(url));
        self
    }

    /// Sets the transport library source directly.
    #[must_use]
    pub fn library_source(mut self, source: LibrarySource) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the bridge provider handing out script hosts.
    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn BridgeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Bounds the blocking wait inside socket creation.
    #[must_use]
    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// Bounds the blocking wait inside [`crate::Socket::close`].
    #[must_use]
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Resolves the library source and builds the factory.
    ///
    /// This is where the one-time library fetch happens for URL sources.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no provider was set or a timeout is zero
    /// - [`Error::LibraryFetch`] if a URL source cannot be fetched
    pub fn build(self) -> Result<SocketFactory> {
        let provider = self.provider.ok_or_else(|| {
            Error::config(
                "No bridge provider configured. \
                 Set one with FactoryBuilder::provider before building.",
            )
        })?;

        if self.init_timeout.is_zero() {
            return Err(Error::config("Init timeout must be non-zero"));
        }
        if self.close_timeout.is_zero() {
            return Err(Error::config("Close timeout must be non-zero"));
        }

        let source = self.source.unwrap_or_else(LibrarySource::default_url);
        let library = source.resolve()?;
        debug!(bytes = library.len(), "Transport library resolved");

        Ok(SocketFactory::from_parts(
            library_script_tag(&library),
            provider,
            self.init_timeout,
            self.close_timeout,
        ))
    }
}

impl fmt::Debug for FactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryBuilder")
            .field("source", &self.source)
            .field("provider", &self.provider.as_ref().map(|_| "..."))
            .field("init_timeout", &self.init_timeout)
            .field("close_timeout", &self.close_timeout)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
