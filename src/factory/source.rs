//! Transport library source resolution.
//!
//! The factory needs the transport library's JavaScript source at
//! construction time so every socket document is self-contained (no network
//! dependency at document-load time). The source either comes from a URL,
//! fetched once when the factory is built, or is supplied inline for
//! embedding and tests.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default transport library location.
pub const DEFAULT_LIBRARY_URL: &str = "https://cdn.jsdelivr.net/sockjs/1/sockjs.min.js";

/// Timeout for the construction-time library fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// LibrarySource
// ============================================================================

/// Where the transport library's JavaScript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// Fetch the library from a URL at factory construction time.
    Url(String),
    /// Use the given JavaScript source directly.
    Inline(String),
}

impl LibrarySource {
    /// Creates a URL source.
    #[inline]
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Creates an inline source.
    #[inline]
    #[must_use]
    pub fn inline(source: impl Into<String>) -> Self {
        Self::Inline(source.into())
    }

    /// The default source: [`DEFAULT_LIBRARY_URL`].
    #[inline]
    #[must_use]
    pub fn default_url() -> Self {
        Self::Url(DEFAULT_LIBRARY_URL.to_string())
    }

    /// Resolves the source to JavaScript text.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL does not parse
    /// - [`Error::LibraryFetch`] if the fetch fails or returns a non-success
    ///   status
    pub(crate) fn resolve(&self) -> Result<String> {
        match self {
            Self::Inline(source) => Ok(source.clone()),
            Self::Url(url) => fetch_library(url),
        }
    }
}

// ============================================================================
// Fetch
// ============================================================================

/// Fetches the library source over HTTP, blocking.
fn fetch_library(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| Error::config(format!("Invalid library URL {url}: {e}")))?;

    debug!(url = %parsed, "Fetching transport library");

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| Error::library_fetch(url, e.to_string()))?;

    let response = client
        .get(parsed)
        .send()
        .map_err(|e| Error::library_fetch(url, e.to_string()))?
        .error_for_status()
        .map_err(|e| Error::library_fetch(url, e.to_string()))?;

    let source = response
        .text()
        .map_err(|e| Error::library_fetch(url, e.to_string()))?;

    debug!(url, bytes = source.len(), "Transport library fetched");

    Ok(source)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_resolves_verbatim() {
        let source = LibrarySource::inline("var SockJS = function() {};");
        assert_eq!(
            source.resolve().expect("resolve"),
            "var SockJS = function() {};"
        );
    }

    #[test]
    fn test_default_url() {
        assert_eq!(
            LibrarySource::default_url(),
            LibrarySource::Url(DEFAULT_LIBRARY_URL.to_string())
        );
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let source = LibrarySource::url("not a url");
        let err = source.resolve().expect_err("must fail");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_unreachable_url_is_fetch_error() {
        // Port 1 on loopback refuses immediately.
        let source = LibrarySource::url("http://127.0.0.1:1/sockjs.min.js");
        let err = source.resolve().expect_err("must fail");
        assert!(matches!(err, Error::LibraryFetch { .. }));
        assert!(err.is_recoverable());
    }
}
