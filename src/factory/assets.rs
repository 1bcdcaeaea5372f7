//! Socket document templating.
//!
//! Each socket instance loads a self-contained HTML document into its bridge:
//! the transport library inlined as a base64 data-URI script block, followed
//! by a generated snippet that constructs one transport instance bound to the
//! target URL and wires its three lifecycle events to the registered native
//! entry points.
//!
//! # Document Shape
//!
//! ```html
//! <html><head>
//! <script src='data:application/javascript;base64,...'></script>
//! <script>
//! var sock = new SockJS("wss://example.test/echo");
//! sock.onopen = function() { callback.onOpened(); };
//! sock.onmessage = function(e) { callback.onMessage(e.data); };
//! sock.onclose = function(e) { callback.onClosed(e.code, e.reason); };
//! </script>
//! </head></html>
//! ```

// ============================================================================
// Imports
// ============================================================================

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::protocol::command::js_string_literal;

// ============================================================================
// Templates
// ============================================================================

const PAGE_START: &str = "<html><head>";

const PAGE_END: &str = "</head></html>";

/// Per-instance snippet. `$SOCK_ARGS` is the transport constructor argument
/// list; the callback object name matches [`crate::bridge::CALLBACK_OBJECT`].
const SOCKET_TEMPLATE: &str = "<script>\
var sock = new SockJS($SOCK_ARGS);\
sock.onopen = function() { callback.onOpened(); };\
sock.onmessage = function(e) { callback.onMessage(e.data); };\
sock.onclose = function(e) { callback.onClosed(e.code, e.reason); };\
</script>";

// ============================================================================
// Public Functions
// ============================================================================

/// Builds the `<script>` block inlining the transport library source.
///
/// The source is carried as a base64 data URI so the document needs no
/// network access to bootstrap the transport.
#[must_use]
pub(crate) fn library_script_tag(source: &str) -> String {
    format!(
        "<script src='data:application/javascript;base64,{}'></script>",
        BASE64.encode(source.as_bytes())
    )
}

/// Builds the complete socket document.
///
/// `options` is an optional caller-supplied JavaScript expression passed as
/// the transport constructor's second argument, verbatim. The target URL is
/// embedded as a JSON string literal so it cannot break out of the call.
#[must_use]
pub(crate) fn build_socket_document(
    library_tag: &str,
    url: &str,
    options: Option<&str>,
) -> String {
    let mut args = js_string_literal(url);
    if let Some(options) = options {
        args.push(',');
        args.push_str(options);
    }

    let snippet = SOCKET_TEMPLATE.replace("$SOCK_ARGS", &args);

    format!("{PAGE_START}{library_tag}{snippet}{PAGE_END}")
}

// ============================================================================
// Tests
// ============================================================================
