//! Scripted mock transport for tests.
//!
//! [`MockTransport`] plays the role of the script host plus the transport
//! library: it records every loaded document and evaluated script, and can
//! fire the three lifecycle callbacks either automatically (open-on-load,
//! echo, close confirmation) or manually from the test thread.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

use super::{BridgeProvider, ScriptBridge, SocketCallbacks};

// ============================================================================
// MockTransport
// ============================================================================

/// Remote control for a mock script host.
///
/// Intended for one socket per transport: the registered callback table is
/// replaced on every document load.
#[derive(Clone)]
pub(crate) struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

struct MockInner {
    /// Scripts evaluated against the document, in order.
    scripts: Vec<String>,
    /// Documents loaded, in order.
    documents: Vec<String>,
    /// Callback table registered by the most recent load.
    callbacks: Option<Arc<dyn SocketCallbacks>>,
    /// Fire `on_opened` as soon as the document loads.
    open_on_load: bool,
    /// Echo every sent payload back as a message.
    echo: bool,
    /// Fire `on_closed(code, reason)` on load instead of opening.
    close_on_load: Option<(i32, String)>,
    /// Confirm `sock.close();` with `on_closed(1000, "Normal closure")`.
    confirm_close: bool,
    /// Fail document loads.
    fail_load: bool,
}

impl MockTransport {
    /// Creates a transport that opens on load and confirms closes.
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                scripts: Vec::new(),
                documents: Vec::new(),
                callbacks: None,
                open_on_load: true,
                echo: false,
                close_on_load: None,
                confirm_close: true,
                fail_load: false,
            })),
        }
    }

    /// Disables open-on-load; tests drive `fire_open` themselves.
    pub(crate) fn with_manual_open(self) -> Self {
        self.inner.lock().open_on_load = false;
        self
    }

    /// Echoes every sent payload back as a message event.
    pub(crate) fn with_echo(self) -> Self {
        self.inner.lock().echo = true;
        self
    }

    /// Closes with `(code, reason)` on load instead of opening.
    pub(crate) fn with_close_on_load(self, code: i32, reason: &str) -> Self {
        let mut inner = self.inner.lock();
        inner.open_on_load = false;
        inner.close_on_load = Some((code, reason.to_string()));
        drop(inner);
        self
    }

    /// Never confirms `sock.close();`.
    pub(crate) fn with_silent_close(self) -> Self {
        self.inner.lock().confirm_close = false;
        self
    }

    /// Fails every document load.
    pub(crate) fn with_failing_load(self) -> Self {
        self.inner.lock().fail_load = true;
        self
    }

    /// Returns a provider handing out bridges backed by this transport.
    pub(crate) fn provider(&self) -> Arc<dyn BridgeProvider> {
        Arc::new(MockProvider {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Scripts evaluated so far, in order.
    pub(crate) fn scripts(&self) -> Vec<String> {
        self.inner.lock().scripts.clone()
    }

    /// Documents loaded so far, in order.
    pub(crate) fn documents(&self) -> Vec<String> {
        self.inner.lock().documents.clone()
    }

    /// Fires `on_opened` from the test thread.
    pub(crate) fn fire_open(&self) {
        if let Some(cb) = self.callbacks() {
            cb.on_opened();
        }
    }

    /// Fires `on_message` from the test thread.
    pub(crate) fn fire_message(&self, data: &str) {
        if let Some(cb) = self.callbacks() {
            cb.on_message(data);
        }
    }

    /// Fires `on_closed` from the test thread.
    pub(crate) fn fire_close(&self, code: i32, reason: &str) {
        if let Some(cb) = self.callbacks() {
            cb.on_closed(code, reason);
        }
    }

    fn callbacks(&self) -> Option<Arc<dyn SocketCallbacks>> {
        self.inner.lock().callbacks.clone()
    }
}

// ============================================================================
// MockProvider
// ============================================================================

struct MockProvider {
    inner: Arc<Mutex<MockInner>>,
}

impl BridgeProvider for MockProvider {
    fn create_bridge(&self) -> Result<Box<dyn ScriptBridge>> {
        Ok(Box::new(MockBridge {
            inner: Arc::clone(&self.inner),
        }))
    }
}

// ============================================================================
// MockBridge
// ============================================================================

struct MockBridge {
    inner: Arc<Mutex<MockInner>>,
}

impl ScriptBridge for MockBridge {
    fn load_document(
        &mut self,
        _base_url: &str,
        html: &str,
        callbacks: Arc<dyn SocketCallbacks>,
    ) -> Result<()> {
        // Decide the reaction under the lock, invoke callbacks outside it.
        let reaction = {
            let mut inner = self.inner.lock();
            if inner.fail_load {
                return Err(crate::error::Error::bridge("mock load failure"));
            }
            inner.documents.push(html.to_string());
            inner.callbacks = Some(Arc::clone(&callbacks));
            if let Some((code, reason)) = inner.close_on_load.clone() {
                LoadReaction::Close(code, reason)
            } else if inner.open_on_load {
                LoadReaction::Open
            } else {
                LoadReaction::None
            }
        };

        match reaction {
            LoadReaction::Open => callbacks.on_opened(),
            LoadReaction::Close(code, reason) => callbacks.on_closed(code, &reason),
            LoadReaction::None => {}
        }
        Ok(())
    }

    fn evaluate(&mut self, script: &str) -> Result<()> {
        let (callbacks, echo_payload, confirm_close) = {
            let mut inner = self.inner.lock();
            inner.scripts.push(script.to_string());

            let echo_payload = if inner.echo {
                parse_send_payload(script)
            } else {
                None
            };
            let confirm_close = script == "sock.close();" && inner.confirm_close;
            (inner.callbacks.clone(), echo_payload, confirm_close)
        };

        if let Some(cb) = callbacks {
            if let Some(payload) = echo_payload {
                cb.on_message(&payload);
            }
            if confirm_close {
                cb.on_closed(1000, "Normal closure");
            }
        }
        Ok(())
    }
}

enum LoadReaction {
    None,
    Open,
    Close(i32, String),
}

/// Extracts the payload from a `sock.send("...");` fragment.
fn parse_send_payload(script: &str) -> Option<String> {
    let literal = script.strip_prefix("sock.send(")?.strip_suffix(");")?;
    serde_json::from_str::<String>(literal).ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send_payload() {
        assert_eq!(
            parse_send_payload(r#"sock.send("ping");"#),
            Some("ping".to_string())
        );
        assert_eq!(parse_send_payload("sock.close();"), None);
    }

    #[test]
    fn test_scripts_recorded_in_order() {
        let transport = MockTransport::new();
        let provider = transport.provider();
        let mut bridge = provider.create_bridge().expect("bridge");

        bridge.evaluate("a();").expect("evaluate");
        bridge.evaluate("b();").expect("evaluate");

        assert_eq!(transport.scripts(), vec!["a();", "b();"]);
    }
}
