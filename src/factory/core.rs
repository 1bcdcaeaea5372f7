//! Socket factory.
//!
//! [`SocketFactory`] owns the resolved transport library and the bridge
//! provider, and assembles the per-socket machinery: the generated document,
//! the worker and delivery threads, the callback relay and the public
//! [`Socket`] handle. Creation blocks until the transport either opens or
//! is refused, so a returned socket is immediately usable.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};
use url::Url;

use crate::bridge::BridgeProvider;
use crate::error::{Error, Result};
use crate::identifiers::SocketId;
use crate::socket::{CallbackRelay, EventSink, Shared, Socket, Worker, spawn_delivery};

use super::assets::build_socket_document;
use super::builder::FactoryBuilder;

// ============================================================================
// SocketFactory
// ============================================================================

/// Creates socket instances backed by a shared transport library.
///
/// The library is resolved once at factory construction; every socket
/// document embeds the same copy. Clones share the factory.
#[derive(Clone)]
pub struct SocketFactory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    /// Pre-rendered `<script>` tag embedding the transport library.
    library_tag: String,
    provider: Arc<dyn BridgeProvider>,
    init_timeout: Duration,
    close_timeout: Duration,
    /// Every socket created by this factory, for bulk shutdown.
    sockets: Mutex<FxHashMap<SocketId, Socket>>,
}

impl SocketFactory {
    /// Returns a builder for custom configuration.
    #[must_use]
    pub fn builder() -> FactoryBuilder {
        FactoryBuilder::new()
    }

    /// Creates a factory fetching the library from the default URL.
    ///
    /// # Errors
    ///
    /// [`Error::LibraryFetch`] if the library cannot be fetched. No factory
    /// state is created on failure.
    pub fn new(provider: Arc<dyn BridgeProvider>) -> Result<Self> {
        FactoryBuilder::new().provider(provider).build()
    }

    /// Creates a factory fetching the library from `url`.
    ///
    /// # Errors
    ///
    /// Same as [`SocketFactory::new`], plus [`Error::Config`] for an
    /// unparseable URL.
    pub fn with_library_url(
        url: impl Into<String>,
        provider: Arc<dyn BridgeProvider>,
    ) -> Result<Self> {
        FactoryBuilder::new()
            .library_url(url)
            .provider(provider)
            .build()
    }

    pub(crate) fn from_parts(
        library_tag: String,
        provider: Arc<dyn BridgeProvider>,
        init_timeout: Duration,
        close_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                library_tag,
                provider,
                init_timeout,
                close_timeout,
                sockets: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Creates a socket connected to `url`, delivering events to `sink`.
    ///
    /// Blocks until the transport opens or is refused; a refusal still
    /// returns the socket, with the terminal `Closed` event delivered to
    /// the sink.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `url` does not parse
    /// - [`Error::InitTimeout`] if the transport neither opens nor closes
    ///   within the init timeout
    /// - [`Error::Io`] if a thread cannot be spawned
    /// - [`Error::Bridge`] if the worker is unreachable
    pub fn create_socket(
        &self,
        url: impl Into<String>,
        sink: impl EventSink + 'static,
    ) -> Result<Socket> {
        self.create_socket_with_options(url, sink, None)
    }

    /// Like [`SocketFactory::create_socket`], with an extra JavaScript
    /// expression passed verbatim as the transport constructor's second
    /// argument (e.g. a transport allowlist).
    pub fn create_socket_with_options(
        &self,
        url: impl Into<String>,
        sink: impl EventSink + 'static,
        options: Option<&str>,
    ) -> Result<Socket> {
        let url = url.into();
        Url::parse(&url).map_err(|e| Error::config(format!("Invalid socket URL {url}: {e}")))?;

        let id = SocketId::generate();
        let document = build_socket_document(&self.inner.library_tag, &url, options);
        debug!(socket = %id, url = %url, "Socket document generated");

        let shared = Arc::new(Shared::new());
        let (mailbox_tx, mailbox_rx) = mpsc::channel();
        let mailbox = Arc::new(mailbox_tx);
        let (event_tx, event_rx) = mpsc::channel();

        let relay = Arc::new(CallbackRelay::new(
            id,
            Arc::clone(&shared),
            Arc::downgrade(&mailbox),
        ));

        spawn_delivery(id, Box::new(sink), event_rx)?;
        Worker {
            id,
            target_url: url.clone(),
            document,
            provider: Arc::clone(&self.inner.provider),
            shared: Arc::clone(&shared),
            mailbox: mailbox_rx,
            events: event_tx,
            relay,
            close_timeout: self.inner.close_timeout,
        }
        .spawn()?;

        let socket = Socket::new(
            id,
            url,
            mailbox,
            shared,
            self.inner.init_timeout,
            self.inner.close_timeout,
        );

        if let Err(e) = socket.init() {
            warn!(socket = %id, error = %e, "Socket initialization failed");
            socket.abort();
            return Err(e);
        }

        self.inner.sockets.lock().insert(id, socket.clone());
        info!(socket = %id, url = %socket.url(), state = %socket.state(), "Socket created");
        Ok(socket)
    }

    /// Number of sockets created by this factory and not yet bulk-closed.
    #[must_use]
    pub fn socket_count(&self) -> usize {
        self.inner.sockets.lock().len()
    }

    /// Closes every socket created by this factory.
    ///
    /// Close failures are logged, not propagated; all sockets are attempted.
    pub fn close_all(&self) {
        let sockets: Vec<Socket> = {
            let mut map = self.inner.sockets.lock();
            map.drain().map(|(_, socket)| socket).collect()
        };
        info!(count = sockets.len(), "Closing all sockets");
        for socket in sockets {
            if let Err(e) = socket.close() {
                warn!(socket = %socket.id(), error = %e, "Close failed during shutdown");
            }
        }
    }
}

impl fmt::Debug for SocketFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketFactory")
            .field("library_bytes", &self.inner.library_tag.len())
            .field("init_timeout", &self.inner.init_timeout)
            .field("close_timeout", &self.inner.close_timeout)
            .field("sockets", &self.socket_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc::Receiver;

    use crate::bridge::mock::MockTransport;
    use crate::factory::LibrarySource;
    use crate::protocol::SocketEvent;
    use crate::socket::Lifecycle;

    /// Routes crate logs to the test harness when `RUST_LOG` is set.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn factory(transport: &MockTransport) -> SocketFactory {
        init_tracing();
        SocketFactory::builder()
            .library_source(LibrarySource::inline("var SockJS = function() {};"))
            .provider(transport.provider())
            .init_timeout(Duration::from_secs(5))
            .close_timeout(Duration::from_secs(5))
            .build()
            .expect("build factory")
    }

    fn channel_sink() -> (impl EventSink + 'static, Receiver<SocketEvent>) {
        let (tx, rx) = mpsc::channel();
        (
            move |event: SocketEvent| {
                let _ = tx.send(event);
            },
            rx,
        )
    }

    fn recv(events: &Receiver<SocketEvent>) -> SocketEvent {
        events.recv_timeout(Duration::from_secs(5)).expect("event")
    }

    #[test]
    fn test_create_socket_opens_and_echoes() {
        let transport = MockTransport::new().with_echo();
        let factory = factory(&transport);
        let (sink, events) = channel_sink();

        let socket = factory
            .create_socket("https://example.test/echo", sink)
            .expect("create socket");

        assert!(socket.is_open());
        assert_eq!(socket.url(), "https://example.test/echo");
        assert_eq!(factory.socket_count(), 1);
        assert_eq!(recv(&events), SocketEvent::Opened);

        socket.send("ping");
        assert_eq!(recv(&events), SocketEvent::message("ping"));

        socket.close().expect("close");
        assert_eq!(recv(&events), SocketEvent::closed(1000, "Normal closure"));
    }

    #[test]
    fn test_document_embeds_library_and_url() {
        let transport = MockTransport::new();
        let factory = factory(&transport);
        let (sink, _events) = channel_sink();

        factory
            .create_socket("https://example.test/echo", sink)
            .expect("create socket");

        let documents = transport.documents();
        assert_eq!(documents.len(), 1);
        assert!(documents[0].contains("data:application/javascript;base64,"));
        assert!(documents[0].contains(r#"new SockJS("https://example.test/echo");"#));
    }

    #[test]
    fn test_options_reach_the_constructor() {
        let transport = MockTransport::new();
        let factory = factory(&transport);
        let (sink, _events) = channel_sink();

        factory
            .create_socket_with_options(
                "https://example.test/echo",
                sink,
                Some("{transports:['websocket']}"),
            )
            .expect("create socket");

        let documents = transport.documents();
        assert!(documents[0].contains(
            r#"new SockJS("https://example.test/echo",{transports:['websocket']});"#
        ));
    }

    #[test]
    fn test_invalid_socket_url_is_config_error() {
        let transport = MockTransport::new();
        let factory = factory(&transport);
        let (sink, _events) = channel_sink();

        let err = factory
            .create_socket("not a url", sink)
            .expect_err("must fail");
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(factory.socket_count(), 0);
    }

    #[test]
    fn test_refused_connection_returns_socket_with_closed_event() {
        let transport = MockTransport::new().with_close_on_load(2000, "Go away!");
        let factory = factory(&transport);
        let (sink, events) = channel_sink();

        let socket = factory
            .create_socket("https://example.test/echo", sink)
            .expect("create socket");

        assert!(!socket.is_open());
        assert_eq!(socket.state(), Lifecycle::Closed);
        assert_eq!(recv(&events), SocketEvent::closed(2000, "Go away!"));
    }

    #[test]
    fn test_init_timeout_fails_creation() {
        let transport = MockTransport::new().with_manual_open();
        let factory = SocketFactory::builder()
            .library_source(LibrarySource::inline("x"))
            .provider(transport.provider())
            .init_timeout(Duration::from_millis(50))
            .close_timeout(Duration::from_secs(1))
            .build()
            .expect("build factory");
        let (sink, _events) = channel_sink();

        let err = factory
            .create_socket("https://example.test/echo", sink)
            .expect_err("must time out");
        assert!(matches!(err, Error::InitTimeout { .. }));
        assert!(err.is_recoverable());
        assert_eq!(factory.socket_count(), 0);
    }

    #[test]
    fn test_unreachable_library_url_fails_construction() {
        let transport = MockTransport::new();
        let err = SocketFactory::with_library_url(
            "http://127.0.0.1:1/sockjs.min.js",
            transport.provider(),
        )
        .expect_err("must fail");
        assert!(matches!(err, Error::LibraryFetch { .. }));
    }

    #[test]
    fn test_close_all_drains_registry() {
        let transport = MockTransport::new();
        let factory = factory(&transport);
        let (sink, events) = channel_sink();

        let socket = factory
            .create_socket("https://example.test/echo", sink)
            .expect("create socket");
        assert_eq!(recv(&events), SocketEvent::Opened);
        assert_eq!(factory.socket_count(), 1);

        factory.close_all();
        assert_eq!(factory.socket_count(), 0);
        assert!(!socket.is_open());
        assert!(matches!(recv(&events), SocketEvent::Closed { .. }));
    }
}
