/* 📖 # Why one thread per connection?

Every accepted socket gets its own OS thread running a `ConnectionHandler`. A slow
client or a large file only ever blocks its own thread, and a panic in one
handler takes down one connection, not the server. There is no pool and no
queue: concurrency is bounded only by what the OS lets us spawn. That is a known
limitation; `io_timeout` at least stops idle peers from holding threads forever.

# How does a running listener stop?

`std::net::TcpListener::accept` has no cancellation. `ServerHandle` sets a
shutdown flag and then connects to the listener itself, which wakes the blocked
`accept`; the loop sees the flag and exits. Connections already being served
finish on their own threads.
*/

use std::net::{Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use wikisearch_base::pal::http::HttpServerConfig;
use wikisearch_base::{WikiSearchResult, err};

use crate::handler::ConnectionHandler;

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Owns the listening socket.
#[derive(Debug)]
pub struct Listener {
    socket: TcpListener,
    local_addr: SocketAddr,
    handler: ConnectionHandler,
    io_timeout: Option<Duration>,
}

impl Listener {
    /// Bind the configured address. Failing to bind is an error, not a retry.
    pub fn bind(config: &HttpServerConfig, handler: ConnectionHandler) -> WikiSearchResult<Self> {
        let address = config.address();
        let socket =
            TcpListener::bind(&address).map_err(|e| err!("Failed to bind {}: {}", address, e))?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| err!("Failed to read local address of {}: {}", address, e))?;
        info!(%local_addr, "listening");
        Ok(Self {
            socket,
            local_addr,
            handler,
            io_timeout: config.io_timeout,
        })
    }

    /// The bound address, with the OS-assigned port filled in.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections on the current thread, forever.
    pub fn run(self) {
        let shutdown = Arc::new(AtomicBool::new(false));
        let active = Arc::new(AtomicUsize::new(0));
        self.accept_loop(&shutdown, &active);
    }

    /// Accept connections on a background thread until the handle is stopped.
    pub fn start(self) -> WikiSearchResult<ServerHandle> {
        let local_addr = self.local_addr;
        let shutdown = Arc::new(AtomicBool::new(false));
        let active = Arc::new(AtomicUsize::new(0));

        let accept_thread = {
            let shutdown = shutdown.clone();
            let active = active.clone();
            thread::Builder::new()
                .name("wikisearch-accept".to_string())
                .spawn(move || self.accept_loop(&shutdown, &active))
                .map_err(|e| err!("Failed to spawn accept thread: {}", e))?
        };

        Ok(ServerHandle {
            local_addr,
            shutdown,
            active,
            accept_thread: Some(accept_thread),
        })
    }

    fn accept_loop(&self, shutdown: &AtomicBool, active: &Arc<AtomicUsize>) {
        for stream in self.socket.incoming() {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => self.dispatch(stream, active),
                Err(e) => warn!(error = %e, "failed to accept connection"),
            }
        }
        info!(local_addr = %self.local_addr, "listener stopped");
    }

    fn dispatch(&self, stream: TcpStream, active: &Arc<AtomicUsize>) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        if let Some(timeout) = self.io_timeout {
            let applied = stream
                .set_read_timeout(Some(timeout))
                .and_then(|()| stream.set_write_timeout(Some(timeout)));
            if let Err(e) = applied {
                warn!(%peer, error = %e, "failed to set connection timeouts");
            }
        }

        let handler = self.handler.clone();
        let guard = ActiveConnection::enter(active.clone());
        let spawned = thread::Builder::new()
            .name(format!("wikisearch-conn-{}", peer))
            .spawn(move || {
                let _guard = guard;
                handler.handle(&stream, &peer);
                if let Err(e) = stream.shutdown(Shutdown::Both) {
                    debug!(%peer, error = %e, "socket already closed");
                }
            });
        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn connection thread");
        }
    }
}

/// Counts a connection as active for as long as it lives.
struct ActiveConnection(Arc<AtomicUsize>);

impl ActiveConnection {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle to a listener running on a background thread.
///
/// Dropping the handle stops the listener.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    accept_thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections currently being served.
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop accepting connections and wait for the accept thread to exit.
    pub fn stop(mut self) -> WikiSearchResult<()> {
        self.stop_accepting()
    }

    fn stop_accepting(&mut self) -> WikiSearchResult<()> {
        let Some(accept_thread) = self.accept_thread.take() else {
            return Ok(());
        };
        self.shutdown.store(true, Ordering::SeqCst);

        // Unblock accept(); without a wake-up connection the join would hang.
        TcpStream::connect_timeout(&wake_address(self.local_addr), WAKE_TIMEOUT)
            .map_err(|e| err!("Failed to wake listener on {}: {}", self.local_addr, e))?;
        accept_thread
            .join()
            .map_err(|_| err!("Accept thread on {} panicked", self.local_addr))
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop_accepting() {
            warn!(error = %e, "failed to stop listener");
        }
    }
}

/// Where to connect to reach a listener bound to `local_addr`.
fn wake_address(local_addr: SocketAddr) -> SocketAddr {
    let mut address = local_addr;
    if address.ip().is_unspecified() {
        match address {
            SocketAddr::V4(_) => address.set_ip(Ipv4Addr::LOCALHOST.into()),
            SocketAddr::V6(_) => address.set_ip(Ipv6Addr::LOCALHOST.into()),
        }
    }
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexHandle, InMemoryIndex};
    use wikisearch_base::{MockPal, PalHandle};

    fn handler() -> ConnectionHandler {
        ConnectionHandler::new(
            PalHandle::new(MockPal::new()),
            IndexHandle::new(InMemoryIndex::new()),
        )
    }

    #[test]
    fn test_bind_assigns_port() {
        let listener = Listener::bind(&HttpServerConfig::default(), handler()).unwrap();
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[test]
    fn test_bind_conflict_is_clear_error() {
        let first = Listener::bind(&HttpServerConfig::default(), handler()).unwrap();
        let port = first.local_addr().port();

        let config = HttpServerConfig::new("127.0.0.1").with_port(port);
        let err = Listener::bind(&config, handler()).unwrap_err();
        assert!(
            err.to_string()
                .starts_with(&format!("Failed to bind 127.0.0.1:{}", port))
        );
    }

    #[test]
    fn test_stop_releases_port() {
        let listener = Listener::bind(&HttpServerConfig::default(), handler()).unwrap();
        let addr = listener.local_addr();
        let server = listener.start().unwrap();
        assert_eq!(server.local_addr(), addr);

        server.stop().unwrap();
        assert!(TcpStream::connect_timeout(&addr, Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_wake_address() {
        let unspecified: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        assert_eq!(wake_address(unspecified), "127.0.0.1:8080".parse().unwrap());

        let unspecified_v6: SocketAddr = "[::]:8080".parse().unwrap();
        assert_eq!(wake_address(unspecified_v6), "[::1]:8080".parse().unwrap());

        let bound: SocketAddr = "10.1.2.3:80".parse().unwrap();
        assert_eq!(wake_address(bound), bound);
    }
}
