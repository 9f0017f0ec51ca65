//! TCP Server
//!
//! Binds the listening socket and serves exactly one client on a dedicated
//! connection thread.

use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::Connection;
use crate::config::Config;
use crate::error::{MockError, Result};
use crate::responder::{Handler, PacketLog, Responder};

/// How often the accept loop checks for a client or a stop request
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle of a server instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Not yet started
    Unbound,

    /// Bound and waiting for the client
    Listening,

    /// Serving the client
    Connected,

    /// Stopped; the connection thread has exited
    Stopped,
}

/// State shared with the connection thread
struct Shared {
    state: Mutex<ServerState>,
    shutdown: AtomicBool,
    /// Clone of the accepted socket, kept so `stop()` can unblock reads
    client: Mutex<Option<TcpStream>>,
}

/// Mock GDB remote server
///
/// ```no_run
/// use gdbmock::{Config, Server};
///
/// let mut server = Server::new(Config::default());
/// server.start().unwrap();
/// println!("attach with {}", server.url().unwrap());
/// // ... drive a debugger against the server ...
/// server.stop().unwrap();
/// println!("{:?}", server.packet_log().entries());
/// ```
pub struct Server {
    config: Config,

    /// Moved into the connection thread on `start()`
    responder: Option<Responder>,

    /// Shared view of the responder's log
    packet_log: PacketLog,

    /// Set once bound
    local_addr: Option<SocketAddr>,

    shared: Arc<Shared>,

    thread: Option<JoinHandle<()>>,
}

impl Server {
    /// Create a server answering with the default handler
    pub fn new(config: Config) -> Self {
        Self::with_responder(config, Responder::default())
    }

    /// Create a server answering with a custom handler
    pub fn with_handler<H: Handler + 'static>(config: Config, handler: H) -> Self {
        Self::with_responder(config, Responder::new(handler))
    }

    /// Create a server around an existing responder
    pub fn with_responder(config: Config, responder: Responder) -> Self {
        let packet_log = responder.packet_log();
        Self {
            config,
            responder: Some(responder),
            packet_log,
            local_addr: None,
            shared: Arc::new(Shared {
                state: Mutex::new(ServerState::Unbound),
                shutdown: AtomicBool::new(false),
                client: Mutex::new(None),
            }),
            thread: None,
        }
    }

    /// Bind, listen and start waiting for the client
    ///
    /// Returns once the socket is bound, so the (possibly ephemeral) port is
    /// known before any client connects.
    pub fn start(&mut self) -> Result<SocketAddr> {
        if self.responder.is_none() {
            return Err(MockError::Network("server was already started".to_string()));
        }

        let listener = TcpListener::bind(self.config.socket_addr()?)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        let Some(responder) = self.responder.take() else {
            return Err(MockError::Network("server was already started".to_string()));
        };
        self.local_addr = Some(local_addr);
        *self.shared.state.lock() = ServerState::Listening;

        info!("Mock GDB server listening on {}", local_addr);

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let handle = thread::Builder::new()
            .name("gdbmock-connection".to_string())
            .spawn(move || serve_one(listener, responder, config, shared))?;
        self.thread = Some(handle);

        Ok(local_addr)
    }

    /// Close the sockets and join the connection thread
    ///
    /// Safe to call while the connection thread is blocked in a read.
    pub fn stop(&mut self) -> Result<()> {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        if let Some(stream) = self.shared.client.lock().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.join()
    }

    /// Wait for the session to end on its own
    pub fn wait(&mut self) -> Result<()> {
        if self.thread.is_none() {
            return Err(MockError::Network("server is not running".to_string()));
        }
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.thread.take() {
            handle
                .join()
                .map_err(|_| MockError::Network("connection thread panicked".to_string()))?;
            *self.shared.state.lock() = ServerState::Stopped;
            debug!("Mock GDB server stopped");
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Address actually bound (after `start()`)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Port actually bound (after `start()`)
    pub fn port(&self) -> Option<u16> {
        self.local_addr.map(|a| a.port())
    }

    /// Remote-target URL a debugger can connect to
    pub fn url(&self) -> Option<String> {
        self.local_addr
            .map(|a| format!("connect://{}:{}", a.ip(), a.port()))
    }

    pub fn state(&self) -> ServerState {
        *self.shared.state.lock()
    }

    /// Every command received from the client, in order
    pub fn packet_log(&self) -> PacketLog {
        self.packet_log.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.stop();
        }
    }
}

// =============================================================================
// Connection thread
// =============================================================================

/// Accept one client and serve it until the connection ends
fn serve_one(listener: TcpListener, responder: Responder, config: Config, shared: Arc<Shared>) {
    let stream = match accept_client(&listener, &shared, config.accept_timeout()) {
        Some(stream) => stream,
        None => return,
    };
    drop(listener);

    match stream.try_clone() {
        Ok(clone) => *shared.client.lock() = Some(clone),
        Err(e) => {
            warn!("Failed to clone client socket: {}", e);
            return;
        }
    }
    // stop() may have run between accept and registering the clone
    if shared.shutdown.load(Ordering::SeqCst) {
        let _ = stream.shutdown(Shutdown::Both);
        return;
    }
    *shared.state.lock() = ServerState::Connected;

    let mut connection = match Connection::new(stream, responder, &config) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.handle() {
        debug!("Session with {} aborted: {}", connection.peer_addr(), e);
    }
}

/// Poll the non-blocking listener until a client arrives, the timeout
/// passes, or a stop is requested
fn accept_client(
    listener: &TcpListener,
    shared: &Shared,
    timeout: Option<Duration>,
) -> Option<TcpStream> {
    let deadline = timeout.map(|t| Instant::now() + t);

    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            return None;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("Accepted client {}", addr);
                return Some(stream);
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    debug!("No client connected before the accept timeout");
                    return None;
                }
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!("Accept failed: {}", e);
                return None;
            }
        }
    }
}
