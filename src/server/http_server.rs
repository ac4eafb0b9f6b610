//! HTTP server implementation.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::AbortHandle;
use tokio::time::timeout;

use crate::files::FileHandler;
use crate::parser::{Error as ParserError, HttpRequest, read_request};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{HandlerMap, Outcome, RequestHandler};
use crate::server::response::HttpResponse;
use crate::server::status::HttpStatus;

/// Lifecycle of a server instance. `Stopped` is terminal: serving again
/// requires a fresh instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Listening,
    Stopped,
}

/// Set of live connections, keyed by an id private to the accept loop.
/// Add, remove and bulk-abort all go through this one lock.
type ConnectionSet = Arc<Mutex<HashMap<u64, AbortHandle>>>;

/// An embedded HTTP server.
///
/// Serves a browsable file listing at `/file` out of the box; additional
/// handlers can be attached to other paths with [`add_handler`].
///
/// [`add_handler`]: HttpServer::add_handler
pub struct HttpServer {
    config: ServerConfig,
    handlers: Arc<RwLock<HandlerMap>>,
    connections: ConnectionSet,
    state: Mutex<State>,
    shutdown: Arc<Notify>,
    local_addr: OnceLock<SocketAddr>,
}

impl HttpServer {
    /// Create a server with the file-browser handler registered at `/file`.
    pub fn new(config: ServerConfig) -> Self {
        let mut handlers: HandlerMap = HashMap::new();
        handlers.insert(
            "/file".to_string(),
            Arc::new(FileHandler::new(&config.data_dir)),
        );

        Self {
            config,
            handlers: Arc::new(RwLock::new(handlers)),
            connections: Arc::new(Mutex::new(HashMap::new())),
            state: Mutex::new(State::Idle),
            shutdown: Arc::new(Notify::new()),
            local_addr: OnceLock::new(),
        }
    }

    /// Bind a handler to an exact path, replacing any previous binding.
    /// There is no wildcard or prefix matching.
    pub async fn add_handler(&self, path: impl Into<String>, handler: Arc<dyn RequestHandler>) {
        self.handlers.write().await.insert(path.into(), handler);
    }

    /// Unbind the handler at the given path, if any.
    pub async fn remove_handler(&self, path: &str) {
        self.handlers.write().await.remove(path);
    }

    /// The bound address, available once [`start`](HttpServer::start) has
    /// succeeded. Host applications display this to the user.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Bind the listening socket and spawn the accept loop.
    ///
    /// Returns the bound address. Fails if the address cannot be bound or
    /// the server was already started or stopped.
    pub async fn start(&self) -> Result<SocketAddr, Error> {
        {
            let mut state = self.state.lock().await;
            if *state != State::Idle {
                return Err(Error::InvalidState);
            }
            *state = State::Listening;
        }

        let listener = match Self::bind(self.config.addr) {
            Ok(listener) => listener,
            Err(e) => {
                error!("failed to bind {addr}: {e}", addr = self.config.addr);
                *self.state.lock().await = State::Stopped;
                return Err(Error::Io(e));
            }
        };
        let local_addr = listener.local_addr()?;
        let _ = self.local_addr.set(local_addr);
        info!("http server listening on {local_addr}");

        let handlers = self.handlers.clone();
        let connections = self.connections.clone();
        let shutdown = self.shutdown.clone();
        let read_timeout = self.config.read_timeout;
        tokio::spawn(async move {
            Self::accept_loop(listener, handlers, connections, shutdown, read_timeout).await;
        });

        Ok(local_addr)
    }

    /// Stop accepting connections and force-close every live connection.
    ///
    /// Terminal: a stopped server cannot be started again.
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock().await;
            if *state == State::Stopped {
                return;
            }
            *state = State::Stopped;
        }
        self.shutdown.notify_one();

        let mut connections = self.connections.lock().await;
        let count = connections.len();
        for (_, handle) in connections.drain() {
            handle.abort();
        }
        info!("http server stopped, closed {count} connections");
    }

    /// Open the listening socket with address reuse enabled.
    fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(1024)
    }

    /// Accept connections until shutdown, spawning one worker per connection.
    /// Workers are fire-and-forget; the live-connection set is the only
    /// record of them.
    async fn accept_loop(
        listener: TcpListener,
        handlers: Arc<RwLock<HandlerMap>>,
        connections: ConnectionSet,
        shutdown: Arc<Notify>,
        read_timeout: Duration,
    ) {
        let mut next_id: u64 = 0;
        loop {
            let (socket, peer) = tokio::select! {
                _ = shutdown.notified() => break,
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("accept failed: {e}");
                        continue;
                    }
                },
            };
            debug!("connection from {peer} established");

            next_id += 1;
            let id = next_id;
            let handlers = handlers.clone();
            let worker_connections = connections.clone();

            // Hold the set lock across the spawn so the worker's removal
            // cannot run before the insertion.
            let mut guard = connections.lock().await;
            let task = tokio::spawn(async move {
                if let Err(e) = Self::handle_connection(socket, handlers, read_timeout).await {
                    error!("connection from {peer} failed: {e}");
                }
                worker_connections.lock().await.remove(&id);
                debug!("disconnect {peer}");
            });
            guard.insert(id, task.abort_handle());
        }
        debug!("accept loop finished");
    }

    /// Serve one connection: read a single request, dispatch it, write a
    /// single response. Both socket halves are dropped on every exit path,
    /// so no teardown step can leak them.
    pub async fn handle_connection<S>(
        socket: S,
        handlers: Arc<RwLock<HandlerMap>>,
        read_timeout: Duration,
    ) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let (read_half, write_half) = tokio::io::split(socket);
        let mut reader = BufReader::new(read_half);
        let mut writer = BufWriter::new(write_half);

        let request = match timeout(read_timeout, read_request(&mut reader)).await {
            Err(_) => return Err(Error::ReadTimeout),
            Ok(Err(e)) => {
                // A garbled request line still gets a diagnostic response;
                // transport errors get nothing.
                if matches!(e, ParserError::MalformedRequestLine(_)) {
                    let mut response = HttpResponse::new();
                    response.status = HttpStatus::InternalError;
                    response.set_text_body(e.to_string());
                    response.write_to(&mut writer).await?;
                    let _ = writer.shutdown().await;
                }
                return Err(Error::Parse(e));
            }
            Ok(Ok(None)) => {
                debug!("peer disconnected before sending a request");
                return Ok(());
            }
            Ok(Ok(Some(request))) => request,
        };

        debug!("serve {method} {path}", method = request.method, path = request.path);
        let response = Self::dispatch(&handlers, &request).await;
        debug!("respond {status}", status = response.status);
        response.write_to(&mut writer).await?;
        let _ = writer.shutdown().await;
        Ok(())
    }

    /// Dispatch a request against this server's registry.
    pub async fn serve_request(&self, request: &HttpRequest) -> HttpResponse {
        Self::dispatch(&self.handlers, request).await
    }

    /// Resolve the request path to a handler and normalize its outcome into
    /// a response.
    ///
    /// No handler, or a handler that declines, yields a 404 whose body is
    /// the status description. A handler error yields a 500 carrying the
    /// error text in the body.
    pub async fn dispatch(handlers: &RwLock<HandlerMap>, request: &HttpRequest) -> HttpResponse {
        let mut response = HttpResponse::new();

        let guard = handlers.read().await;
        if let Some(handler) = guard.get(&request.path) {
            match handler.handle(request, &mut response).await {
                Ok(Outcome::Served) => return response,
                Ok(Outcome::Declined) => {}
                Err(e) => {
                    warn!("handler for {path} failed: {e}", path = request.path);
                    response.status = HttpStatus::InternalError;
                    response.set_text_body(e.to_string());
                    return response;
                }
            }
        }

        // default handler
        response.status = HttpStatus::NotFound;
        response.set_text_body(HttpStatus::NotFound.description());
        response
    }
}
