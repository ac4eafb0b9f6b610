//! The packet service: a line-delimited JSON command/echo channel.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use log::{debug, error, info};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{Mutex, Notify};
use tokio::task::AbortHandle;

use crate::packet::packet::{CMD_SYS_INFO, Packet};

/// Errors that can occur during packet server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a response packet.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `start()` was called on a server that is already listening or has
    /// been stopped.
    #[error("server already started or stopped")]
    InvalidState,
}

/// Packet server configuration.
#[derive(Debug, Clone)]
pub struct PacketConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8964)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Listening,
    Stopped,
}

/// A line-delimited JSON service running beside the HTTP server.
///
/// Each line is decoded as a [`Packet`]. Packets carrying a command get a
/// command response (`sysinfo` answers with host build information); packets
/// without one are echoed back. Unlike the HTTP server, a connection stays
/// open and handles packets until the peer disconnects.
pub struct PacketServer {
    config: PacketConfig,
    connections: Arc<Mutex<HashMap<u64, AbortHandle>>>,
    state: Mutex<State>,
    shutdown: Arc<Notify>,
    local_addr: OnceLock<SocketAddr>,
}

impl PacketServer {
    pub fn new(config: PacketConfig) -> Self {
        Self {
            config,
            connections: Arc::new(Mutex::new(HashMap::new())),
            state: Mutex::new(State::Idle),
            shutdown: Arc::new(Notify::new()),
            local_addr: OnceLock::new(),
        }
    }

    /// The bound address, available once [`start`](PacketServer::start) has
    /// succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Bind the listening socket and spawn the accept loop.
    pub async fn start(&self) -> Result<SocketAddr, Error> {
        {
            let mut state = self.state.lock().await;
            if *state != State::Idle {
                return Err(Error::InvalidState);
            }
            *state = State::Listening;
        }

        let socket = match self.config.addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(self.config.addr)?;
        let listener = socket.listen(1024)?;
        let local_addr = listener.local_addr()?;
        let _ = self.local_addr.set(local_addr);
        info!("packet server listening on {local_addr}");

        let connections = self.connections.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            Self::accept_loop(listener, connections, shutdown).await;
        });

        Ok(local_addr)
    }

    /// Stop accepting connections and force-close every live connection.
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
        info!("packet server stopped, closed {count} connections");
    }

    async fn accept_loop(
        listener: TcpListener,
        connections: Arc<Mutex<HashMap<u64, AbortHandle>>>,
        shutdown: Arc<Notify>,
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
            debug!("packet connection from {peer} established");

            next_id += 1;
            let id = next_id;
            let worker_connections = connections.clone();

            let mut guard = connections.lock().await;
            let task = tokio::spawn(async move {
                if let Err(e) = Self::handle_connection(socket).await {
                    error!("packet connection from {peer} failed: {e}");
                }
                worker_connections.lock().await.remove(&id);
                debug!("packet disconnect {peer}");
            });
            guard.insert(id, task.abort_handle());
        }
        debug!("packet accept loop finished");
    }

    /// Serve one connection: decode and answer packets line by line until
    /// the peer disconnects.
    async fn handle_connection(socket: TcpStream) -> Result<(), Error> {
        let (read_half, write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);
        let mut writer = BufWriter::new(write_half);

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }
            let request = Packet::unpack(line.trim_end_matches(['\r', '\n']));
            debug!("receive packet {request:?}");

            // A packet with no command is just sent back.
            let response = Self::process(&request).unwrap_or(request);
            let mut bytes = response.pack()?.into_bytes();
            bytes.push(b'\n');
            writer.write_all(&bytes).await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Execute a packet's command, if it carries one.
    fn process(request: &Packet) -> Option<Packet> {
        request.command.as_deref()?;
        let mut response = Packet::default();
        if request.command.as_deref() == Some(CMD_SYS_INFO) {
            response.data = Some(build_info());
        }
        Some(response)
    }
}

/// Host build information reported by the `sysinfo` command.
pub fn build_info() -> String {
    format!(
        "{} {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::env::consts::FAMILY
    )
}
