//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// How long a worker waits for a complete request before dropping the
    /// connection.
    pub read_timeout: Duration,
    /// Host application data directory, linked from the listing page.
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 7777)),
            read_timeout: Duration::from_secs(10),
            data_dir: std::env::temp_dir(),
        }
    }
}
