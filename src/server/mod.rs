//! HTTP server implementation for webfs-rs.
//!
//! This module provides the connection acceptor, the path-keyed handler
//! registry, and response serialization for a one-request-per-connection
//! HTTP/1.1 subset (no keep-alive, no chunked encoding).

mod config;
mod error;
mod handler;
mod http_server;
mod response;
mod status;
mod tests;

// Re-export public items
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{HandlerFuture, HandlerMap, Outcome, RequestHandler};
pub use http_server::HttpServer;
pub use response::{Body, HttpResponse};
pub use status::HttpStatus;
