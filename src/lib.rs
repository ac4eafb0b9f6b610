//! An embedded HTTP file-browser server.
//!
//! This library runs a small HTTP/1.1 server inside a host application and
//! serves a browsable listing of the host filesystem, streaming individual
//! files on demand. A minimal routing layer lets additional handlers be
//! attached to other paths.
//!
//! # Features
//!
//! - Hand-rolled HTTP/1.1 subset: one request per connection, forced
//!   `Connection: close`, no chunked encoding
//! - Browsable directory listings with directories-first, name-sorted
//!   entries and percent-encoded links
//! - File downloads with MIME detection and attachment disposition for
//!   unknown types
//! - Path-keyed handler registry for custom routes
//! - Bulk shutdown that force-closes every live connection
//! - A companion line-delimited JSON packet service
//!
//! This is a debugging aid for trusted networks: the `/file` handler
//! performs no path containment, and handler errors are reported to the
//! client verbatim.
//!
//! # Examples
//!
//! ## Serving files
//!
//! ```no_run
//! use webfs_rs::{HttpServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), webfs_rs::ServerError> {
//!     let server = HttpServer::new(ServerConfig::default());
//!     let addr = server.start().await?;
//!     println!("browse files at http://{addr}/file");
//!
//!     // ... the server runs in the background until stopped ...
//!     server.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Attaching a custom handler
//!
//! ```no_run
//! use std::sync::Arc;
//! use webfs_rs::{
//!     HandlerFuture, HttpRequest, HttpResponse, HttpServer, HttpStatus,
//!     Outcome, RequestHandler, ServerConfig,
//! };
//!
//! struct PingHandler;
//!
//! impl RequestHandler for PingHandler {
//!     fn handle<'a>(
//!         &'a self,
//!         _request: &'a HttpRequest,
//!         response: &'a mut HttpResponse,
//!     ) -> HandlerFuture<'a> {
//!         Box::pin(async move {
//!             response.status = HttpStatus::Ok;
//!             response.set_header("Content-Type", "text/plain");
//!             response.set_text_body("pong");
//!             Ok(Outcome::Served)
//!         })
//!     }
//! }
//!
//! # async fn attach(server: &HttpServer) {
//! server.add_handler("/ping", Arc::new(PingHandler)).await;
//! # }
//! ```
//!
//! ## Decoding packets
//!
//! ```
//! use webfs_rs::Packet;
//!
//! let packet = Packet::unpack(r#"{"command":"sysinfo"}"#);
//! assert_eq!(packet.command.as_deref(), Some("sysinfo"));
//!
//! // Plain text is carried in `data` rather than rejected.
//! let echo = Packet::unpack("hello");
//! assert_eq!(echo.data.as_deref(), Some("hello"));
//! ```
//!
//! See the `demos` directory for complete runnable programs.

// Export the filesystem browsing module
pub mod files;

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Export the packet service module
pub mod packet;

// Export URL percent-encoding helpers
pub mod url;

// Re-export commonly used items for convenience
pub use files::FileHandler;
pub use packet::{Packet, PacketConfig, PacketServer};
pub use parser::{Error as ParserError, HttpRequest, read_request};
pub use server::{
    Body, Error as ServerError, HandlerFuture, HttpResponse, HttpServer, HttpStatus, Outcome,
    RequestHandler, ServerConfig,
};
