//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reading an HTTP request.
    #[error("parse error: {0}")]
    Parse(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The read timeout elapsed before a complete request arrived.
    #[error("timed out reading request")]
    ReadTimeout,

    /// `start()` was called on a server that is already listening or has
    /// been stopped. A stopped server cannot be restarted.
    #[error("server already started or stopped")]
    InvalidState,

    /// A handler failed while serving a request.
    #[error("handler error: {0}")]
    Handler(String),
}
