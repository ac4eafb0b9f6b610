//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while reading an HTTP request.
#[derive(Debug, Error)]
pub enum Error {
    /// The request line has fewer than three whitespace-separated tokens.
    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),

    /// I/O failure while reading from the connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
