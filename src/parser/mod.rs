//! HTTP request wire format.
//!
//! This module reads a single request from a buffered connection stream with
//! a focus on simplicity and predictable behavior for a debugging tool.

mod error;
mod request;

// Re-export public items
pub use error::Error;
pub use request::HttpRequest;

// Re-export the read_request function
pub use request::read_request;
