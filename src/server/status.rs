//! HTTP status codes.

use std::fmt;

/// Status codes produced by this server, with their standard descriptions.
///
/// The description doubles as the default body text for error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok = 200,
    NotFound = 404,
    InternalError = 500,
}

impl HttpStatus {
    /// The numeric status code.
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// The textual description used in the status line.
    pub fn description(&self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",
            HttpStatus::NotFound => "Not Found",
            HttpStatus::InternalError => "Internal Server Error",
        }
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.description())
    }
}
