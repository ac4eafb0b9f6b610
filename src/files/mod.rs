//! Filesystem browsing over HTTP.
//!
//! The [`FileHandler`] answers `GET /file?path=<encoded path>` with either a
//! sorted HTML directory listing or a streamed file download.

mod handler;
mod listing;

// Re-export public items
pub use handler::FileHandler;
