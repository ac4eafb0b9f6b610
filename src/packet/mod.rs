//! A small JSON-over-TCP companion service.
//!
//! A distinct, simpler protocol than the HTTP server: newline-delimited JSON
//! packets, echoed back unless they carry a known command.

mod packet;
mod server;

// Re-export public items
pub use packet::{CMD_SYS_INFO, Packet};
pub use server::{Error, PacketConfig, PacketServer, build_info};
