//! The packet wire format: one JSON object per line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command answered with host build information.
pub const CMD_SYS_INFO: &str = "sysinfo";

/// A single framed message on the packet channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// The command to execute; a packet with no command is echoed back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Free-form payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Command parameters, left as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Packet {
    /// Decode one line of input.
    ///
    /// Empty input yields an empty packet; text that is not a JSON packet is
    /// carried verbatim in `data` rather than rejected.
    pub fn unpack(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(text) {
            Ok(packet) => packet,
            Err(_) => Self {
                data: Some(text.to_string()),
                ..Self::default()
            },
        }
    }

    /// Encode the packet as a single JSON line.
    pub fn pack(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
