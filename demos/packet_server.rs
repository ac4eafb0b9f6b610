//! Run the JSON packet service.
//!
//! Run with: cargo run --example packet_server
//! Then try:  printf '{"command":"sysinfo"}\n' | nc 127.0.0.1 8964

use webfs_rs::{PacketConfig, PacketServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = PacketConfig {
        addr: "127.0.0.1:8964".parse()?,
    };
    let server = PacketServer::new(config);
    let addr = server.start().await?;
    println!("packet service on {addr}");
    println!("press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    server.stop().await;
    Ok(())
}
