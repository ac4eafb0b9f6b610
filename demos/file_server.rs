//! Serve the local filesystem over HTTP.
//!
//! Run with: cargo run --example file_server

use webfs_rs::{HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ServerConfig {
        addr: "127.0.0.1:7777".parse()?,
        ..ServerConfig::default()
    };
    let server = HttpServer::new(config);
    let addr = server.start().await?;
    println!("browse files at http://{addr}/file");
    println!("press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    server.stop().await;
    Ok(())
}
