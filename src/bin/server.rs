//! gdbmock Server Binary
//!
//! Serves one debugger session with the default handler, then optionally
//! writes the packet log.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use gdbmock::{Config, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// Mock GDB remote server
#[derive(Parser, Debug)]
#[command(name = "gdbmock-server")]
#[command(about = "Mock GDB Remote Serial Protocol server for debugger tests")]
#[command(version)]
struct Args {
    /// Listen address (host:port, port 0 picks a free port)
    #[arg(short, long, default_value = "127.0.0.1:0")]
    listen: String,

    /// Give up if no client connects within this many milliseconds (0 = wait forever)
    #[arg(short, long, default_value = "0")]
    accept_timeout_ms: u64,

    /// Write every received command to this file when the session ends
    #[arg(short, long)]
    packet_log: Option<PathBuf>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gdbmock=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("gdbmock server v{}", gdbmock::VERSION);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .accept_timeout_ms(args.accept_timeout_ms)
        .build();

    let mut server = Server::new(config);
    if let Err(e) = server.start() {
        tracing::error!("Failed to start server: {}", e);
        std::process::exit(1);
    }

    if let Some(url) = server.url() {
        // Printed on stdout so scripts can pick up the ephemeral port
        println!("{}", url);
    }

    if let Err(e) = server.wait() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    let log = server.packet_log();
    tracing::info!("Session ended after {} packets", log.len());

    if let Some(path) = args.packet_log {
        let result = File::create(&path)
            .map_err(gdbmock::MockError::from)
            .and_then(|file| log.write_to(&mut BufWriter::new(file)));
        if let Err(e) = result {
            tracing::error!("Failed to write packet log to {}: {}", path.display(), e);
            std::process::exit(1);
        }
        tracing::info!("Packet log written to {}", path.display());
    }
}
