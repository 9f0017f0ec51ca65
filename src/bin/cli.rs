//! gdbmock CLI Client
//!
//! Sends raw RSP commands to a server and prints the replies.

use clap::Parser;
use gdbmock::Client;
use tracing_subscriber::{fmt, EnvFilter};

/// gdbmock CLI
#[derive(Parser, Debug)]
#[command(name = "gdbmock-cli")]
#[command(about = "Send raw GDB remote protocol commands")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:1234")]
    server: String,

    /// Negotiate QStartNoAckMode before sending the commands
    #[arg(long)]
    no_ack: bool,

    /// Commands to send, e.g. `qSupported:swbreak+` `g` `m1000,4`
    #[arg(required = true)]
    commands: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> gdbmock::Result<()> {
    let mut client = Client::connect(&args.server)?;
    client.send_ack()?;

    if args.no_ack {
        let reply = client.start_no_ack_mode()?;
        println!("QStartNoAckMode -> {}", reply);
    }

    for command in &args.commands {
        let reply = client.request(command)?;
        println!("{} -> {}", command, reply);
    }

    Ok(())
}
