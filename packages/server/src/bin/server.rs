//! TypeFast realtime relay and HTTP API server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin typefast-server
//! cargo run --bin typefast-server -- --host 0.0.0.0 --port 3000 --max-subscribers 16
//! ```

use clap::Parser;
use typefast_server::ui::{AppState, Server};
use typefast_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "typefast-server")]
#[command(about = "TypeFast realtime relay (broadcast + presence) and HTTP API", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Maximum number of subscribers per topic
    #[arg(long, default_value = "32")]
    max_subscribers: usize,
}

#[tokio::main]
async fn main() {
    setup_logger("typefast_server", env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    tracing::info!(
        "Starting with up to {} subscribers per topic",
        args.max_subscribers
    );

    let server = Server::new(AppState::in_memory(args.max_subscribers));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
