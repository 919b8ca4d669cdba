use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use huddle::server::{
    AppState, OpenAdmission, RoomRegistry, TransportConfig, serve as serve_signaling,
};

#[derive(Parser)]
#[command(name = "huddle", version, about = "WebRTC signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "HUDDLE_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Room used when a client connects without `roomId`.
    #[arg(long, env = "HUDDLE_DEFAULT_ROOM", default_value = "lobby")]
    default_room: String,

    #[arg(long, env = "HUDDLE_QUEUE_CAPACITY", default_value_t = 1024)]
    queue_capacity: usize,

    #[arg(long, env = "HUDDLE_PONG_WAIT_SECS", default_value_t = 60)]
    pong_wait_secs: u64,

    #[arg(long, env = "HUDDLE_MAX_MESSAGE_SIZE", default_value_t = 64 * 1024)]
    max_message_size: usize,

    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl ServeArgs {
    fn transport_config(&self) -> TransportConfig {
        TransportConfig::default()
            .with_queue_capacity(self.queue_capacity)
            .with_pong_wait(Duration::from_secs(self.pong_wait_secs.max(1)))
            .with_max_message_size(self.max_message_size)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
    }
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Invalid log level")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<()> {
    init_tracing(&args.log_level)?;

    let config = args.transport_config();
    let state = Arc::new(AppState::new(
        RoomRegistry::new(),
        Arc::new(OpenAdmission::new(args.default_room.as_str())),
        config.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    println!("{}", "📡 Huddle signaling server".green().bold());
    println!("   🔌 WebSocket: ws://{}/ws?roomId=<room>&username=<name>", args.bind);
    println!("   🏠 Default room: {}", args.default_room.cyan());
    info!(
        queue_capacity = config.queue_capacity,
        ping_period = ?config.ping_period(),
        "Signaling server listening on http://{}",
        args.bind
    );

    serve_signaling(listener, state)
        .await
        .context("Server terminated")
}
