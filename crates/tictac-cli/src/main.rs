//! `tictac` binary: run a server or play in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Serve on the default address (127.0.0.1:8080)
//! tictac serve
//!
//! # Serve on every interface, port 3000
//! tictac serve --port 3000
//!
//! # Join a running server
//! tictac play localhost 8080
//! ```

mod client;

use clap::{Parser, Subcommand};
use tictac::{GameServerBuilder, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Two-player tic-tac-toe over WebSockets
#[derive(Parser, Debug)]
#[command(name = "tictac")]
#[command(about = "Two-player tic-tac-toe server and terminal client")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the game server
    Serve {
        /// Full address to bind to
        #[arg(short, long, conflicts_with = "port")]
        bind: Option<String>,

        /// Port to listen on, on every interface
        #[arg(short, long)]
        port: Option<u16>,

        /// Capacity of the session command queue
        #[arg(long, default_value_t = ServerConfig::default().command_buffer)]
        command_buffer: usize,
    },

    /// Join a server and play from the terminal
    Play {
        /// Server host or URL (`localhost`, `http://host`, `ws://host`)
        url: String,

        /// Server port
        port: u16,
    },
}

/// Maps `serve` flags onto a [`ServerConfig`]. `--port` alone listens on
/// every interface.
fn server_config(bind: Option<String>, port: Option<u16>, command_buffer: usize) -> ServerConfig {
    let bind_addr = match (bind, port) {
        (Some(addr), _) => addr,
        (None, Some(port)) => format!("0.0.0.0:{port}"),
        (None, None) => ServerConfig::default().bind_addr,
    };
    ServerConfig {
        bind_addr,
        command_buffer,
        ..ServerConfig::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // Logs go to stderr so they never interleave with the board on stdout.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Command::Serve {
            bind,
            port,
            command_buffer,
        } => {
            let config = server_config(bind, port, command_buffer);
            tracing::info!(addr = %config.bind_addr, "starting tictac server");

            let server = GameServerBuilder::with_config(config).build().await?;
            tracing::info!("listening on {}", server.local_addr()?);
            server.run().await?;
        }
        Command::Play { url, port } => {
            let url = client::normalize_url(&url, port);
            client::play(&url).await?;
        }
    }

    Ok(())
}
