//! # pairlink
//!
//! CLI tool for pairing two devices over a pairlink relay.
//!
//! ## Commands
//!
//! - `init`: Create the local pairing (role + shared secret)
//! - `setup`: Provision both queues of the pairing
//! - `send`: Encrypt and enqueue a message for the peer
//! - `read`: Receive, decrypt and print one batch of messages
//! - `endpoint`: Register or clear the push endpoint
//!
//! ## Example
//!
//! ```bash
//! # On the host
//! pairlink init --role initiator
//! pairlink setup
//! pairlink send "Hello, device!" --alert "New message"
//!
//! # On the device, with the secret printed by the host
//! pairlink init --role responder --secret <hex>
//! pairlink read
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pairlink_core::PairingRole;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod notifier;

use commands::{endpoint, init, read, send, setup};

/// CLI tool for pairing two devices over a pairlink relay.
#[derive(Parser, Debug)]
#[command(name = "pairlink")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the pairing file and default queue database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Relay configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the local pairing
    Init {
        /// Role of this device in the pairing
        #[arg(long, short)]
        role: PairingRole,

        /// Hex-encoded shared secret from the peer (generated if omitted)
        #[arg(long, short)]
        secret: Option<String>,
    },

    /// Provision both queues of the pairing
    Setup,

    /// Send a message to the peer
    Send {
        /// Message to send
        message: String,

        /// Show this text in a user-visible notification
        #[arg(long, short)]
        alert: Option<String>,
    },

    /// Read one batch of messages from the peer
    Read,

    /// Register or clear the push endpoint
    Endpoint {
        /// Push endpoint handle (webhook URL)
        #[arg(conflicts_with = "clear", required_unless_present = "clear")]
        handle: Option<String>,

        /// Remove the registered endpoint
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    let relay_config = cli.config.as_deref();

    match cli.command {
        Commands::Init { role, secret } => {
            init::run(&data_dir, role, secret.as_deref()).await?;
        }
        Commands::Setup => {
            setup::run(&data_dir, relay_config).await?;
        }
        Commands::Send { message, alert } => {
            send::run(&data_dir, relay_config, message.as_bytes(), alert.as_deref()).await?;
        }
        Commands::Read => {
            read::run(&data_dir, relay_config).await?;
        }
        Commands::Endpoint { handle, clear } => {
            let handle = if clear { None } else { handle };
            endpoint::run(&data_dir, handle.as_deref()).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for pairlink.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "pairlink")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
