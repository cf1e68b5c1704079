use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Input;
use std::sync::Arc;
use url::Url;

use lilycall_core::Role;
use lilycall_engine::media::SyntheticDevices;
use lilycall_engine::session::{SessionBuilder, SessionEvent};
use lilycall_engine::signaling::HttpSignaling;
use lilycall_engine::transport::RtcPeerFactory;
use lilycall_engine::SessionConfig;

#[derive(Parser)]
#[command(name = "lilycall")]
#[command(about = "Headless probe client for lilycall video rooms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a booking's room with synthetic media and report call events.
    Probe {
        /// API root, e.g. https://api.example.com/api/
        #[arg(long)]
        api_base: String,

        /// Booking to resolve the room from.
        #[arg(long)]
        booking: String,

        /// Bearer token for the platform API.
        #[arg(long)]
        token: Option<String>,

        /// Which side of the booking this probe plays.
        #[arg(long, value_enum, default_value_t = Side::Coach)]
        side: Side,

        /// Display name announced to the room.
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    Coach,
    Client,
}

impl Side {
    fn role(self) -> Role {
        // The booking client is the polite side.
        match self {
            Side::Coach => Role::Impolite,
            Side::Client => Role::Polite,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Probe {
            api_base,
            booking,
            token,
            side,
            name,
        } => probe(api_base, booking, token, side, name).await,
    }
}

async fn probe(
    api_base: String,
    booking: String,
    token: Option<String>,
    side: Side,
    name: Option<String>,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Display name")
            .default("Probe".to_owned())
            .interact_text()?,
    };

    let base = Url::parse(&api_base).context("invalid --api-base url")?;
    let mut api = HttpSignaling::new(base);
    if let Some(token) = token {
        api = api.with_token(token);
    }

    println!("{}", "📡 Resolving video room...".cyan());
    let room = api
        .room_for_booking(&booking.as_str().into())
        .await
        .context("room resolution failed")?;
    println!(
        "   room {} ({} session)",
        room.room_id.to_string().bold(),
        room.session_type
    );

    let config = SessionConfig::new(side.role(), &name);
    let peers = Arc::new(RtcPeerFactory::new(config.ice_servers.clone()));
    let devices = Arc::new(SyntheticDevices::new());

    let (handle, mut events) = SessionBuilder::new(config, Arc::new(api.clone()), devices, peers)
        .telemetry(Arc::new(api))
        .start(room)
        .await
        .context("session failed to start")?;

    println!(
        "{}",
        format!("🔭 Probing as {name}, Ctrl-C to leave").green().bold()
    );

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SessionEvent::Connected) => {
                    println!("{}", "✅ Peer connection established".green());
                }
                Some(SessionEvent::RemoteConnected(true)) => {
                    println!("{}", "👋 Remote participant is here".green());
                }
                Some(SessionEvent::RemoteConnected(false)) => {
                    println!("{}", "⏳ Waiting for the other participant...".yellow());
                }
                Some(SessionEvent::RemoteTrack { kind, id }) => {
                    println!("   receiving {} track {}", kind.as_str(), id.dimmed());
                }
                Some(SessionEvent::RemoteScreenShare(active)) => {
                    let label = if active { "🖥  Remote screen share started" } else { "🖥  Remote screen share stopped" };
                    println!("{}", label.cyan());
                }
                Some(SessionEvent::Ended) | None => {
                    println!("{}", "📴 Session ended".red());
                    break;
                }
                Some(_) => {}
            },
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "🚪 Leaving the room...".yellow());
                handle.hang_up().await;
            }
        }
    }

    Ok(())
}
