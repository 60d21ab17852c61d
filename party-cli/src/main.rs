use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use party_client::{
    LivenessConfig, PartyClient, PartyConfig, PartyEvent, RtcConnectionFactory, TransportConfig,
    WsRelay,
};
use party_core::PartyCode;
use party_core::utils::DEFAULT_RELAY_URL;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "party", about = "Host or join a peer-to-peer party")]
struct Cli {
    /// Relay server used for codes and signaling.
    #[arg(long, default_value = DEFAULT_RELAY_URL)]
    relay: String,

    /// STUN server URL; repeat for several.
    #[arg(long)]
    stun: Vec<String>,

    #[arg(long, default_value_t = 1000)]
    probe_interval_ms: u64,

    #[arg(long, default_value_t = 3000)]
    open_grace_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new party and print its code.
    Host,

    /// Join an existing party; prompts for the code when omitted.
    Join { code: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let transport = if cli.stun.is_empty() {
        TransportConfig::default()
    } else {
        TransportConfig::with_stun(cli.stun)
    };
    let config = PartyConfig {
        transport: transport.clone(),
        liveness: LivenessConfig {
            probe_interval: Duration::from_millis(cli.probe_interval_ms),
            open_grace: Duration::from_millis(cli.open_grace_ms),
        },
    };

    info!("Connecting to relay {}", cli.relay);
    let (relay, relay_rx) = WsRelay::connect(&cli.relay)
        .await
        .with_context(|| format!("Failed to reach relay at {}", cli.relay))?;

    let (client, events) = PartyClient::spawn(
        config,
        Arc::new(relay),
        relay_rx,
        Arc::new(RtcConnectionFactory::new(transport)),
    );

    match cli.command {
        Commands::Host => {
            println!("{}", "🚀 Creating a party...".green().bold());
            client.host_party().await?;
        }
        Commands::Join { code } => {
            let code = match code {
                Some(code) => code,
                None => Input::new()
                    .with_prompt("Party code")
                    .interact_text()
                    .context("Failed to read party code")?,
            };
            let code = PartyCode::parse(&code).context("Party code cannot be blank")?;
            println!("{} {}", "🔗 Joining party".cyan(), code.to_string().bold());
            client.join_party(code).await?;
        }
    }

    run_chat(client, events).await
}

/// Prints party events and broadcasts each stdin line until the party ends.
async fn run_chat(client: PartyClient, mut events: mpsc::UnboundedReceiver<PartyEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                let ended = matches!(event, PartyEvent::PartyLeft | PartyEvent::JoinFailed { .. });
                print_event(&event);
                if ended {
                    break;
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    let _ = client.leave_party().await;
                    break;
                };
                match line.trim() {
                    "" => {}
                    "/quit" | "/leave" => {
                        if let Err(e) = client.leave_party().await {
                            warn!("Leave failed: {}", e);
                        }
                    }
                    "/peers" => print_peers(&client).await?,
                    text => match client.broadcast(text).await {
                        Ok(0) => println!("{}", "(nobody is connected yet)".dimmed()),
                        Ok(_) => {}
                        Err(e) => warn!("Broadcast failed: {}", e),
                    },
                }
            }
        }
    }

    Ok(())
}

async fn print_peers(client: &PartyClient) -> Result<()> {
    let snapshot = client.snapshot().await?;
    if snapshot.peers.is_empty() {
        println!("{}", "No peers".dimmed());
    }
    for peer in snapshot.peers {
        println!(
            "   {} {} channel {} {}",
            peer.peer_id.to_string().bold(),
            peer.role,
            peer.channel_id,
            peer.state.to_string().cyan()
        );
    }
    Ok(())
}

fn print_event(event: &PartyEvent) {
    match event {
        PartyEvent::PartyHosted { code } => {
            println!("{} {}", "✨ Party code:".green().bold(), code.to_string().bold());
        }
        PartyEvent::JoinFailed { code } => {
            println!("{} {}", "❌ No party with code".red().bold(), code);
        }
        PartyEvent::Joined { code, host_id } => {
            println!("{} {} (host {})", "✨ Joined party".green().bold(), code, host_id);
        }
        PartyEvent::PeerAdded { peer_id, role } => {
            println!("{} {} ({})", "📡 Connecting to".cyan(), peer_id, role);
        }
        PartyEvent::PeerConnected { peer_id } => {
            println!("{} {}", ">>>".green(), format!("{peer_id} connected").green());
        }
        PartyEvent::PeerClosed { peer_id, reason } => {
            println!("{} {} ({})", "<<<".yellow(), peer_id, reason);
        }
        PartyEvent::Message { from, text } => {
            println!("[{}]: {}", from.to_string().bold(), text);
        }
        PartyEvent::ConnectionError { peer_id, reason } => {
            println!("{} {}: {}", "⚠️  Connection error with".red(), peer_id, reason);
        }
        PartyEvent::PartyLeft => {
            println!("{}", "👋 Left the party".yellow().bold());
        }
    }
}
