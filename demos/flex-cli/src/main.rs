//! Thin example binary wiring `flex-client` + `flex-session` together:
//! discover radios, connect to one, and tune a slice.
//!
//! Grounded on `cat-desktop/src/main.rs`'s wiring of its multiplexer and
//! port scanner, stripped of every `eframe`/`egui` type. Uses `anyhow`
//! only at this `main` boundary, matching the library/binary error split
//! the rest of this workspace keeps.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use flex_client::Client;
use flex_discovery::DiscoveryEvent;

#[derive(Parser)]
#[command(name = "flex-cli", about = "Example client for FlexRadio SmartSDR radios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Listen for discovery beacons and print radios as they're seen.
    Discover {
        /// How long to listen before printing the final table and exiting.
        #[arg(long, default_value_t = 5)]
        seconds: u64,
    },
    /// Connect to a discovered radio and tune one of its slices.
    Tune {
        /// Serial number of the radio to connect to.
        #[arg(long)]
        serial: String,
        /// Slice id to tune (e.g. "0").
        #[arg(long, default_value = "0")]
        slice: String,
        /// Frequency to tune to, in MHz.
        #[arg(long)]
        freq_mhz: f64,
        /// How long to wait for radios to appear on the network first.
        #[arg(long, default_value_t = 3)]
        discover_seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Discover { seconds } => discover(seconds).await,
        Command::Tune { serial, slice, freq_mhz, discover_seconds } => {
            tune(&serial, &slice, freq_mhz, discover_seconds).await
        }
    }
}

async fn discover(seconds: u64) -> Result<()> {
    let mut client = Client::new();
    client.start_discovery().await.context("failed to start discovery")?;

    let mut events = client.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => {
                match event {
                    Ok(event) => print_discovery_event(&event),
                    Err(_) => break,
                }
            }
        }
    }

    println!("\n{} radio(s) known:", client.radios().await.len());
    for radio in client.radios().await {
        println!(
            "  {} — {} at {}:{} ({})",
            radio.serial, radio.model, radio.endpoint.host, radio.endpoint.port, radio.nickname
        );
    }

    client.stop_discovery().await;
    Ok(())
}

fn print_discovery_event(event: &DiscoveryEvent) {
    match event {
        DiscoveryEvent::Online(descriptor) => {
            println!("online:  {} ({} at {})", descriptor.serial, descriptor.model, descriptor.endpoint.host);
        }
        DiscoveryEvent::Change { descriptor, changed_fields, .. } => {
            println!("change:  {} ({:?})", descriptor.serial, changed_fields);
        }
        DiscoveryEvent::Offline { serial, .. } => {
            println!("offline: {serial}");
        }
    }
}

async fn tune(serial: &str, slice: &str, freq_mhz: f64, discover_seconds: u64) -> Result<()> {
    let mut client = Client::new();
    client.start_discovery().await.context("failed to start discovery")?;
    tokio::time::sleep(Duration::from_secs(discover_seconds)).await;

    let descriptor = client.radio(serial).await.with_context(|| format!("no radio with serial {serial} seen yet"))?;
    println!("connecting to {} at {}:{}...", descriptor.serial, descriptor.endpoint.host, descriptor.endpoint.port);

    let session = client.connect_descriptor(&descriptor).await.context("handshake failed")?;
    session.attach_data_plane().await.context("data plane attach failed")?;
    println!("ready, client_handle=0x{:08X}", session.client_handle());

    let outcome = session.slice(slice).set_frequency(freq_mhz).await.context("slice tune command failed")?;
    if !outcome.reply.code.is_accepted() {
        anyhow::bail!("radio rejected tune: {:#010x} {}", outcome.reply.code.0, outcome.reply.message);
    }
    println!("tune accepted (optimistic diff: {:?}), waiting for status broadcast...", outcome.optimistic_diff);

    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = session.snapshot().await.context("session gone")?;
    match snapshot.slices.get(&slice.to_string()) {
        Some(s) => println!("slice {slice}: {:.6} MHz, mode {:?}", s.frequency_mhz, s.mode),
        None => println!("slice {slice}: no status observed yet"),
    }

    session.disconnect().await;
    client.stop_discovery().await;
    Ok(())
}
