use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use client_core::{config, ClientEvent, ConnectionStatus, VitalsClient};
use shared::{display, domain::VitalRecord};
use tracing::{info, warn};

mod render;

#[derive(Parser, Debug)]
#[command(about = "Real-time patient vitals monitoring dashboard")]
struct Args {
    /// Base URL of the vitals service, e.g. http://localhost:5001
    #[arg(long)]
    base_url: Option<String>,
    /// Seconds between stream reconnection attempts
    #[arg(long)]
    reconnect_seconds: Option<u64>,
    /// Seconds between quote rotations
    #[arg(long)]
    quote_seconds: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(seconds) = args.reconnect_seconds {
        settings.reconnect_delay = Duration::from_secs(seconds);
    }
    if let Some(seconds) = args.quote_seconds {
        settings.quote_interval = Duration::from_secs(seconds);
    }
    settings
        .parsed_base_url()
        .with_context(|| format!("invalid base url '{}'", settings.base_url))?;

    info!(base_url = settings.base_url, "starting vitals dashboard");
    let client = VitalsClient::new(settings);
    let mut events = client.subscribe_events();

    if let Err(err) = client.initialize().await {
        warn!(error = %err, "continuing without an initial snapshot");
    }
    client.connect().await;
    client.start_quote_rotation().await;

    let mut current_quote = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                client.shutdown().await;
                break;
            }
            event = events.recv() => match event {
                Ok(ClientEvent::WindowUpdated(window)) => {
                    render_dashboard(&window, current_quote.as_ref());
                }
                Ok(ClientEvent::QuoteChanged(quote)) => {
                    current_quote = Some(quote);
                    render_dashboard(&client.window().await, current_quote.as_ref());
                }
                Ok(ClientEvent::ConnectionStatusChanged(status)) => match status {
                    ConnectionStatus::Reconnecting => {
                        println!("-- connection lost, reconnecting --");
                    }
                    ConnectionStatus::Live => info!("vitals stream live"),
                    ConnectionStatus::Connecting => info!("connecting to vitals stream"),
                },
                Ok(ClientEvent::SnapshotFailed(message)) => {
                    println!("-- {message} --");
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "display fell behind the event stream");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

fn render_dashboard(window: &[VitalRecord], quote: Option<&client_core::quotes::Quote>) {
    println!();
    println!("PulseCare Health — {}", display::format_wall_clock(Local::now()));
    if let Some(quote) = quote {
        println!("\"{}\" — {}", quote.text, quote.author);
    }
    render::print_table(window);
}
