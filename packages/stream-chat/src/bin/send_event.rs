//! Send a custom event to a user, or an event on a channel.
//!
//! Reads `STREAM_KEY` / `STREAM_SECRET` (and optionally `STREAM_CHAT_URL`)
//! from the environment or a `.env` file.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use stream_chat::{Client, Event, RequestContext, UserCustomEvent};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "send-event")]
#[command(about = "Send Stream Chat events from the command line")]
struct Cli {
    /// Abort the request after this many seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a custom event to every connected client of a user
    User {
        target_user_id: String,
        #[arg(long = "type")]
        kind: String,
        /// Extra fields as a JSON object
        #[arg(long)]
        data: Option<String>,
    },

    /// Send an event on a channel as the given user
    Channel {
        channel_type: String,
        channel_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long = "type")]
        kind: String,
        /// Extra fields as a JSON object
        #[arg(long)]
        data: Option<String>,
    },
}

fn parse_data(data: Option<&str>) -> Result<serde_json::Map<String, Value>> {
    let Some(raw) = data else {
        return Ok(Default::default());
    };

    match serde_json::from_str(raw).context("--data must be valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("--data must be a JSON object"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stream_chat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let client = Client::from_env().context("Failed to load Stream Chat configuration")?;
    let ctx = RequestContext::new().with_timeout(Duration::from_secs(cli.timeout));

    let response = match cli.command {
        Commands::User {
            target_user_id,
            kind,
            data,
        } => {
            let mut event = UserCustomEvent::new(kind);
            event.extra_data = parse_data(data.as_deref())?;
            client
                .send_user_custom_event(&ctx, &target_user_id, Some(&event))
                .await?
        }
        Commands::Channel {
            channel_type,
            channel_id,
            user_id,
            kind,
            data,
        } => {
            let mut event = Event::new(kind);
            event.extra_data = parse_data(data.as_deref())?;
            client
                .channel(channel_type, channel_id)
                .send_event(&ctx, Some(&mut event), &user_id)
                .await?
        }
    };

    tracing::info!(duration = ?response.duration, "Event sent");
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
