// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! relay - operator CLI for the message gateway core.
//!
//! Resolves channels, fetches attachments and classifies opt-out text
//! against the configured SQLite system of record.

mod commands;
mod runtime;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relay_config::RelayConfig;
use relay_core::{ExpectedType, MsgId};
use relay_media::FetchAttachmentRequest;
use serde::Serialize;

use crate::commands::ResolveTarget;
use crate::runtime::Runtime;

/// relay - message gateway core.
#[derive(Parser, Debug)]
#[command(name = "relay", version, about, long_about = None)]
struct Cli {
    /// Load this configuration file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the channel owning a UUID, an address or a message.
    Resolve {
        /// Expected channel type, or "any".
        #[arg(long = "type", default_value = "any")]
        channel_type: String,
        #[arg(long, group = "target")]
        uuid: Option<String>,
        #[arg(long, group = "target")]
        address: Option<String>,
        #[arg(long)]
        msg_id: Option<i64>,
        #[arg(long)]
        external_id: Option<String>,
    },
    /// Download an attachment for a channel and store it.
    FetchAttachment {
        channel_type: String,
        channel_uuid: String,
        url: String,
        #[arg(long)]
        msg_id: Option<i64>,
    },
    /// Check whether text asks to stop receiving messages.
    OptOut { text: String },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => relay_config::load_and_validate_path(path),
        None => relay_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            relay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.gateway.log_level);

    if let Err(message) = run(cli.command, config).await {
        eprintln!("relay: {message}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: RelayConfig) -> Result<(), String> {
    match command {
        Commands::Config => {
            let rendered = commands::run_config(&config).map_err(|e| e.to_string())?;
            print!("{rendered}");
            Ok(())
        }
        Commands::OptOut { text } => print_json(&commands::run_opt_out(&config, &text)),
        Commands::Resolve {
            channel_type,
            uuid,
            address,
            msg_id,
            external_id,
        } => {
            let target = resolve_target(uuid, address, msg_id, external_id)?;
            let runtime = start(config).await?;
            let result =
                commands::run_resolve(&runtime, &ExpectedType::from(channel_type.as_str()), target)
                    .await;
            runtime.shutdown().await.map_err(|e| e.to_string())?;
            print_json(result.map_err(|e| e.to_string())?.as_ref())
        }
        Commands::FetchAttachment {
            channel_type,
            channel_uuid,
            url,
            msg_id,
        } => {
            let request = FetchAttachmentRequest {
                channel_type: channel_type.as_str().into(),
                channel_uuid,
                url,
                msg_id: msg_id.map(MsgId),
            };
            let runtime = start(config).await?;
            let result = commands::run_fetch_attachment(&runtime, request).await;
            runtime.shutdown().await.map_err(|e| e.to_string())?;
            match result {
                Ok(response) => print_json(&response),
                Err(e) => Err(match e.log_uuid {
                    Some(log_uuid) => format!("{} (channel log {log_uuid})", e.error),
                    None => e.error.to_string(),
                }),
            }
        }
    }
}

fn resolve_target(
    uuid: Option<String>,
    address: Option<String>,
    msg_id: Option<i64>,
    external_id: Option<String>,
) -> Result<ResolveTarget, String> {
    match (uuid, address) {
        (Some(uuid), None) => Ok(ResolveTarget::Uuid(uuid)),
        (None, Some(address)) => Ok(ResolveTarget::Address(address)),
        (None, None) if msg_id.is_some() || external_id.is_some() => Ok(ResolveTarget::Message {
            msg_id: msg_id.map(MsgId),
            external_id,
        }),
        _ => Err("pass exactly one of --uuid, --address or --msg-id/--external-id".to_string()),
    }
}

async fn start(config: RelayConfig) -> Result<Runtime, String> {
    Runtime::start(config).await.map_err(|e| e.to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

const CRATES: &[&str] = &[
    "relay",
    "relay_audit",
    "relay_channels",
    "relay_config",
    "relay_core",
    "relay_media",
    "relay_optout",
    "relay_storage",
];

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives: Vec<String> = CRATES
            .iter()
            .map(|krate| format!("{krate}={log_level}"))
            .collect();
        directives.push("warn".to_string());
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();

    relay_channels::recording::describe_metrics();
    relay_audit::recording::describe_metrics();
    relay_media::recording::describe_metrics();
}
