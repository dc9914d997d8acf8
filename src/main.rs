//! `fruitpi`: operator CLI for the fruit-pi device provider.
//!
//! ```text
//! fruitpi [--config provider.toml] [--server-url URL] [--token JWT] <command>
//!
//!   device create --name N --config JSON
//!   device read <uuid>
//!   device update <uuid> --name N --config JSON
//!   device delete <uuid>
//!   token <uuid>
//!   self-config
//!   reading --temperature T --humidity H
//! ```
//!
//! Results are printed as JSON on stdout, logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use fruitpi_provider::api::{ApiClient, DeviceApi, Measurement};
use fruitpi_provider::config::{finalize, parse_config, ProviderConfig};
use fruitpi_provider::observability::init_logging;
use fruitpi_provider::reconciler::{
    Attributes, DeviceState, DeviceTokenState, ProviderContext,
};

#[derive(Parser)]
#[command(name = "fruitpi")]
#[command(about = "Manage fruit-pi devices", long_about = None)]
struct Cli {
    /// Provider config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device-management server URL
    #[arg(long, env = "FRUIT_PI_SERVER_URL")]
    server_url: Option<String>,

    /// Admin bearer token
    #[arg(long, env = "FRUIT_PI_ADMIN_JWT", hide_env_values = true)]
    token: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage a device resource
    #[command(subcommand)]
    Device(DeviceCommand),
    /// Look up a device's token
    Token { device_uuid: String },
    /// Show the config of the device the token belongs to
    SelfConfig,
    /// Record a sensor reading
    Reading {
        #[arg(long, allow_hyphen_values = true)]
        temperature: Measurement,
        #[arg(long)]
        humidity: Measurement,
    },
}

#[derive(Subcommand)]
enum DeviceCommand {
    /// Register a new device
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        config: Option<String>,
    },
    /// Read a device
    Read { device_uuid: String },
    /// Overwrite a device's name and config
    Update {
        device_uuid: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        config: Option<String>,
    },
    /// Forget a device locally; it stays registered on the server
    Delete { device_uuid: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => parse_config(path)?,
        None => ProviderConfig::default(),
    };
    if let Some(url) = cli.server_url {
        config.server_url = url;
    }
    if let Some(token) = cli.token {
        config.token = token;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    let config = finalize(config)?;

    init_logging(&config.observability)?;
    tracing::debug!(server_url = %config.normalized_server_url(), "Configuration loaded");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight request");
            on_signal.cancel();
        }
    });

    let client = ApiClient::from_config(&config)?.with_cancellation(cancel);
    let ctx = ProviderContext::new(client);

    match cli.command {
        Commands::Device(DeviceCommand::Create { name, config }) => {
            let mut state = DeviceState::from_attributes(None, &attributes(name, config))?;
            ctx.devices().create(&mut state).await?;
            print_json(&state)?;
        }
        Commands::Device(DeviceCommand::Read { device_uuid }) => {
            let mut state = DeviceState {
                id: Some(device_uuid),
                ..Default::default()
            };
            ctx.devices().read(&mut state).await?;
            print_json(&state)?;
        }
        Commands::Device(DeviceCommand::Update {
            device_uuid,
            name,
            config,
        }) => {
            let mut state =
                DeviceState::from_attributes(Some(device_uuid), &attributes(name, config))?;
            ctx.devices().update(&mut state).await?;
            print_json(&state)?;
        }
        Commands::Device(DeviceCommand::Delete { device_uuid }) => {
            let mut state = DeviceState {
                id: Some(device_uuid),
                ..Default::default()
            };
            ctx.devices().delete(&mut state);
            print_json(&state)?;
        }
        Commands::Token { device_uuid } => {
            let mut state = DeviceTokenState::new(device_uuid);
            ctx.device_tokens().read(&mut state).await?;
            print_json(&state)?;
        }
        Commands::SelfConfig => {
            let device = ctx.api().get_device_config().await?;
            print_json(&device)?;
        }
        Commands::Reading {
            temperature,
            humidity,
        } => {
            let reading = ctx.api().insert_reading(&temperature, &humidity).await?;
            print_json(&reading)?;
        }
    }

    Ok(())
}

fn attributes(name: Option<String>, config: Option<String>) -> Attributes {
    let mut attributes = Attributes::new();
    if let Some(name) = name {
        attributes.insert("name".to_string(), name);
    }
    if let Some(config) = config {
        attributes.insert("config".to_string(), config);
    }
    attributes
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
