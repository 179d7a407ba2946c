use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blink_config::ConfigLoader;
use blink_core::LifecycleManager;
use blink_network::{create_network, ConfirmationPoller, NetworkService, PollerConfig};
use blink_storage::{create_storage, StorageService};
use blink_types::BlinkEvent;

mod api;

#[derive(Parser)]
#[command(name = "blink-service")]
#[command(about = "Blink Engine Service", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "BLINK_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the blink service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("Starting Blink Engine Service");
	info!("Loading configuration from: {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	info!("Configuration loaded successfully");
	info!("Service name: {}", config.service.name);
	info!("HTTP port: {}", config.service.http_port);

	// Wire up the lifecycle stack from configuration
	let storage_config = toml::Value::try_from(&config.storage)
		.context("Failed to serialize storage configuration")?;
	let storage = Arc::new(
		StorageService::new(create_storage(&storage_config)?)
			.with_max_page_size(config.api.max_page_size),
	);

	let network_config = toml::Value::try_from(&config.network)
		.context("Failed to serialize network configuration")?;
	let network = Arc::new(NetworkService::new(create_network(&network_config)));

	let poller = Arc::new(ConfirmationPoller::new(
		network,
		PollerConfig {
			poll_interval: config.poller.poll_interval(),
			timeout: config.poller.timeout(),
			max_consecutive_failures: config.poller.max_consecutive_failures,
		},
	));

	let manager = LifecycleManager::new(
		Arc::new(blink_builder::BuilderService::default()),
		storage.clone(),
		poller,
	);

	// Settle anything a previous process left pending
	let resumed = manager
		.resume_pending()
		.await
		.context("Failed to resume pending blinks")?;
	info!(resumed, "pending blink watchers registered");

	// Log lifecycle events for observability
	let mut events = manager.subscribe();
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			match event {
				BlinkEvent::Submitted { blink } => {
					info!(blink_id = %blink.id, kind = %blink.kind, "event: blink submitted")
				}
				BlinkEvent::Completed { blink_id } => {
					info!(blink_id = %blink_id, "event: blink completed")
				}
				BlinkEvent::Failed { blink_id, reason } => {
					info!(blink_id = %blink_id, %reason, "event: blink failed")
				}
			}
		}
	});

	let http_port = config.service.http_port;
	let app_state = api::AppState::new(storage);
	let http_handle = tokio::spawn(async move { api::start_http_server(app_state, http_port).await });

	info!("Blink Engine Service started successfully");

	setup_shutdown_signal().await;

	info!("Shutdown signal received, stopping services...");
	http_handle.abort();
	info!("Blink Engine Service stopped");

	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	info!("Configuration is valid");
	info!("Service name: {}", config.service.name);
	info!("Network endpoint: {}", config.network.rpc_url);
	info!("Storage backend: {}", config.storage.backend);
	info!(
		"Poller: every {}s, timeout {}s",
		config.poller.poll_interval_secs, config.poller.timeout_secs
	);

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
