//! Configuration types for the Blink engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlinkConfig {
	#[serde(default)]
	pub service: ServiceConfig,
	#[serde(default)]
	pub network: NetworkConfig,
	#[serde(default)]
	pub poller: PollerSettings,
	#[serde(default)]
	pub storage: StorageConfig,
	#[serde(default)]
	pub api: ApiConfig,
}

/// Service-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
	#[serde(default = "default_service_name")]
	pub name: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	#[serde(default = "default_http_port")]
	pub http_port: u16,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			name: default_service_name(),
			log_level: default_log_level(),
			http_port: default_http_port(),
		}
	}
}

/// Network endpoint settings, handed to the network factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
	#[serde(default = "default_rpc_url")]
	pub rpc_url: String,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			rpc_url: default_rpc_url(),
		}
	}
}

/// Confirmation polling bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerSettings {
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	#[serde(default = "default_max_consecutive_failures")]
	pub max_consecutive_failures: u32,
}

impl PollerSettings {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

impl Default for PollerSettings {
	fn default() -> Self {
		Self {
			poll_interval_secs: default_poll_interval_secs(),
			timeout_secs: default_timeout_secs(),
			max_consecutive_failures: default_max_consecutive_failures(),
		}
	}
}

/// Storage backend settings, handed to the storage factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
	#[serde(default = "default_storage_backend")]
	pub backend: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: default_storage_backend(),
			path: None,
		}
	}
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
	#[serde(default = "default_max_page_size")]
	pub max_page_size: usize,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			max_page_size: default_max_page_size(),
		}
	}
}

fn default_service_name() -> String {
	"blink-engine".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_http_port() -> u16 {
	8080
}

fn default_rpc_url() -> String {
	"https://api.devnet.solana.com".to_string()
}

fn default_poll_interval_secs() -> u64 {
	5
}

fn default_timeout_secs() -> u64 {
	120
}

fn default_max_consecutive_failures() -> u32 {
	5
}

fn default_storage_backend() -> String {
	"memory".to_string()
}

fn default_max_page_size() -> usize {
	100
}
