//! Configuration loading for the Blink engine.
//!
//! TOML files with `${VAR}` environment substitution, a small set of
//! `BLINK_`-prefixed environment overrides, and validation of the polling
//! bounds before the service starts.

use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod types;

pub use types::{
	ApiConfig, BlinkConfig, NetworkConfig, PollerSettings, ServiceConfig, StorageConfig,
};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "BLINK_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<BlinkConfig, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config)?;
		Self::validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<BlinkConfig, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;
		let substituted_content = self.substitute_env_vars(&content)?;

		let config: BlinkConfig = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}")
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value =
				env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut BlinkConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!("Overriding log level from environment");
			config.service.log_level = log_level;
		}

		if let Ok(http_port) = env::var(format!("{}HTTP_PORT", self.env_prefix)) {
			config.service.http_port = http_port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		if let Ok(rpc_url) = env::var(format!("{}RPC_URL", self.env_prefix)) {
			debug!("Overriding RPC URL from environment");
			config.network.rpc_url = rpc_url;
		}

		Ok(())
	}

	fn validate_config(config: &BlinkConfig) -> Result<(), ConfigError> {
		if config.poller.poll_interval_secs == 0 {
			return Err(ConfigError::ValidationError(
				"Poll interval must be greater than zero".to_string(),
			));
		}

		if config.poller.timeout_secs < config.poller.poll_interval_secs {
			return Err(ConfigError::ValidationError(
				"Confirmation timeout must be at least one poll interval".to_string(),
			));
		}

		if !matches!(config.storage.backend.as_str(), "memory" | "file") {
			return Err(ConfigError::ValidationError(format!(
				"Unknown storage backend: {}",
				config.storage.backend
			)));
		}

		if config.api.max_page_size == 0 {
			return Err(ConfigError::ValidationError(
				"API max page size must be greater than zero".to_string(),
			));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn write_config(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[tokio::test]
	async fn test_load_full_config() {
		let file = write_config(
			r#"
[service]
name = "blink-engine-test"
log_level = "debug"
http_port = 9090

[network]
rpc_url = "https://api.mainnet-beta.solana.com"

[poller]
poll_interval_secs = 2
timeout_secs = 60
max_consecutive_failures = 3

[storage]
backend = "file"
path = "./data/blinks"

[api]
max_page_size = 50
"#,
		);

		let config = ConfigLoader::new().with_file(file.path()).load().await.unwrap();
		assert_eq!(config.service.name, "blink-engine-test");
		assert_eq!(config.service.http_port, 9090);
		assert_eq!(config.network.rpc_url, "https://api.mainnet-beta.solana.com");
		assert_eq!(config.poller.poll_interval().as_secs(), 2);
		assert_eq!(config.storage.backend, "file");
		assert_eq!(config.api.max_page_size, 50);
	}

	#[tokio::test]
	async fn test_defaults_fill_missing_sections() {
		let file = write_config("[service]\nname = \"minimal\"\n");

		let config = ConfigLoader::new().with_file(file.path()).load().await.unwrap();
		assert_eq!(config.service.name, "minimal");
		assert_eq!(config.service.log_level, "info");
		assert_eq!(config.poller.timeout_secs, 120);
		assert_eq!(config.storage.backend, "memory");
	}

	#[tokio::test]
	async fn test_env_substitution() {
		std::env::set_var("BLINK_TEST_RPC", "https://rpc.example.com");
		let file = write_config("[network]\nrpc_url = \"${BLINK_TEST_RPC}\"\n");

		let config = ConfigLoader::new().with_file(file.path()).load().await.unwrap();
		assert_eq!(config.network.rpc_url, "https://rpc.example.com");
	}

	#[tokio::test]
	async fn test_missing_env_var_is_an_error() {
		let file = write_config("[network]\nrpc_url = \"${BLINK_TEST_UNSET_VAR}\"\n");

		let err = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(_)));
	}

	#[tokio::test]
	async fn test_zero_poll_interval_rejected() {
		let file = write_config("[poller]\npoll_interval_secs = 0\n");

		let err = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	async fn test_timeout_shorter_than_interval_rejected() {
		let file = write_config("[poller]\npoll_interval_secs = 30\ntimeout_secs = 10\n");

		let err = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	async fn test_unknown_backend_rejected() {
		let file = write_config("[storage]\nbackend = \"postgres\"\n");

		let err = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}
}
