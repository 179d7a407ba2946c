//! Network status queries and confirmation polling.
//!
//! The lifecycle manager never talks to a chain endpoint directly; it goes
//! through the `NetworkInterface` capability, and the confirmation poller
//! turns repeated status queries into a single terminal outcome.

use async_trait::async_trait;
use thiserror::Error;

use blink_types::NetworkSignature;

/// Re-export implementations
pub mod implementations {
	pub mod rpc;
}

pub mod poller;

pub use poller::{ConfirmationPoller, PollerConfig, SettlementOutcome};

/// Status of a submitted transaction as reported by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
	/// Known to the network but not yet final.
	Pending,
	/// The network guarantees the transaction will not be reverted.
	Finalized,
	/// The network rejected the transaction.
	Rejected,
}

#[derive(Debug, Error)]
pub enum NetworkError {
	/// The query could not be completed (connectivity, endpoint outage).
	#[error("rpc error: {0}")]
	Rpc(String),
	/// The endpoint answered with something unintelligible.
	#[error("invalid response: {0}")]
	InvalidResponse(String),
}

/// Trait defining the network status query capability.
#[async_trait]
pub trait NetworkInterface: Send + Sync {
	async fn get_status(&self, signature: &NetworkSignature) -> Result<TxStatus, NetworkError>;
}

/// Service wrapper over a network backend.
pub struct NetworkService {
	backend: Box<dyn NetworkInterface>,
}

impl NetworkService {
	pub fn new(backend: Box<dyn NetworkInterface>) -> Self {
		Self { backend }
	}

	pub async fn get_status(
		&self,
		signature: &NetworkSignature,
	) -> Result<TxStatus, NetworkError> {
		self.backend.get_status(signature).await
	}
}

/// Factory function to create a network backend from configuration.
///
/// Configuration parameters:
/// - `rpc_url`: JSON-RPC endpoint (default: devnet)
pub fn create_network(config: &toml::Value) -> Box<dyn NetworkInterface> {
	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.unwrap_or("https://api.devnet.solana.com")
		.to_string();

	Box::new(implementations::rpc::RpcNetwork::new(rpc_url))
}
