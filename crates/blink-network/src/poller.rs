//! Confirmation polling for submitted transactions.
//!
//! One poller task watches one signature: it queries the network at a fixed
//! interval until it observes a terminal status or the confirmation window
//! closes. Transient query failures are retried without extending the
//! window; a single failed query never resolves the outcome.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{NetworkService, TxStatus};
use blink_types::NetworkSignature;

/// Terminal outcome of watching a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
	/// Finality observed.
	Finalized,
	/// The network explicitly rejected the transaction.
	Rejected,
	/// The confirmation window closed with no terminal signal.
	Expired,
}

/// Polling bounds.
#[derive(Debug, Clone)]
pub struct PollerConfig {
	/// Interval between status queries.
	pub poll_interval: Duration,
	/// Overall confirmation window; expiry resolves to `Expired`.
	pub timeout: Duration,
	/// Consecutive query failures tolerated before giving up.
	pub max_consecutive_failures: u32,
}

impl Default for PollerConfig {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_secs(5),
			timeout: Duration::from_secs(120),
			max_consecutive_failures: 5,
		}
	}
}

/// Polls network status for submitted transactions.
pub struct ConfirmationPoller {
	network: Arc<NetworkService>,
	config: PollerConfig,
}

impl ConfirmationPoller {
	pub fn new(network: Arc<NetworkService>, config: PollerConfig) -> Self {
		Self { network, config }
	}

	/// Polls until the transaction settles or the window closes.
	///
	/// Always returns an outcome; network trouble surfaces as `Expired`
	/// (logged distinctly), never as an error.
	pub async fn poll_until_terminal(&self, signature: &NetworkSignature) -> SettlementOutcome {
		let started = Instant::now();
		let mut consecutive_failures = 0u32;

		loop {
			if started.elapsed() >= self.config.timeout {
				warn!(
					signature = %signature,
					elapsed_secs = started.elapsed().as_secs(),
					"confirmation window closed without a terminal signal"
				);
				return SettlementOutcome::Expired;
			}

			match self.network.get_status(signature).await {
				Ok(TxStatus::Finalized) => {
					debug!(signature = %signature, "transaction finalized");
					return SettlementOutcome::Finalized;
				}
				Ok(TxStatus::Rejected) => {
					debug!(signature = %signature, "transaction rejected by network");
					return SettlementOutcome::Rejected;
				}
				Ok(TxStatus::Pending) => {
					consecutive_failures = 0;
					debug!(signature = %signature, "transaction still pending");
				}
				Err(e) => {
					consecutive_failures += 1;
					if consecutive_failures >= self.config.max_consecutive_failures {
						warn!(
							signature = %signature,
							failures = consecutive_failures,
							"lost network visibility while watching transaction: {}",
							e
						);
						return SettlementOutcome::Expired;
					}
					debug!(
						signature = %signature,
						failures = consecutive_failures,
						"status query failed, will retry: {}",
						e
					);
				}
			}

			tokio::time::sleep(self.config.poll_interval).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{NetworkError, NetworkInterface};
	use async_trait::async_trait;
	use std::sync::atomic::{AtomicUsize, Ordering};

	/// Replays a scripted sequence of query results, repeating the last.
	struct ScriptedNetwork {
		script: Vec<Result<TxStatus, ()>>,
		calls: AtomicUsize,
	}

	impl ScriptedNetwork {
		fn new(script: Vec<Result<TxStatus, ()>>) -> Self {
			Self {
				script,
				calls: AtomicUsize::new(0),
			}
		}
	}

	#[async_trait]
	impl NetworkInterface for ScriptedNetwork {
		async fn get_status(
			&self,
			_signature: &NetworkSignature,
		) -> Result<TxStatus, NetworkError> {
			let call = self.calls.fetch_add(1, Ordering::SeqCst);
			let step = self.script.get(call).or_else(|| self.script.last());
			match step {
				Some(Ok(status)) => Ok(*status),
				_ => Err(NetworkError::Rpc("scripted failure".to_string())),
			}
		}
	}

	fn poller(script: Vec<Result<TxStatus, ()>>, config: PollerConfig) -> ConfirmationPoller {
		let network = Arc::new(NetworkService::new(Box::new(ScriptedNetwork::new(script))));
		ConfirmationPoller::new(network, config)
	}

	fn fast_config() -> PollerConfig {
		PollerConfig {
			poll_interval: Duration::from_millis(5),
			timeout: Duration::from_millis(500),
			max_consecutive_failures: 3,
		}
	}

	fn sig() -> NetworkSignature {
		NetworkSignature("sig123".to_string())
	}

	#[tokio::test]
	async fn test_finalized_after_pending() {
		let p = poller(
			vec![Ok(TxStatus::Pending), Ok(TxStatus::Pending), Ok(TxStatus::Finalized)],
			fast_config(),
		);
		assert_eq!(p.poll_until_terminal(&sig()).await, SettlementOutcome::Finalized);
	}

	#[tokio::test]
	async fn test_rejected() {
		let p = poller(vec![Ok(TxStatus::Rejected)], fast_config());
		assert_eq!(p.poll_until_terminal(&sig()).await, SettlementOutcome::Rejected);
	}

	#[tokio::test]
	async fn test_timeout_expires() {
		let config = PollerConfig {
			poll_interval: Duration::from_millis(5),
			timeout: Duration::from_millis(30),
			max_consecutive_failures: 3,
		};
		let p = poller(vec![Ok(TxStatus::Pending)], config);
		assert_eq!(p.poll_until_terminal(&sig()).await, SettlementOutcome::Expired);
	}

	#[tokio::test]
	async fn test_transient_failures_tolerated() {
		// Two blips, then finality; a single failure must never resolve
		// the outcome on its own
		let p = poller(
			vec![Err(()), Err(()), Ok(TxStatus::Finalized)],
			fast_config(),
		);
		assert_eq!(p.poll_until_terminal(&sig()).await, SettlementOutcome::Finalized);
	}

	#[tokio::test]
	async fn test_failure_counter_resets_on_success() {
		let p = poller(
			vec![
				Err(()),
				Err(()),
				Ok(TxStatus::Pending),
				Err(()),
				Err(()),
				Ok(TxStatus::Finalized),
			],
			fast_config(),
		);
		assert_eq!(p.poll_until_terminal(&sig()).await, SettlementOutcome::Finalized);
	}

	#[tokio::test]
	async fn test_persistent_failures_expire() {
		let p = poller(vec![Err(())], fast_config());
		assert_eq!(p.poll_until_terminal(&sig()).await, SettlementOutcome::Expired);
	}
}
