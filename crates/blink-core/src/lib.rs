//! Blink lifecycle management.
//!
//! The `LifecycleManager` owns the path from intent to settled record:
//! build the transaction, have the signer submit it, persist the pending
//! Blink once the network accepts it, then watch the signature until a
//! terminal outcome reconciles the record. A Blink record never exists for
//! a submission the network did not accept, and status moves forward only:
//! `pending` to `completed` or `failed`, never back.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use blink_builder::BuilderService;
use blink_network::{ConfirmationPoller, SettlementOutcome};
use blink_signer::{SignerError, SignerService};
use blink_storage::{StorageError, StorageService};
use blink_types::{
	Blink, BlinkEvent, BlinkId, BlinkIntent, BlinkStatus, EventBus, FailureReason, ValidationError,
};

/// Errors surfaced by `submit`, partitioned by who is at fault.
#[derive(Debug, Error)]
pub enum SubmitError {
	/// The intent itself is malformed; nothing was sent anywhere.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The signer declined or could not be reached; nothing was submitted.
	#[error("signer error: {0}")]
	Signer(SignerError),
	/// The network rejected the transaction at the submission endpoint.
	#[error("submission rejected: {0}")]
	Submission(String),
	/// The network accepted the transaction but the record write failed.
	/// The transaction may still settle on chain.
	#[error(transparent)]
	Storage(#[from] StorageError),
}

/// Orchestrates the full Blink lifecycle.
///
/// Cheap to clone; clones share all underlying services and the watcher
/// registry.
#[derive(Clone)]
pub struct LifecycleManager {
	builder: Arc<BuilderService>,
	storage: Arc<StorageService>,
	poller: Arc<ConfirmationPoller>,
	events: EventBus,
	/// Signatures currently being watched, to keep watchers idempotent.
	watchers: Arc<DashMap<BlinkId, ()>>,
}

impl LifecycleManager {
	pub fn new(
		builder: Arc<BuilderService>,
		storage: Arc<StorageService>,
		poller: Arc<ConfirmationPoller>,
	) -> Self {
		Self {
			builder,
			storage,
			poller,
			events: EventBus::new(1000),
			watchers: Arc::new(DashMap::new()),
		}
	}

	/// Subscribes to lifecycle events.
	pub fn subscribe(&self) -> broadcast::Receiver<BlinkEvent> {
		self.events.subscribe()
	}

	/// Takes an intent through build, sign-and-send, and persistence.
	///
	/// Returns the pending Blink once the network has accepted the
	/// submission; the record is then watched until settlement. Any failure
	/// before network acceptance leaves no record behind.
	pub async fn submit(
		&self,
		intent: BlinkIntent,
		signer: &SignerService,
		team_id: i64,
		creator_id: i64,
	) -> Result<Blink, SubmitError> {
		let sender = signer.get_address().await.map_err(SubmitError::Signer)?;
		let tx = self.builder.build(&intent, &sender)?;

		let signature = signer.sign_and_send(&tx).await.map_err(|e| match e {
			SignerError::Submission(reason) => SubmitError::Submission(reason),
			other => SubmitError::Signer(other),
		})?;

		let blink = Blink::pending(signature, intent, team_id, creator_id);
		self.storage.insert(&blink).await?;

		info!(
			blink_id = %blink.id,
			kind = %blink.kind,
			team_id,
			"blink submitted and accepted by network"
		);

		let _ = self.events.publish(BlinkEvent::Submitted {
			blink: blink.clone(),
		});

		self.watch(&blink);
		Ok(blink)
	}

	/// Applies a settlement outcome to a pending Blink.
	///
	/// Idempotent: the storage layer refuses to overwrite a terminal status,
	/// so concurrent reconciliations of the same Blink settle exactly one
	/// winner and the rest are no-ops.
	pub async fn reconcile(
		&self,
		blink_id: &BlinkId,
		outcome: SettlementOutcome,
	) -> Result<(), StorageError> {
		let (status, failure) = match outcome {
			SettlementOutcome::Finalized => (BlinkStatus::Completed, None),
			SettlementOutcome::Rejected => (BlinkStatus::Failed, Some(FailureReason::Rejected)),
			SettlementOutcome::Expired => (BlinkStatus::Failed, Some(FailureReason::Expired)),
		};

		let applied = self
			.storage
			.update_status(blink_id, status, None, Utc::now())
			.await?;

		if !applied {
			debug!(blink_id = %blink_id, "blink already settled, outcome discarded");
			return Ok(());
		}

		info!(blink_id = %blink_id, status = %status, "blink reconciled");

		let event = match failure {
			None => BlinkEvent::Completed {
				blink_id: blink_id.clone(),
			},
			Some(reason) => BlinkEvent::Failed {
				blink_id: blink_id.clone(),
				reason,
			},
		};
		let _ = self.events.publish(event);

		Ok(())
	}

	/// Spawns a confirmation watcher for a pending Blink.
	///
	/// Registering the same Blink twice is a no-op while the first watcher
	/// is still running.
	pub fn watch(&self, blink: &Blink) {
		let Some(signature) = blink.network_signature.clone() else {
			warn!(blink_id = %blink.id, "pending blink has no signature to watch");
			return;
		};

		match self.watchers.entry(blink.id.clone()) {
			dashmap::Entry::Occupied(_) => {
				debug!(blink_id = %blink.id, "watcher already registered");
				return;
			}
			dashmap::Entry::Vacant(entry) => {
				entry.insert(());
			}
		}

		let manager = self.clone();
		let blink_id = blink.id.clone();
		tokio::spawn(async move {
			let outcome = manager.poller.poll_until_terminal(&signature).await;
			if let Err(e) = manager.reconcile(&blink_id, outcome).await {
				error!(blink_id = %blink_id, "failed to reconcile blink: {}", e);
			}
			manager.watchers.remove(&blink_id);
		});
	}

	/// Re-registers watchers for every pending Blink in storage.
	///
	/// Run at startup so records left pending by a previous process still
	/// settle. Returns how many watchers were registered.
	pub async fn resume_pending(&self) -> Result<usize, StorageError> {
		let pending = self.storage.list_pending().await?;
		let count = pending.len();

		for blink in &pending {
			self.watch(blink);
		}

		if count > 0 {
			info!(count, "resumed watchers for pending blinks");
		}

		Ok(count)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use blink_network::{NetworkError, NetworkInterface, NetworkService, PollerConfig, TxStatus};
	use blink_signer::SignerInterface;
	use blink_storage::implementations::memory::MemoryStorage;
	use blink_types::{Address, BlinkKind, NetworkSignature, UnsignedTransaction};
	use rust_decimal::Decimal;
	use std::time::Duration;

	const SENDER: &str = "BPFLoaderUpgradeab1e11111111111111111111111";
	const RECIPIENT: &str = "SysvarC1ock11111111111111111111111111111111";

	struct FixedSigner {
		signature: Option<String>,
		error: Option<SignerError>,
	}

	impl FixedSigner {
		fn accepting(signature: &str) -> Self {
			Self {
				signature: Some(signature.to_string()),
				error: None,
			}
		}

		fn failing(error: SignerError) -> Self {
			Self {
				signature: None,
				error: Some(error),
			}
		}
	}

	#[async_trait]
	impl SignerInterface for FixedSigner {
		async fn address(&self) -> Result<Address, SignerError> {
			Ok(SENDER.parse().unwrap())
		}

		async fn sign_and_send(
			&self,
			_tx: &UnsignedTransaction,
		) -> Result<NetworkSignature, SignerError> {
			match (&self.signature, &self.error) {
				(Some(sig), _) => Ok(NetworkSignature(sig.clone())),
				(_, Some(err)) => Err(err.clone()),
				_ => unreachable!(),
			}
		}
	}

	struct FixedNetwork {
		status: Result<TxStatus, ()>,
	}

	#[async_trait]
	impl NetworkInterface for FixedNetwork {
		async fn get_status(
			&self,
			_signature: &NetworkSignature,
		) -> Result<TxStatus, NetworkError> {
			self.status
				.map_err(|_| NetworkError::Rpc("unreachable endpoint".to_string()))
		}
	}

	fn manager(status: Result<TxStatus, ()>) -> LifecycleManager {
		let network = Arc::new(NetworkService::new(Box::new(FixedNetwork { status })));
		let poller = ConfirmationPoller::new(
			network,
			PollerConfig {
				poll_interval: Duration::from_millis(5),
				timeout: Duration::from_millis(200),
				max_consecutive_failures: 3,
			},
		);
		LifecycleManager::new(
			Arc::new(BuilderService::default()),
			Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
			Arc::new(poller),
		)
	}

	fn intent() -> BlinkIntent {
		BlinkIntent {
			kind: BlinkKind::Transfer,
			recipient: RECIPIENT.to_string(),
			amount: Decimal::ONE,
			memo: Some("lifecycle test".to_string()),
			asset: None,
		}
	}

	async fn wait_for_status(
		manager: &LifecycleManager,
		id: &BlinkId,
		status: BlinkStatus,
	) -> Blink {
		for _ in 0..100 {
			let blink = manager.storage.get(id).await.unwrap().unwrap();
			if blink.status == status {
				return blink;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		panic!("blink never reached {}", status);
	}

	#[tokio::test]
	async fn test_submit_persists_pending_blink() {
		let manager = manager(Ok(TxStatus::Pending));
		let signer = SignerService::new(Box::new(FixedSigner::accepting("sig123")));

		let blink = manager.submit(intent(), &signer, 7, 42).await.unwrap();

		assert_eq!(blink.id.as_str(), "sig123");
		assert_eq!(blink.status, BlinkStatus::Pending);
		assert_eq!(blink.team_id, 7);
		assert_eq!(blink.creator_id, 42);

		let stored = manager.storage.get(&blink.id).await.unwrap().unwrap();
		assert_eq!(stored.status, BlinkStatus::Pending);
	}

	#[tokio::test]
	async fn test_declined_signing_leaves_no_record() {
		let manager = manager(Ok(TxStatus::Pending));
		let signer = SignerService::new(Box::new(FixedSigner::failing(SignerError::UserRejected)));

		let err = manager.submit(intent(), &signer, 7, 42).await.unwrap_err();
		assert!(matches!(err, SubmitError::Signer(SignerError::UserRejected)));

		assert!(manager.storage.list_by_team(7, 10).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_rejected_submission_leaves_no_record() {
		let manager = manager(Ok(TxStatus::Pending));
		let signer = SignerService::new(Box::new(FixedSigner::failing(SignerError::Submission(
			"insufficient balance".to_string(),
		))));

		let err = manager.submit(intent(), &signer, 7, 42).await.unwrap_err();
		assert!(matches!(err, SubmitError::Submission(_)));

		assert!(manager.storage.list_by_team(7, 10).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_invalid_intent_never_reaches_signer() {
		let manager = manager(Ok(TxStatus::Pending));
		let signer = SignerService::new(Box::new(FixedSigner::accepting("sig123")));

		let mut bad = intent();
		bad.amount = Decimal::ZERO;

		let err = manager.submit(bad, &signer, 7, 42).await.unwrap_err();
		assert!(matches!(err, SubmitError::Validation(_)));
		assert!(manager.storage.list_by_team(7, 10).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_finalized_blink_completes() {
		let manager = manager(Ok(TxStatus::Finalized));
		let signer = SignerService::new(Box::new(FixedSigner::accepting("sig123")));
		let mut events = manager.subscribe();

		let blink = manager.submit(intent(), &signer, 7, 42).await.unwrap();
		let settled = wait_for_status(&manager, &blink.id, BlinkStatus::Completed).await;
		assert_eq!(settled.status, BlinkStatus::Completed);

		// Submitted then Completed, in order
		assert!(matches!(
			events.recv().await.unwrap(),
			BlinkEvent::Submitted { .. }
		));
		assert!(matches!(
			events.recv().await.unwrap(),
			BlinkEvent::Completed { .. }
		));
	}

	#[tokio::test]
	async fn test_rejected_blink_fails() {
		let manager = manager(Ok(TxStatus::Rejected));
		let signer = SignerService::new(Box::new(FixedSigner::accepting("sig123")));
		let mut events = manager.subscribe();

		let blink = manager.submit(intent(), &signer, 7, 42).await.unwrap();
		wait_for_status(&manager, &blink.id, BlinkStatus::Failed).await;

		assert!(matches!(
			events.recv().await.unwrap(),
			BlinkEvent::Submitted { .. }
		));
		assert!(matches!(
			events.recv().await.unwrap(),
			BlinkEvent::Failed {
				reason: FailureReason::Rejected,
				..
			}
		));
	}

	#[tokio::test]
	async fn test_confirmation_timeout_fails_blink() {
		let manager = manager(Ok(TxStatus::Pending));
		let signer = SignerService::new(Box::new(FixedSigner::accepting("sig123")));
		let mut events = manager.subscribe();

		let blink = manager.submit(intent(), &signer, 7, 42).await.unwrap();
		wait_for_status(&manager, &blink.id, BlinkStatus::Failed).await;

		assert!(matches!(
			events.recv().await.unwrap(),
			BlinkEvent::Submitted { .. }
		));
		assert!(matches!(
			events.recv().await.unwrap(),
			BlinkEvent::Failed {
				reason: FailureReason::Expired,
				..
			}
		));
	}

	#[tokio::test]
	async fn test_reconcile_is_idempotent() {
		let manager = manager(Ok(TxStatus::Pending));
		let blink = Blink::pending(NetworkSignature("sig123".to_string()), intent(), 7, 42);
		manager.storage.insert(&blink).await.unwrap();

		manager
			.reconcile(&blink.id, SettlementOutcome::Finalized)
			.await
			.unwrap();
		// The late, conflicting outcome loses and changes nothing
		manager
			.reconcile(&blink.id, SettlementOutcome::Expired)
			.await
			.unwrap();

		let stored = manager.storage.get(&blink.id).await.unwrap().unwrap();
		assert_eq!(stored.status, BlinkStatus::Completed);
	}

	#[tokio::test]
	async fn test_concurrent_reconcile_single_winner() {
		let manager = manager(Ok(TxStatus::Pending));
		let blink = Blink::pending(NetworkSignature("sig123".to_string()), intent(), 7, 42);
		manager.storage.insert(&blink).await.unwrap();
		let mut events = manager.subscribe();

		let a = {
			let m = manager.clone();
			let id = blink.id.clone();
			tokio::spawn(async move { m.reconcile(&id, SettlementOutcome::Finalized).await })
		};
		let b = {
			let m = manager.clone();
			let id = blink.id.clone();
			tokio::spawn(async move { m.reconcile(&id, SettlementOutcome::Rejected).await })
		};
		a.await.unwrap().unwrap();
		b.await.unwrap().unwrap();

		// Exactly one settlement event regardless of which writer won
		assert!(events.recv().await.is_ok());
		assert!(matches!(
			events.try_recv(),
			Err(broadcast::error::TryRecvError::Empty)
		));

		let stored = manager.storage.get(&blink.id).await.unwrap().unwrap();
		assert!(stored.status.is_terminal());
	}

	#[tokio::test]
	async fn test_resume_pending_settles_leftovers() {
		let manager = manager(Ok(TxStatus::Finalized));

		let blink = Blink::pending(NetworkSignature("sig123".to_string()), intent(), 7, 42);
		manager.storage.insert(&blink).await.unwrap();

		let resumed = manager.resume_pending().await.unwrap();
		assert_eq!(resumed, 1);

		let settled = wait_for_status(&manager, &blink.id, BlinkStatus::Completed).await;
		assert_eq!(settled.status, BlinkStatus::Completed);
	}

	#[tokio::test]
	async fn test_watch_is_idempotent() {
		let manager = manager(Ok(TxStatus::Pending));
		let blink = Blink::pending(NetworkSignature("sig123".to_string()), intent(), 7, 42);
		manager.storage.insert(&blink).await.unwrap();

		manager.watch(&blink);
		manager.watch(&blink);
		assert_eq!(manager.watchers.len(), 1);
	}
}
