//! Signer gateway for the Blink engine.
//!
//! The signer is an external capability: the user's wallet, reached through
//! whatever adapter the surrounding application provides. This crate defines
//! the interface and a thin service wrapper; it ships no wallet of its own.

use async_trait::async_trait;
use blink_types::{Address, NetworkSignature, UnsignedTransaction};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SignerError {
	/// The user declined the signing request.
	#[error("user rejected the signing request")]
	UserRejected,
	/// The wallet is not connected or cannot be reached.
	#[error("signer unavailable: {0}")]
	Unavailable(String),
	/// The network rejected the signed transaction outright at submission
	/// (malformed transaction, insufficient balance). Non-retryable.
	#[error("submission rejected: {0}")]
	Submission(String),
}

/// Wallet capability: resolve the sender address, then sign and submit in a
/// single round-trip.
///
/// `sign_and_send` only succeeds once the network's submission endpoint has
/// accepted the transaction; the returned signature identifies it on chain.
#[async_trait]
pub trait SignerInterface: Send + Sync {
	async fn address(&self) -> Result<Address, SignerError>;

	async fn sign_and_send(
		&self,
		tx: &UnsignedTransaction,
	) -> Result<NetworkSignature, SignerError>;
}

pub struct SignerService {
	provider: Box<dyn SignerInterface>,
}

impl SignerService {
	pub fn new(provider: Box<dyn SignerInterface>) -> Self {
		Self { provider }
	}

	pub async fn get_address(&self) -> Result<Address, SignerError> {
		self.provider.address().await
	}

	pub async fn sign_and_send(
		&self,
		tx: &UnsignedTransaction,
	) -> Result<NetworkSignature, SignerError> {
		self.provider.sign_and_send(tx).await
	}
}
