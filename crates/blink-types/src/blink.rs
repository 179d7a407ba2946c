//! Core Blink entity and intent types.
//!
//! A `BlinkIntent` is the raw user request for a chain action; a `Blink` is
//! the persisted lifecycle record that exists from the moment the network
//! accepts the signed submission.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BlinkId, NetworkSignature};

/// The kind of chain action a Blink performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlinkKind {
	Transfer,
	NftMint,
	TokenSwap,
}

impl fmt::Display for BlinkKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BlinkKind::Transfer => f.write_str("transfer"),
			BlinkKind::NftMint => f.write_str("nft_mint"),
			BlinkKind::TokenSwap => f.write_str("token_swap"),
		}
	}
}

/// User-supplied description of a desired Blink, prior to submission.
///
/// Fields are kept as raw input; the transaction builder validates them and
/// reports field-specific errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlinkIntent {
	/// What kind of action to perform.
	pub kind: BlinkKind,
	/// Recipient address, as entered by the user.
	pub recipient: String,
	/// Amount in network-native units (e.g. SOL, not lamports).
	pub amount: Decimal,
	/// Optional memo recorded on chain alongside the action.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub memo: Option<String>,
	/// Optional token identifier; the network-native asset when unset.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub asset: Option<String>,
}

/// Settlement status of a Blink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlinkStatus {
	/// Accepted by the network, awaiting finality.
	Pending,
	/// Observed final on the network.
	Completed,
	/// Rejected by the network, or never confirmed within the window.
	Failed,
}

impl BlinkStatus {
	/// Terminal statuses are immutable; no transition may leave them.
	pub fn is_terminal(&self) -> bool {
		matches!(self, BlinkStatus::Completed | BlinkStatus::Failed)
	}
}

impl fmt::Display for BlinkStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BlinkStatus::Pending => f.write_str("pending"),
			BlinkStatus::Completed => f.write_str("completed"),
			BlinkStatus::Failed => f.write_str("failed"),
		}
	}
}

/// A single tracked chain action, from submission to settlement.
///
/// Owned by exactly one team and one creator, and mutated exclusively by the
/// lifecycle manager. The record is created only once the network accepts
/// the signed transaction; the intent payload is immutable from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blink {
	/// Unique id, derived from the submission signature.
	pub id: BlinkId,
	/// Mirrors the intent kind.
	pub kind: BlinkKind,
	/// The submitted intent payload.
	pub data: BlinkIntent,
	/// Current settlement status.
	pub status: BlinkStatus,
	/// When the record was created (network acceptance time).
	pub created_at: DateTime<Utc>,
	/// When the record last changed.
	pub updated_at: DateTime<Utc>,
	/// Owning team.
	pub team_id: i64,
	/// User that submitted the intent.
	pub creator_id: i64,
	/// Signature returned by the network's submission endpoint.
	pub network_signature: Option<NetworkSignature>,
}

impl Blink {
	/// Creates a pending Blink for an accepted submission.
	pub fn pending(
		signature: NetworkSignature,
		intent: BlinkIntent,
		team_id: i64,
		creator_id: i64,
	) -> Self {
		let now = Utc::now();
		Self {
			id: BlinkId::from(&signature),
			kind: intent.kind,
			data: intent,
			status: BlinkStatus::Pending,
			created_at: now,
			updated_at: now,
			team_id,
			creator_id,
			network_signature: Some(signature),
		}
	}
}
