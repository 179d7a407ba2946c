//! Lifecycle events published by the engine.
//!
//! Subscribers (a UI, an audit log) observe submissions and settlements
//! without holding the lifecycle manager itself. Dropping a receiver never
//! affects the lifecycle; reconciliation persists regardless of listeners.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

use crate::{Blink, BlinkId};

/// Why a Blink settled as failed.
///
/// Both variants persist identically as `failed`; the distinction exists
/// for logs and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
	/// The network explicitly rejected the transaction.
	Rejected,
	/// No terminal signal arrived within the confirmation window.
	Expired,
}

impl fmt::Display for FailureReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FailureReason::Rejected => f.write_str("rejected"),
			FailureReason::Expired => f.write_str("expired"),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BlinkEvent {
	/// The network accepted a submission; a pending Blink now exists.
	Submitted { blink: Blink },
	/// Finality was observed and the Blink is completed.
	Completed { blink_id: BlinkId },
	/// The Blink settled as failed.
	Failed {
		blink_id: BlinkId,
		reason: FailureReason,
	},
}

pub struct EventBus {
	sender: broadcast::Sender<BlinkEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<BlinkEvent> {
		self.sender.subscribe()
	}

	pub fn publish(&self, event: BlinkEvent) -> Result<(), broadcast::error::SendError<BlinkEvent>> {
		self.sender.send(event)?;
		Ok(())
	}
}

impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}
