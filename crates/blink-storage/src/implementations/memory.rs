//! In-memory storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::{sort_newest_first, StorageError, StorageInterface};
use blink_types::{Blink, BlinkId, BlinkStatus, NetworkSignature};

/// In-memory storage backed by a concurrent map.
///
/// The conditional status update relies on dashmap's per-entry locking for
/// its read-modify-write atomicity.
#[derive(Default)]
pub struct MemoryStorage {
	data: DashMap<BlinkId, Blink>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn insert(&self, blink: &Blink) -> Result<(), StorageError> {
		match self.data.entry(blink.id.clone()) {
			dashmap::Entry::Occupied(_) => Err(StorageError::Backend(format!(
				"blink {} already exists",
				blink.id
			))),
			dashmap::Entry::Vacant(entry) => {
				entry.insert(blink.clone());
				Ok(())
			}
		}
	}

	async fn get(&self, id: &BlinkId) -> Result<Option<Blink>, StorageError> {
		Ok(self.data.get(id).map(|entry| entry.clone()))
	}

	async fn update_status(
		&self,
		id: &BlinkId,
		status: BlinkStatus,
		signature: Option<NetworkSignature>,
		updated_at: DateTime<Utc>,
	) -> Result<bool, StorageError> {
		let mut entry = self.data.get_mut(id).ok_or(StorageError::NotFound)?;

		if entry.status.is_terminal() {
			return Ok(false);
		}

		entry.status = status;
		entry.updated_at = updated_at;
		if let Some(signature) = signature {
			entry.network_signature = Some(signature);
		}

		Ok(true)
	}

	async fn list_by_team(&self, team_id: i64, limit: usize) -> Result<Vec<Blink>, StorageError> {
		let mut blinks: Vec<Blink> = self
			.data
			.iter()
			.filter(|entry| entry.team_id == team_id)
			.map(|entry| entry.clone())
			.collect();

		sort_newest_first(&mut blinks);
		blinks.truncate(limit);
		Ok(blinks)
	}

	async fn list_pending(&self) -> Result<Vec<Blink>, StorageError> {
		Ok(self
			.data
			.iter()
			.filter(|entry| entry.status == BlinkStatus::Pending)
			.map(|entry| entry.clone())
			.collect())
	}
}
