//! File-based storage implementation.
//!
//! One JSON file per Blink under a base directory. Writes go through a
//! temp-file rename so a crash never leaves a half-written record, and all
//! mutations serialize through a store-level lock to keep the conditional
//! status update atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

use crate::{sort_newest_first, StorageError, StorageInterface};
use blink_types::{Blink, BlinkId, BlinkStatus, NetworkSignature};

pub struct FileStorage {
	/// Base directory for record files.
	base_path: PathBuf,
	/// Serializes read-modify-write sequences across tasks.
	write_lock: Mutex<()>,
}

impl FileStorage {
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			write_lock: Mutex::new(()),
		}
	}

	/// Converts a Blink id to a filesystem-safe record path.
	fn record_path(&self, id: &BlinkId) -> PathBuf {
		let safe = id.as_str().replace(['/', ':'], "_");
		self.base_path.join(format!("{}.json", safe))
	}

	async fn read_record(&self, path: &PathBuf) -> Result<Option<Blink>, StorageError> {
		match fs::read(path).await {
			Ok(bytes) => {
				let blink = serde_json::from_slice(&bytes)
					.map_err(|e| StorageError::Serialization(e.to_string()))?;
				Ok(Some(blink))
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn write_record(&self, blink: &Blink) -> Result<(), StorageError> {
		let path = self.record_path(&blink.id);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let bytes = serde_json::to_vec(blink)
			.map_err(|e| StorageError::Serialization(e.to_string()))?;

		// Write atomically via temp file + rename
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, bytes)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn read_all(&self) -> Result<Vec<Blink>, StorageError> {
		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut blinks = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension().and_then(|e| e.to_str()) != Some("json") {
				continue;
			}
			if let Some(blink) = self.read_record(&path).await? {
				blinks.push(blink);
			}
		}

		Ok(blinks)
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn insert(&self, blink: &Blink) -> Result<(), StorageError> {
		let _guard = self.write_lock.lock().await;

		let path = self.record_path(&blink.id);
		if self.read_record(&path).await?.is_some() {
			return Err(StorageError::Backend(format!(
				"blink {} already exists",
				blink.id
			)));
		}

		self.write_record(blink).await
	}

	async fn get(&self, id: &BlinkId) -> Result<Option<Blink>, StorageError> {
		self.read_record(&self.record_path(id)).await
	}

	async fn update_status(
		&self,
		id: &BlinkId,
		status: BlinkStatus,
		signature: Option<NetworkSignature>,
		updated_at: DateTime<Utc>,
	) -> Result<bool, StorageError> {
		let _guard = self.write_lock.lock().await;

		let path = self.record_path(id);
		let mut blink = self
			.read_record(&path)
			.await?
			.ok_or(StorageError::NotFound)?;

		if blink.status.is_terminal() {
			return Ok(false);
		}

		blink.status = status;
		blink.updated_at = updated_at;
		if let Some(signature) = signature {
			blink.network_signature = Some(signature);
		}

		self.write_record(&blink).await?;
		Ok(true)
	}

	async fn list_by_team(&self, team_id: i64, limit: usize) -> Result<Vec<Blink>, StorageError> {
		let mut blinks: Vec<Blink> = self
			.read_all()
			.await?
			.into_iter()
			.filter(|b| b.team_id == team_id)
			.collect();

		sort_newest_first(&mut blinks);
		blinks.truncate(limit);
		Ok(blinks)
	}

	async fn list_pending(&self) -> Result<Vec<Blink>, StorageError> {
		Ok(self
			.read_all()
			.await?
			.into_iter()
			.filter(|b| b.status == BlinkStatus::Pending)
			.collect())
	}
}
