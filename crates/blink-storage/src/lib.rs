//! Persistence gateway for Blink records.
//!
//! This module provides the durable-store abstraction the lifecycle manager
//! writes through, with in-memory and file-based backend implementations.
//! The contract every backend must honor: `update_status` is a conditional
//! per-record write that refuses to touch a record whose stored status is
//! already terminal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use blink_types::{Blink, BlinkId, BlinkStatus, NetworkSignature};

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Largest page `list_by_team` will return when the config does not say
/// otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The requested record does not exist.
	#[error("not found")]
	NotFound,
	/// A record could not be serialized or deserialized.
	#[error("serialization error: {0}")]
	Serialization(String),
	/// The storage backend failed.
	#[error("backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for Blink storage backends.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Persists a new Blink. Inserting an existing id is a backend error.
	async fn insert(&self, blink: &Blink) -> Result<(), StorageError>;

	/// Fetches a Blink by id.
	async fn get(&self, id: &BlinkId) -> Result<Option<Blink>, StorageError>;

	/// Conditionally updates a Blink's status.
	///
	/// Returns `Ok(false)` without writing when the stored status is already
	/// terminal; returns `Ok(true)` when the update applied. The signature,
	/// when given, is recorded alongside the status.
	async fn update_status(
		&self,
		id: &BlinkId,
		status: BlinkStatus,
		signature: Option<NetworkSignature>,
		updated_at: DateTime<Utc>,
	) -> Result<bool, StorageError>;

	/// Lists a team's Blinks, newest first, at most `limit` records.
	async fn list_by_team(&self, team_id: i64, limit: usize) -> Result<Vec<Blink>, StorageError>;

	/// Lists every Blink still pending, for watcher resumption.
	async fn list_pending(&self) -> Result<Vec<Blink>, StorageError>;
}

/// High-level storage service wrapping a backend.
///
/// Adds the page-size bound on team listings; everything else delegates.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
	max_page_size: usize,
}

impl StorageService {
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self {
			backend,
			max_page_size: DEFAULT_MAX_PAGE_SIZE,
		}
	}

	pub fn with_max_page_size(mut self, max: usize) -> Self {
		self.max_page_size = max.max(1);
		self
	}

	pub async fn insert(&self, blink: &Blink) -> Result<(), StorageError> {
		self.backend.insert(blink).await
	}

	pub async fn get(&self, id: &BlinkId) -> Result<Option<Blink>, StorageError> {
		self.backend.get(id).await
	}

	pub async fn update_status(
		&self,
		id: &BlinkId,
		status: BlinkStatus,
		signature: Option<NetworkSignature>,
		updated_at: DateTime<Utc>,
	) -> Result<bool, StorageError> {
		self.backend
			.update_status(id, status, signature, updated_at)
			.await
	}

	/// Lists a team's Blinks, clamping the requested page size to the
	/// configured maximum.
	pub async fn list_by_team(
		&self,
		team_id: i64,
		limit: usize,
	) -> Result<Vec<Blink>, StorageError> {
		let limit = limit.clamp(1, self.max_page_size);
		self.backend.list_by_team(team_id, limit).await
	}

	pub async fn list_pending(&self) -> Result<Vec<Blink>, StorageError> {
		self.backend.list_pending().await
	}
}

/// Sorts newest first, with the id as a stable tie-break.
pub(crate) fn sort_newest_first(blinks: &mut [Blink]) {
	blinks.sort_by(|a, b| {
		b.created_at
			.cmp(&a.created_at)
			.then_with(|| b.id.as_str().cmp(a.id.as_str()))
	});
}

/// Factory function to create a storage backend from configuration.
///
/// Configuration parameters:
/// - `backend`: "memory" or "file" (default: "memory")
/// - `path`: base directory for the file backend (default: "./data/blinks")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let backend = config
		.get("backend")
		.and_then(|v| v.as_str())
		.unwrap_or("memory");

	match backend {
		"memory" => Ok(Box::new(implementations::memory::MemoryStorage::new())),
		"file" => {
			let path = config
				.get("path")
				.and_then(|v| v.as_str())
				.unwrap_or("./data/blinks")
				.to_string();
			Ok(Box::new(implementations::file::FileStorage::new(
				path.into(),
			)))
		}
		other => Err(StorageError::Backend(format!(
			"unknown storage backend: {}",
			other
		))),
	}
}
