// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Job store contract and the in-memory reference implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

use chime_core::Job;

/// Failure reported by a store adapter.
///
/// The scheduler never inspects the message; it carries the adapter's own
/// description through to the caller or the loop's error callback.
#[derive(Debug, Clone, Error)]
#[error("store error: {message}")]
pub struct StoreError {
	message: String,
}

impl StoreError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Adapter contract over the shared, multi-writer job store.
///
/// Implementations are expected to be atomic per job key; no transactional
/// guarantee across keys is assumed, so a batched write may partially
/// succeed. Reads of absent jobs report `None` rather than failing.
#[async_trait]
pub trait JobStore: Send + Sync {
	/// Fetch a single job by name.
	async fn get(&self, name: &str) -> Result<Option<Job>, StoreError>;

	/// Fetch every job, keyed by name.
	async fn get_all(&self) -> Result<BTreeMap<String, Job>, StoreError>;

	/// Fetch jobs with `next_run <= up_to`. The bound is inclusive: a job
	/// whose `next_run` equals `up_to` to the millisecond is returned.
	async fn range_by_next_run(&self, up_to: DateTime<Utc>)
		-> Result<BTreeMap<String, Job>, StoreError>;

	/// Write a job record, replacing any existing record under `name`.
	async fn put(&self, name: &str, job: &Job) -> Result<(), StoreError>;

	/// Write several job records. Stores without a batch primitive fall
	/// back to sequential per-job writes; per-job atomicity is all the
	/// scheduler relies on.
	async fn put_all(&self, jobs: &BTreeMap<String, Job>) -> Result<(), StoreError> {
		for (name, job) in jobs {
			self.put(name, job).await?;
		}
		Ok(())
	}

	/// Remove a job. Deleting an absent name is not an error.
	async fn delete(&self, name: &str) -> Result<(), StoreError>;
}

/// In-memory [`JobStore`] used by the test suite and by embedders that do
/// not need a remote store.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
	jobs: RwLock<BTreeMap<String, Job>>,
}

impl MemoryJobStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl JobStore for MemoryJobStore {
	async fn get(&self, name: &str) -> Result<Option<Job>, StoreError> {
		Ok(self.jobs.read().await.get(name).cloned())
	}

	async fn get_all(&self) -> Result<BTreeMap<String, Job>, StoreError> {
		Ok(self.jobs.read().await.clone())
	}

	async fn range_by_next_run(
		&self,
		up_to: DateTime<Utc>,
	) -> Result<BTreeMap<String, Job>, StoreError> {
		let jobs = self.jobs.read().await;
		Ok(jobs
			.iter()
			.filter(|(_, job)| job.next_run <= up_to)
			.map(|(name, job)| (name.clone(), job.clone()))
			.collect())
	}

	async fn put(&self, name: &str, job: &Job) -> Result<(), StoreError> {
		self.jobs.write().await.insert(name.to_string(), job.clone());
		Ok(())
	}

	async fn put_all(&self, jobs: &BTreeMap<String, Job>) -> Result<(), StoreError> {
		let mut guard = self.jobs.write().await;
		for (name, job) in jobs {
			guard.insert(name.clone(), job.clone());
		}
		Ok(())
	}

	async fn delete(&self, name: &str) -> Result<(), StoreError> {
		self.jobs.write().await.remove(name);
		Ok(())
	}
}
