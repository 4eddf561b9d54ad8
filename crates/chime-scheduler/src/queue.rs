// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Work queue contract and the in-memory reference implementation.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure reported by a queue adapter.
#[derive(Debug, Clone, Error)]
#[error("queue error: {message}")]
pub struct QueueError {
	message: String,
}

impl QueueError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Contract for the downstream work queue.
///
/// Payloads are a due job's `data` mapping, forwarded verbatim and never
/// inspected by the scheduler.
#[async_trait]
pub trait WorkQueue: Send + Sync {
	async fn enqueue(&self, payload: &Map<String, Value>) -> Result<(), QueueError>;
}

/// In-memory [`WorkQueue`] recording payloads in dispatch order.
#[derive(Debug, Default)]
pub struct MemoryWorkQueue {
	tasks: Mutex<Vec<Map<String, Value>>>,
}

impl MemoryWorkQueue {
	pub fn new() -> Self {
		Self::default()
	}

	/// Remove and return every enqueued payload, oldest first.
	pub async fn drain(&self) -> Vec<Map<String, Value>> {
		std::mem::take(&mut *self.tasks.lock().await)
	}

	pub async fn len(&self) -> usize {
		self.tasks.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.tasks.lock().await.is_empty()
	}
}

#[async_trait]
impl WorkQueue for MemoryWorkQueue {
	async fn enqueue(&self, payload: &Map<String, Value>) -> Result<(), QueueError> {
		self.tasks.lock().await.push(payload.clone());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn test_enqueue_preserves_order_and_content() {
		let queue = MemoryWorkQueue::new();

		let mut first = Map::new();
		first.insert("seq".to_string(), json!(1));
		let mut second = Map::new();
		second.insert("seq".to_string(), json!(2));

		queue.enqueue(&first).await.unwrap();
		queue.enqueue(&second).await.unwrap();

		assert_eq!(queue.len().await, 2);
		assert_eq!(queue.drain().await, vec![first, second]);
		assert!(queue.is_empty().await);
	}
}
