// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for scheduler operations.

use thiserror::Error;

use chime_core::PatternError;

use crate::queue::QueueError;
use crate::store::StoreError;

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors surfaced by scheduler operations and the poll loop.
///
/// Pattern errors are synchronous validation failures and are never
/// retried. Store and queue errors abort the triggering operation (or the
/// current poll cycle, reported through the loop's error callback); the
/// loop itself keeps running and retries on its next tick.
#[derive(Debug, Error)]
pub enum SchedulerError {
	#[error(transparent)]
	Pattern(#[from] PatternError),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Queue(#[from] QueueError),
}
