// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scheduling and dispatch loop for chime.
//!
//! A [`Scheduler`] polls a shared job store for due jobs, dispatches their
//! payloads to a downstream work queue, and advances each dispatched job's
//! schedule. The store and queue are external collaborators consumed through
//! the [`JobStore`] and [`WorkQueue`] traits; "now" comes from a
//! [`ServerClock`] corrected by a remote time authority so correctness does
//! not depend on any one machine's wall clock.
//!
//! Multiple scheduler instances (threads or processes) may poll the same
//! store concurrently. There is no leader election or cross-instance mutual
//! exclusion: two instances polling within the same window can both dispatch
//! the same due occurrence, and a cycle that fails after enqueuing leaves
//! the jobs due for re-dispatch. Dispatch is therefore at-least-once per due
//! occurrence; consumers are responsible for their own idempotency.

pub mod clock;
pub mod error;
pub mod queue;
pub mod scheduler;
pub mod store;

pub use clock::{OffsetHandle, ServerClock};
pub use error::{Result, SchedulerError};
pub use queue::{MemoryWorkQueue, QueueError, WorkQueue};
pub use scheduler::{Scheduler, StopHandle, DEFAULT_POLL_INTERVAL};
pub use store::{JobStore, MemoryJobStore, StoreError};

pub use chime_core::{CronPattern, Job, PatternError};
