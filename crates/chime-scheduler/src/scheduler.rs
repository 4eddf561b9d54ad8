// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The scheduling and dispatch loop.

use chrono::Duration as TimeDelta;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use chime_core::{CronPattern, Job};

use crate::clock::ServerClock;
use crate::error::{Result, SchedulerError};
use crate::queue::WorkQueue;
use crate::store::JobStore;

/// Default delay between poll cycles, measured from cycle completion.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Coordinates due-job detection, dispatch, and rescheduling against a
/// shared job store.
///
/// All job mutations flow through this type: [`add_job`](Self::add_job)
/// creates, [`update_job`](Self::update_job) replaces,
/// [`delete_job`](Self::delete_job) removes, and the poll loop started by
/// [`run`](Self::run) advances `next_run`/`last_run` on dispatch.
///
/// The scheduler holds no exclusive ownership of the jobs. Independent
/// instances may poll the same store concurrently; nothing prevents two of
/// them from dispatching the same due occurrence, so dispatch is
/// at-least-once (see the crate docs).
#[derive(Clone)]
pub struct Scheduler {
	store: Arc<dyn JobStore>,
	queue: Arc<dyn WorkQueue>,
	clock: ServerClock,
	poll_interval: Duration,
}

impl Scheduler {
	pub fn new(store: Arc<dyn JobStore>, queue: Arc<dyn WorkQueue>, clock: ServerClock) -> Self {
		Self {
			store,
			queue,
			clock,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}

	/// Override the delay between poll cycles. The delay runs from cycle
	/// completion, not cycle start, so cycles never overlap in-process.
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	/// Create a job and persist it, with its first `next_run` computed from
	/// the current server-adjusted time.
	#[instrument(skip(self, data), fields(job = %name))]
	pub async fn add_job(&self, name: &str, pattern: &str, data: Map<String, Value>) -> Result<Job> {
		let job = self.build_job(pattern, data)?;
		self.store.put(name, &job).await?;
		debug!(next_run = %job.next_run, "job added");
		Ok(job)
	}

	/// Replace a job's pattern and payload, recomputing `next_run` from the
	/// current time.
	///
	/// Whatever occurrence was pending is discarded and the schedule
	/// restarts from "now". The dispatch history is not part of the reset:
	/// an existing `last_run` is carried over unchanged.
	#[instrument(skip(self, data), fields(job = %name))]
	pub async fn update_job(
		&self,
		name: &str,
		pattern: &str,
		data: Map<String, Value>,
	) -> Result<Job> {
		let mut job = self.build_job(pattern, data)?;
		job.last_run = self
			.store
			.get(name)
			.await?
			.and_then(|existing| existing.last_run);
		self.store.put(name, &job).await?;
		debug!(next_run = %job.next_run, "job updated");
		Ok(job)
	}

	/// Remove a job. Deleting an absent job is a no-op.
	#[instrument(skip(self), fields(job = %name))]
	pub async fn delete_job(&self, name: &str) -> Result<()> {
		self.store.delete(name).await?;
		Ok(())
	}

	/// Fetch a single job. Absence is `Ok(None)`, not an error.
	pub async fn get_job(&self, name: &str) -> Result<Option<Job>> {
		Ok(self.store.get(name).await?)
	}

	/// Fetch every job, keyed by name.
	pub async fn get_jobs(&self) -> Result<BTreeMap<String, Job>> {
		Ok(self.store.get_all().await?)
	}

	/// Jobs due at the current server-adjusted time (`next_run <= now`).
	pub async fn waiting_jobs(&self) -> Result<BTreeMap<String, Job>> {
		Ok(self.store.range_by_next_run(self.clock.now()).await?)
	}

	/// Start the polling loop and return the handle that halts it.
	///
	/// `on_poll` is invoked once per cycle with the due set (possibly
	/// empty) before any dispatching. `on_error` receives every cycle
	/// failure; the loop stays running and retries on its next tick, so the
	/// failed jobs remain due and are picked up again.
	///
	/// The first cycle runs immediately; each subsequent cycle is armed
	/// `poll_interval` after the previous one completes. Only
	/// [`StopHandle::stop`] halts the loop; dropping the handles leaves it
	/// running detached. An in-flight cycle finishes its current step but
	/// never re-arms once stopped.
	pub fn run<P, E>(&self, on_poll: P, on_error: E) -> StopHandle
	where
		P: Fn(&BTreeMap<String, Job>) + Send + Sync + 'static,
		E: Fn(&SchedulerError) + Send + 'static,
	{
		let scheduler = self.clone();
		let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
		let handle = StopHandle {
			shutdown: shutdown_tx.clone(),
			stopped: Arc::new(AtomicBool::new(false)),
		};

		tokio::spawn(async move {
			// The task keeps its own sender, so the channel stays open when
			// every StopHandle is dropped and recv only fires on an
			// explicit stop.
			let _shutdown_tx = shutdown_tx;
			info!("scheduler loop started");
			loop {
				if let Err(err) = scheduler.poll_cycle(&on_poll).await {
					warn!(error = %err, "poll cycle failed");
					on_error(&err);
				}
				tokio::select! {
					_ = tokio::time::sleep(scheduler.poll_interval) => {}
					// A stop signalled during the cycle is still buffered
					// here, so the cycle never re-arms.
					_ = shutdown_rx.recv() => break,
				}
			}
			info!("scheduler loop stopped");
		});

		handle
	}

	/// One poll cycle: fetch the due set, dispatch each payload in order,
	/// then persist the advanced schedules in one batched write.
	async fn poll_cycle<P>(&self, on_poll: &P) -> Result<()>
	where
		P: Fn(&BTreeMap<String, Job>),
	{
		let now = self.clock.now();
		let due = self.store.range_by_next_run(now).await?;
		on_poll(&due);
		if due.is_empty() {
			return Ok(());
		}
		debug!(due = due.len(), "dispatching due jobs");

		let mut advanced = BTreeMap::new();
		for (name, job) in &due {
			let pattern = CronPattern::parse(&job.pattern)?;
			// The due boundary, not the polling instant, is the occurrence
			// time: rescheduling from a late poll would otherwise skip
			// occurrences between next_run and now.
			let last_run = job.next_run + TimeDelta::seconds(1);
			let next_run = pattern.next_occurrence(last_run)?;
			self.queue.enqueue(&job.data).await?;

			let mut updated = job.clone();
			updated.next_run = next_run;
			updated.last_run = Some(last_run);
			advanced.insert(name.clone(), updated);
		}

		// Nothing is persisted until every due job dispatched, so a
		// mid-cycle failure leaves the whole due set due for the next tick.
		self.store.put_all(&advanced).await?;
		Ok(())
	}

	fn build_job(&self, pattern: &str, data: Map<String, Value>) -> Result<Job> {
		let parsed = CronPattern::parse(pattern)?;
		let next_run = parsed.next_occurrence(self.clock.now())?;
		Ok(Job {
			pattern: pattern.to_string(),
			next_run,
			last_run: None,
			data,
		})
	}
}

/// Handle that halts a running scheduler loop.
///
/// Stopping cancels the pending timer and prevents an in-flight cycle from
/// re-arming; it does not abort the cycle's current step. Stopping twice,
/// or stopping an already-stopped loop, is a no-op. Dropping the handles
/// without stopping leaves the loop running detached.
#[derive(Debug, Clone)]
pub struct StopHandle {
	shutdown: broadcast::Sender<()>,
	stopped: Arc<AtomicBool>,
}

impl StopHandle {
	pub fn stop(&self) {
		if self.stopped.swap(true, Ordering::SeqCst) {
			return;
		}
		// The loop may already have exited; a closed channel is fine.
		let _ = self.shutdown.send(());
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::SeqCst)
	}
}
