// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Drift-corrected clock fed by a remote time authority.

use chrono::{DateTime, Duration, Utc};
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::debug;

/// Clock returning wall-clock time adjusted by the most recently observed
/// offset against a remote time authority.
///
/// The offset arrives out-of-band as a millisecond delta (last value wins)
/// and defaults to zero until the first observation. [`now`](Self::now)
/// never blocks and never fails: a stale offset only degrades precision.
/// Clones share the same offset, so one clock can serve several scheduler
/// instances in-process.
#[derive(Debug, Clone)]
pub struct ServerClock {
	offset_ms: watch::Receiver<i64>,
}

/// Writer half of a [`ServerClock`], held by whatever collaborator reports
/// the remote clock delta.
#[derive(Debug)]
pub struct OffsetHandle {
	tx: watch::Sender<i64>,
}

impl ServerClock {
	/// Create a clock plus the handle used to feed it offset observations.
	pub fn channel() -> (Self, OffsetHandle) {
		let (tx, rx) = watch::channel(0);
		(Self { offset_ms: rx }, OffsetHandle { tx })
	}

	/// Create a clock driven by a stream of offset observations, spawning a
	/// forwarding task on the current tokio runtime. The clock falls back
	/// to the last observed offset once the stream ends.
	pub fn from_stream<S>(stream: S) -> Self
	where
		S: Stream<Item = i64> + Send + 'static,
	{
		let (clock, handle) = Self::channel();
		tokio::spawn(async move {
			let mut stream = Box::pin(stream);
			while let Some(offset_ms) = stream.next().await {
				handle.report(offset_ms);
			}
			debug!("clock offset stream ended");
		});
		clock
	}

	/// Current server-adjusted time.
	pub fn now(&self) -> DateTime<Utc> {
		Utc::now() + Duration::milliseconds(*self.offset_ms.borrow())
	}

	/// The most recently observed offset in milliseconds.
	pub fn offset_ms(&self) -> i64 {
		*self.offset_ms.borrow()
	}
}

impl OffsetHandle {
	/// Record a new offset observation in milliseconds. Last value wins.
	pub fn report(&self, offset_ms: i64) {
		// Send only fails when every clock clone is gone; nothing to do.
		let _ = self.tx.send(offset_ms);
	}
}
