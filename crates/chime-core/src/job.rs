// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The job record persisted per schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scheduled job as stored in the shared store.
///
/// The job's name is the store key and is not part of the record. The store
/// holds the jobs collectively; a scheduler instance only ever works on
/// transient copies during a poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
	/// Six-field cron expression (seconds minutes hours day-of-month month
	/// day-of-week).
	pub pattern: String,

	/// Next scheduled occurrence. Always the earliest occurrence of
	/// `pattern` strictly after the last computed `last_run` (or the job's
	/// creation time, if it has never run). Epoch milliseconds on the wire.
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub next_run: DateTime<Utc>,

	/// Most recent dispatched occurrence; absent until the first dispatch.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "chrono::serde::ts_milliseconds_option"
	)]
	pub last_run: Option<DateTime<Utc>>,

	/// Opaque payload forwarded verbatim to the work queue on dispatch.
	/// Never interpreted by the scheduler.
	#[serde(default)]
	pub data: Map<String, Value>,
}

impl Job {
	/// Whether the job is due at `now` (inclusive boundary).
	pub fn is_due(&self, now: DateTime<Utc>) -> bool {
		self.next_run <= now
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use serde_json::json;

	fn payload() -> Map<String, Value> {
		let mut data = Map::new();
		data.insert("k".to_string(), json!(1));
		data
	}

	#[test]
	fn test_serializes_timestamps_as_epoch_millis() {
		let job = Job {
			pattern: "* * * * * *".to_string(),
			next_run: Utc.timestamp_millis_opt(1_750_000_000_123).unwrap(),
			last_run: None,
			data: payload(),
		};

		let value = serde_json::to_value(&job).unwrap();
		assert_eq!(value["pattern"], json!("* * * * * *"));
		assert_eq!(value["nextRun"], json!(1_750_000_000_123i64));
		assert_eq!(value["data"], json!({"k": 1}));
		// Absent until first dispatch, not null.
		assert!(value.get("lastRun").is_none());
	}

	#[test]
	fn test_round_trips_with_last_run() {
		let job = Job {
			pattern: "00 * * * * *".to_string(),
			next_run: Utc.timestamp_millis_opt(1_750_000_060_000).unwrap(),
			last_run: Some(Utc.timestamp_millis_opt(1_750_000_001_000).unwrap()),
			data: Map::new(),
		};

		let value = serde_json::to_value(&job).unwrap();
		assert_eq!(value["lastRun"], json!(1_750_000_001_000i64));

		let back: Job = serde_json::from_value(value).unwrap();
		assert_eq!(back, job);
	}

	#[test]
	fn test_deserializes_record_without_optional_fields() {
		let job: Job = serde_json::from_value(json!({
			"pattern": "* * * * * *",
			"nextRun": 1_750_000_000_000i64,
		}))
		.unwrap();

		assert_eq!(job.last_run, None);
		assert!(job.data.is_empty());
	}

	#[test]
	fn test_is_due_boundary_is_inclusive() {
		let now = Utc.timestamp_millis_opt(1_750_000_000_000).unwrap();
		let mut job = Job {
			pattern: "* * * * * *".to_string(),
			next_run: now,
			last_run: None,
			data: Map::new(),
		};

		assert!(job.is_due(now));
		job.next_run = now + chrono::Duration::milliseconds(1);
		assert!(!job.is_due(now));
	}
}
