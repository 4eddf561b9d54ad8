// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for schedule pattern parsing and evaluation.

use thiserror::Error;

/// Errors produced while parsing or evaluating a cron pattern.
///
/// These are always synchronous and never retried: the caller must supply a
/// corrected pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
	#[error("expected 6 fields (seconds minutes hours day-of-month month day-of-week), found {0}")]
	FieldCount(usize),

	#[error("invalid {field} field: {value}")]
	InvalidField { field: &'static str, value: String },

	#[error("{field} value {value} out of range {min}-{max}")]
	OutOfRange {
		field: &'static str,
		value: u32,
		min: u32,
		max: u32,
	},

	#[error("inverted {field} range: {start}-{end}")]
	InvertedRange {
		field: &'static str,
		start: u32,
		end: u32,
	},

	#[error("zero step in {field} field")]
	ZeroStep { field: &'static str },

	#[error("pattern can never match: {0}")]
	Unsatisfiable(String),
}
