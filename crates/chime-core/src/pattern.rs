// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Six-field cron pattern parsing and next-occurrence calculation.
//!
//! Field order is seconds, minutes, hours, day-of-month, month, day-of-week.
//! Each field accepts `*`, literals, ranges (`a-b`), steps (`*/s`, `a/s`,
//! `a-b/s`), comma lists, and the usual `JAN`-`DEC` / `SUN`-`SAT` names.
//! Evaluation is in UTC and purely a function of the pattern and the
//! reference time, so concurrent scheduler instances compute identical
//! `next_run` values from identical store state.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::PatternError;

/// Forward search horizon for [`CronPattern::next_occurrence`]. Eight years
/// covers every month-length/leap-day/weekday alignment, including the
/// eight-year Feb 29 gap around skipped century leap years (2096 to 2104),
/// so a fruitless search means the pattern is unsatisfiable (e.g.
/// `0 0 0 30 2 *`).
const SEARCH_HORIZON_DAYS: i64 = 8 * 366;

struct FieldSpec {
	name: &'static str,
	min: u32,
	max: u32,
	aliases: &'static [&'static str],
}

const SECONDS: FieldSpec = FieldSpec {
	name: "seconds",
	min: 0,
	max: 59,
	aliases: &[],
};

const MINUTES: FieldSpec = FieldSpec {
	name: "minutes",
	min: 0,
	max: 59,
	aliases: &[],
};

const HOURS: FieldSpec = FieldSpec {
	name: "hours",
	min: 0,
	max: 23,
	aliases: &[],
};

const DAY_OF_MONTH: FieldSpec = FieldSpec {
	name: "day-of-month",
	min: 1,
	max: 31,
	aliases: &[],
};

const MONTH: FieldSpec = FieldSpec {
	name: "month",
	min: 1,
	max: 12,
	aliases: &[
		"jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
	],
};

// Max is 7: both 0 and 7 are accepted for Sunday, normalised after parsing.
const DAY_OF_WEEK: FieldSpec = FieldSpec {
	name: "day-of-week",
	min: 0,
	max: 7,
	aliases: &["sun", "mon", "tue", "wed", "thu", "fri", "sat"],
};

/// A parsed six-field cron expression.
///
/// Construction validates the expression; evaluation via
/// [`next_occurrence`](CronPattern::next_occurrence) is pure and
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronPattern {
	expression: String,
	seconds: u64,
	minutes: u64,
	hours: u64,
	days_of_month: u64,
	months: u64,
	days_of_week: u64,
	dom_restricted: bool,
	dow_restricted: bool,
}

impl CronPattern {
	/// Parse a six-field cron expression.
	pub fn parse(expression: &str) -> Result<Self, PatternError> {
		let fields: Vec<&str> = expression.split_whitespace().collect();
		if fields.len() != 6 {
			return Err(PatternError::FieldCount(fields.len()));
		}

		let mut days_of_week = parse_field(&DAY_OF_WEEK, fields[5])?;
		if days_of_week & (1 << 7) != 0 {
			days_of_week = (days_of_week & !(1 << 7)) | 1;
		}

		Ok(Self {
			expression: expression.to_string(),
			seconds: parse_field(&SECONDS, fields[0])?,
			minutes: parse_field(&MINUTES, fields[1])?,
			hours: parse_field(&HOURS, fields[2])?,
			days_of_month: parse_field(&DAY_OF_MONTH, fields[3])?,
			months: parse_field(&MONTH, fields[4])?,
			days_of_week,
			// Vixie cron: the day-of-month/day-of-week union rule applies
			// when a field is anything other than a bare `*`.
			dom_restricted: fields[3] != "*",
			dow_restricted: fields[5] != "*",
		})
	}

	/// The original expression text.
	pub fn expression(&self) -> &str {
		&self.expression
	}

	/// The earliest whole-second instant strictly after `after` that
	/// matches this pattern.
	///
	/// Fails with [`PatternError::Unsatisfiable`] when no instant within
	/// the search horizon matches (a literal day-of-month/month combination
	/// that never exists, for example).
	pub fn next_occurrence(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, PatternError> {
		self.search(after)
			.ok_or_else(|| PatternError::Unsatisfiable(self.expression.clone()))
	}

	fn search(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
		// Occurrences have whole-second granularity: start at the first
		// second boundary strictly after `after`.
		let mut t = after.with_nanosecond(0)? + Duration::seconds(1);
		let limit = t.checked_add_signed(Duration::days(SEARCH_HORIZON_DAYS))?;

		while t < limit {
			if !bit(self.months, t.month()) {
				t = start_of_next_month(t)?;
				continue;
			}
			if !self.day_matches(t) {
				t = start_of_next_day(t)?;
				continue;
			}
			if !bit(self.hours, t.hour()) {
				t = at(t.date_naive(), t.hour(), 0, 0)? + Duration::hours(1);
				continue;
			}
			if !bit(self.minutes, t.minute()) {
				t = at(t.date_naive(), t.hour(), t.minute(), 0)? + Duration::minutes(1);
				continue;
			}
			if !bit(self.seconds, t.second()) {
				t += Duration::seconds(1);
				continue;
			}
			return Some(t);
		}
		None
	}

	fn day_matches(&self, t: DateTime<Utc>) -> bool {
		let dom = bit(self.days_of_month, t.day());
		let dow = bit(self.days_of_week, t.weekday().num_days_from_sunday());
		if self.dom_restricted && self.dow_restricted {
			// Standard cron: when both fields are restricted, a day matches
			// if either condition holds.
			dom || dow
		} else {
			dom && dow
		}
	}
}

impl FromStr for CronPattern {
	type Err = PatternError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for CronPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.expression)
	}
}

fn bit(mask: u64, value: u32) -> bool {
	mask & (1 << value) != 0
}

fn parse_field(spec: &FieldSpec, field: &str) -> Result<u64, PatternError> {
	let mut mask = 0u64;
	for term in field.split(',') {
		let (base, step) = match term.split_once('/') {
			Some((base, step)) => {
				let step: u32 = step.parse().map_err(|_| PatternError::InvalidField {
					field: spec.name,
					value: term.to_string(),
				})?;
				if step == 0 {
					return Err(PatternError::ZeroStep { field: spec.name });
				}
				(base, step)
			}
			None => (term, 1),
		};

		let (start, end) = if base == "*" {
			(spec.min, spec.max)
		} else if let Some((lo, hi)) = base.split_once('-') {
			let lo = parse_value(spec, lo)?;
			let hi = parse_value(spec, hi)?;
			if lo > hi {
				return Err(PatternError::InvertedRange {
					field: spec.name,
					start: lo,
					end: hi,
				});
			}
			(lo, hi)
		} else {
			let value = parse_value(spec, base)?;
			if term.contains('/') {
				// `a/s` is shorthand for `a-max/s`.
				(value, spec.max)
			} else {
				(value, value)
			}
		};

		let mut value = start;
		while value <= end {
			mask |= 1 << value;
			value += step;
		}
	}
	Ok(mask)
}

fn parse_value(spec: &FieldSpec, value: &str) -> Result<u32, PatternError> {
	if let Ok(number) = value.parse::<u32>() {
		if number < spec.min || number > spec.max {
			return Err(PatternError::OutOfRange {
				field: spec.name,
				value: number,
				min: spec.min,
				max: spec.max,
			});
		}
		return Ok(number);
	}

	let lowered = value.to_ascii_lowercase();
	if let Some(index) = spec.aliases.iter().position(|alias| *alias == lowered) {
		return Ok(spec.min + index as u32);
	}

	Err(PatternError::InvalidField {
		field: spec.name,
		value: value.to_string(),
	})
}

fn at(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Option<DateTime<Utc>> {
	date.and_hms_opt(hour, minute, second).map(|dt| dt.and_utc())
}

fn start_of_next_day(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
	at(t.date_naive().succ_opt()?, 0, 0, 0)
}

fn start_of_next_month(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
	let (year, month) = if t.month() == 12 {
		(t.year() + 1, 1)
	} else {
		(t.year(), t.month() + 1)
	};
	at(NaiveDate::from_ymd_opt(year, month, 1)?, 0, 0, 0)
}
