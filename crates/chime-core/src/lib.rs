// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the chime cron scheduler.
//!
//! This crate holds the pieces that are pure and runtime-free: the [`Job`]
//! record persisted per schedule, the six-field [`CronPattern`] evaluator,
//! and the [`PatternError`] taxonomy. Everything here is deterministic --
//! independent scheduler instances must converge on identical `next_run`
//! values given identical inputs, so nothing in this crate reads the clock.

pub mod error;
pub mod job;
pub mod pattern;

pub use error::PatternError;
pub use job::Job;
pub use pattern::CronPattern;
