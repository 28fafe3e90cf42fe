// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured messages exchanged between a test-execution pipeline and the feedback engine.
//!
//! The pipeline produces [`FeedbackMessage`] values (typically as JSON lines). The engine
//! reconciles them into a live, ordered list of build diagnostics and test results.

mod exit_codes;
mod items;
mod messages;

pub use exit_codes::*;
pub use items::*;
pub use messages::*;
