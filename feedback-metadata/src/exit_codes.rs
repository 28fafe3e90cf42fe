// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `feedback-watch` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum FeedbackExitCode {}

impl FeedbackExitCode {
    /// No errors occurred, and the last completed run (if any) succeeded.
    pub const OK: i32 = 0;

    /// The last completed run had failing builds or failing tests.
    pub const RUN_FAILED: i32 = 100;

    /// No run was completed before the input stream ended.
    pub const NO_RUN_COMPLETED: i32 = 4;

    /// Reading the message stream produced an error.
    pub const INPUT_READ_ERROR: i32 = 102;

    /// A user issue happened while setting up a feedback-watch invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
