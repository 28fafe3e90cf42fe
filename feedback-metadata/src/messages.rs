// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{BuildItem, TestItem};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A message produced by the test pipeline.
///
/// Serialized as JSON with a `type` tag, e.g. `{"type": "run-started"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FeedbackMessage {
    /// A batch of additions and removals to the result set.
    Delta(CacheDelta),

    /// A progress snapshot of the run currently in flight.
    LiveStatus(LiveStatusTick),

    /// A run started.
    RunStarted,

    /// A run finished.
    RunFinished {
        /// The aggregate report for the run.
        report: RunReport,
    },

    /// Informational progress about the run in flight.
    RunInfo(RunInfo),

    /// The outcome of building a single project.
    BuildRunResult(BuildRunResult),
}

impl FeedbackMessage {
    /// Returns the kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Delta(_) => MessageKind::Delta,
            Self::LiveStatus(_) => MessageKind::LiveStatus,
            Self::RunStarted => MessageKind::RunStarted,
            Self::RunFinished { .. } => MessageKind::RunFinished,
            Self::RunInfo(_) => MessageKind::RunInfo,
            Self::BuildRunResult(_) => MessageKind::BuildRunResult,
        }
    }
}

/// The kind of a [`FeedbackMessage`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// [`FeedbackMessage::Delta`].
    Delta,
    /// [`FeedbackMessage::LiveStatus`].
    LiveStatus,
    /// [`FeedbackMessage::RunStarted`].
    RunStarted,
    /// [`FeedbackMessage::RunFinished`].
    RunFinished,
    /// [`FeedbackMessage::RunInfo`].
    RunInfo,
    /// [`FeedbackMessage::BuildRunResult`].
    BuildRunResult,
}

impl MessageKind {
    /// Returns the serialized tag for this kind.
    pub fn to_static_str(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::LiveStatus => "live-status",
            Self::RunStarted => "run-started",
            Self::RunFinished => "run-finished",
            Self::RunInfo => "run-info",
            Self::BuildRunResult => "build-run-result",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_static_str())
    }
}

/// An atomic batch of additions and removals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CacheDelta {
    /// Build errors to add.
    pub errors_to_add: Vec<BuildItem>,

    /// Build errors to remove.
    pub errors_to_remove: Vec<BuildItem>,

    /// Build warnings to add.
    pub warnings_to_add: Vec<BuildItem>,

    /// Build warnings to remove.
    pub warnings_to_remove: Vec<BuildItem>,

    /// Failing tests to add.
    pub failed_to_add: Vec<TestItem>,

    /// Ignored tests to add.
    pub ignored_to_add: Vec<TestItem>,

    /// Tests to remove, matched on assembly, runner and name only.
    pub tests_to_remove: Vec<TestItem>,
}

/// A snapshot of the run in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LiveStatusTick {
    /// The assembly currently being tested.
    pub current_assembly: Utf8PathBuf,

    /// The test currently running. May be blank.
    #[serde(default)]
    pub current_test: String,

    /// The number of tests completed so far.
    pub tests_completed: usize,

    /// The total number of tests, or 0 if unknown.
    #[serde(default)]
    pub total_tests: usize,

    /// Tests that have failed so far in this run.
    #[serde(default)]
    pub failed_tests: Vec<TestItem>,

    /// Tests that were failing and now pass.
    #[serde(default)]
    pub failed_but_now_passing: Vec<TestItem>,
}

/// Aggregate counts for a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RunReport {
    /// The number of projects built.
    pub projects_built: usize,

    /// The number of builds that succeeded.
    pub builds_succeeded: usize,

    /// The number of builds that failed.
    pub builds_failed: usize,

    /// The number of tests run.
    pub tests_ran: usize,

    /// The number of tests that passed.
    pub tests_passed: usize,

    /// The number of tests that failed.
    pub tests_failed: usize,

    /// The number of tests that were ignored.
    pub tests_ignored: usize,

    /// True if the run was aborted before completion.
    pub aborted: bool,
}

/// The phase a [`RunInfo`] message describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InformationType {
    /// A project is being built.
    Build,

    /// Tests are being run.
    TestRun,

    /// Affected tests are being located.
    PreProcessing,
}

/// Informational progress about the run in flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunInfo {
    /// The phase.
    pub info_type: InformationType,

    /// The project the phase applies to.
    #[serde(default)]
    pub project: Utf8PathBuf,
}

/// The outcome of building a single project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildRunResult {
    /// The project that was built.
    pub project: Utf8PathBuf,

    /// The errors produced by the build.
    #[serde(default)]
    pub errors: Vec<BuildItem>,
}

/// A file reported as changed, triggering a rebuild of whatever owns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangedFile {
    /// The path of the changed file.
    pub path: Utf8PathBuf,
}

/// A notification that a set of files changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectChangeMessage {
    /// The changed files, in publication order.
    pub files: Vec<ChangedFile>,
}

impl ProjectChangeMessage {
    /// Adds a changed file to this message.
    pub fn add_file(&mut self, path: impl Into<Utf8PathBuf>) {
        self.files.push(ChangedFile { path: path.into() });
    }
}
