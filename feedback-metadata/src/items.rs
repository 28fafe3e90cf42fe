// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single compiler diagnostic: a build error or a build warning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildItem {
    /// The project that produced this diagnostic.
    pub project: Utf8PathBuf,

    /// The source file the diagnostic points at.
    pub file: Utf8PathBuf,

    /// The diagnostic text.
    pub message: String,

    /// The 1-based line number, or 0 if unknown.
    #[serde(default)]
    pub line: u32,

    /// The 1-based column, or 0 if unknown.
    #[serde(default)]
    pub column: u32,
}

impl BuildItem {
    /// Creates a new build item with an unknown position.
    pub fn new(
        project: impl Into<Utf8PathBuf>,
        file: impl Into<Utf8PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            file: file.into(),
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    /// Sets the position of this diagnostic within its file.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Returns the identity of this build item.
    ///
    /// Two diagnostics are the same if they point at the same file with the same text.
    pub fn key(&self) -> BuildKey<'_> {
        BuildKey {
            file: &self.file,
            message: &self.message,
        }
    }
}

/// The identity of a [`BuildItem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildKey<'a> {
    /// The source file.
    pub file: &'a Utf8Path,

    /// The diagnostic text.
    pub message: &'a str,
}

/// The test framework that produced a [`TestItem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TestRunnerKind {
    /// A placeholder runner, used before the actual runner is known.
    Any,

    /// NUnit.
    NUnit,

    /// MSTest.
    #[serde(rename = "MSTest")]
    MsTest,

    /// xUnit.
    XUnit,

    /// MSpec.
    MSpec,

    /// MbUnit.
    MbUnit,

    /// Simple.Testing.
    SimpleTesting,
}

impl TestRunnerKind {
    /// Returns the name of this runner as shown to users.
    pub fn to_static_str(self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::NUnit => "NUnit",
            Self::MsTest => "MSTest",
            Self::XUnit => "XUnit",
            Self::MSpec => "MSpec",
            Self::MbUnit => "MbUnit",
            Self::SimpleTesting => "SimpleTesting",
        }
    }
}

impl fmt::Display for TestRunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_static_str())
    }
}

/// The result of a single test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    /// The test passed.
    Passed,

    /// The test failed.
    Failed,

    /// The test was ignored.
    Ignored,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("Passed"),
            Self::Failed => f.write_str("Failed"),
            Self::Ignored => f.write_str("Ignored"),
        }
    }
}

/// A single frame of a test's stack trace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StackLine {
    /// The fully-qualified method name.
    pub method: String,

    /// The source file, if known.
    #[serde(default)]
    pub file: Utf8PathBuf,

    /// The line number, or 0 if unknown.
    #[serde(default)]
    pub line: u32,
}

/// The outcome of one test, as reported by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestItem {
    /// The assembly (test binary) the test lives in.
    pub assembly: Utf8PathBuf,

    /// The framework that ran the test.
    pub runner: TestRunnerKind,

    /// The fully-qualified test name.
    pub name: String,

    /// The name shown to users. Parameterized tests share a `name` but not a `display_name`.
    pub display_name: String,

    /// The status of the test.
    pub status: TestStatus,

    /// The failure or ignore message.
    #[serde(default)]
    pub message: String,

    /// The stack trace, outermost frame first.
    #[serde(default)]
    pub stack_trace: Vec<StackLine>,
}

impl TestItem {
    /// Creates a new test item with no message and no stack trace.
    pub fn new(
        assembly: impl Into<Utf8PathBuf>,
        runner: TestRunnerKind,
        name: impl Into<String>,
        display_name: impl Into<String>,
        status: TestStatus,
    ) -> Self {
        Self {
            assembly: assembly.into(),
            runner,
            name: name.into(),
            display_name: display_name.into(),
            status,
            message: String::new(),
            stack_trace: Vec::new(),
        }
    }

    /// Returns the key used to remove this test from the result set.
    pub fn key(&self) -> TestKey<'_> {
        TestKey {
            assembly: &self.assembly,
            runner: self.runner,
            name: &self.name,
        }
    }

    /// Returns the key used to decide whether two items describe the same test.
    ///
    /// This is stricter than [`Self::key`]: it also compares the display name.
    pub fn identity(&self) -> TestIdentity<'_> {
        TestIdentity {
            key: self.key(),
            display_name: &self.display_name,
        }
    }

    /// Returns true if `other` describes the same test as `self`.
    pub fn is_same_test_as(&self, other: &TestItem) -> bool {
        self.identity() == other.identity()
    }
}

/// The removal key of a [`TestItem`]: assembly, runner and name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TestKey<'a> {
    /// The assembly.
    pub assembly: &'a Utf8Path,

    /// The runner.
    pub runner: TestRunnerKind,

    /// The test name.
    pub name: &'a str,
}

/// The "same test" identity of a [`TestItem`]: its [`TestKey`] plus the display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TestIdentity<'a> {
    /// The removal key.
    pub key: TestKey<'a>,

    /// The display name.
    pub display_name: &'a str,
}
