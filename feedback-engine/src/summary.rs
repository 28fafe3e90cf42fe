// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run summaries.

use feedback_metadata::RunReport;
use std::fmt;

/// The summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    text: String,
    succeeded: bool,
    report: RunReport,
}

impl RunSummary {
    /// Derives a summary from a run report.
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            text: format!(
                "Ran {} build(s) ({} succeeded, {} failed) and {} test(s) \
                 ({} passed, {} failed, {} ignored)",
                report.projects_built,
                report.builds_succeeded,
                report.builds_failed,
                report.tests_ran,
                report.tests_passed,
                report.tests_failed,
                report.tests_ignored,
            ),
            succeeded: report.builds_failed == 0 && report.tests_failed == 0,
            report: *report,
        }
    }

    /// Returns the summary text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if no builds and no tests failed.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Returns the report this summary was derived from.
    pub fn report(&self) -> &RunReport {
        &self.report
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
