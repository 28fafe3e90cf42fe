// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handling for progress snapshots of an in-flight run.

use crate::{
    display::FeedbackDisplay,
    errors::DisplayError,
    helpers::file_stem,
    list::{EntryCategory, FeedbackList},
    reconciler::insert_test,
};
use feedback_metadata::{LiveStatusTick, TestItem};
use swrite::{SWrite, swrite};

/// Formats the status line for a tick.
///
/// For example: `testing Ns.Case in app.tests (3 of 10 tests completed)`. The " of N" part is
/// left out when the total is unknown.
pub(crate) fn status_line(tick: &LiveStatusTick) -> String {
    let mut line = String::from("testing ");
    if !tick.current_test.trim().is_empty() {
        swrite!(line, "{} in ", tick.current_test);
    }
    swrite!(
        line,
        "{} ({}",
        file_stem(&tick.current_assembly),
        tick.tests_completed
    );
    if tick.total_tests > 0 {
        swrite!(line, " of {}", tick.total_tests);
    }
    line.push_str(" tests completed)");
    line
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TickOutcome {
    pub(crate) now_passing: usize,
    pub(crate) failing: usize,
}

/// Applies the test lists of a tick to `list`.
///
/// Tests that went back to passing lose their entry. Each failing test has any stale entry
/// replaced by a fresh one, so there's at most one entry per failing test, reflecting the latest
/// tick.
pub(crate) fn apply_tick(
    list: &mut FeedbackList,
    failed_tests: Vec<TestItem>,
    failed_but_now_passing: Vec<TestItem>,
    display: &mut impl FeedbackDisplay,
) -> Result<TickOutcome, DisplayError> {
    list.edit(display, |edit| {
        let mut outcome = TickOutcome::default();

        for test in &failed_but_now_passing {
            outcome.now_passing += edit.remove_same_test(test);
        }

        for test in failed_tests {
            edit.remove_same_test(&test);
            if insert_test(edit, EntryCategory::TestFailed, test) {
                outcome.failing += 1;
            }
        }

        outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{RecordingDisplay, failed_test, ignored_test};
    use crate::{list::FeedbackEntry, reconciler::apply_delta};
    use feedback_metadata::{CacheDelta, TestStatus};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn tick(current_test: &str, completed: usize, total: usize) -> LiveStatusTick {
        LiveStatusTick {
            current_assembly: "bin/Debug/app.tests.dll".into(),
            current_test: current_test.to_owned(),
            tests_completed: completed,
            total_tests: total,
            ..LiveStatusTick::default()
        }
    }

    #[test_case("Ns.Case", 3, 10, "testing Ns.Case in app.tests (3 of 10 tests completed)" ; "known total")]
    #[test_case("", 3, 0, "testing app.tests (3 tests completed)" ; "unknown total, no test")]
    #[test_case("  ", 0, 4, "testing app.tests (0 of 4 tests completed)" ; "blank test name")]
    fn test_status_line(current_test: &str, completed: usize, total: usize, expected: &str) {
        assert_eq!(status_line(&tick(current_test, completed, total)), expected);
    }

    #[test]
    fn test_flaky_transition() {
        let mut list = FeedbackList::new();
        let mut display = RecordingDisplay::default();
        let flaky = failed_test("Ns.Flaky", "Flaky");

        let outcome = apply_tick(&mut list, vec![flaky.clone()], Vec::new(), &mut display).unwrap();
        assert_eq!(outcome.failing, 1);
        assert_eq!(display.texts(), vec!["Failed -> (NUnit) Flaky"]);

        let mut passing = flaky.clone();
        passing.status = TestStatus::Passed;
        let outcome = apply_tick(&mut list, Vec::new(), vec![passing], &mut display).unwrap();
        assert_eq!(outcome.now_passing, 1);
        assert!(list.is_empty());
        assert!(display.entries.is_empty());
    }

    #[test]
    fn test_repeated_failures_keep_one_entry() {
        let mut list = FeedbackList::new();
        let mut display = RecordingDisplay::default();
        let test = failed_test("Ns.Case", "Case");

        for _ in 0..3 {
            apply_tick(&mut list, vec![test.clone()], Vec::new(), &mut display).unwrap();
        }
        assert_eq!(list.len(), 1);

        // A later tick with a different status replaces the entry rather than being deduplicated
        // away.
        let mut latest = test.clone();
        latest.message = "expected 2, got 3".to_owned();
        apply_tick(&mut list, vec![latest.clone()], Vec::new(), &mut display).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0], FeedbackEntry::for_test(EntryCategory::TestFailed, latest));
    }

    #[test]
    fn test_failures_land_in_their_block() {
        let mut list = FeedbackList::new();
        let mut display = RecordingDisplay::default();
        apply_delta(
            &mut list,
            CacheDelta {
                errors_to_add: vec![crate::test_helpers::build_item("a.cs", "E1")],
                ignored_to_add: vec![ignored_test("Ns.I", "I")],
                ..CacheDelta::default()
            },
            &Default::default(),
            &mut display,
        )
        .unwrap();

        apply_tick(
            &mut list,
            vec![failed_test("Ns.A", "A")],
            Vec::new(),
            &mut display,
        )
        .unwrap();
        assert_eq!(
            display.categories(),
            vec![
                EntryCategory::BuildError,
                EntryCategory::TestFailed,
                EntryCategory::TestIgnored,
            ]
        );
    }

    #[test]
    fn test_now_passing_matches_display_name() {
        let mut list = FeedbackList::new();
        let mut display = RecordingDisplay::default();
        apply_tick(
            &mut list,
            vec![failed_test("Ns.P", "P(1)"), failed_test("Ns.P", "P(2)")],
            Vec::new(),
            &mut display,
        )
        .unwrap();

        apply_tick(&mut list, Vec::new(), vec![failed_test("Ns.P", "P(1)")], &mut display).unwrap();
        assert_eq!(display.texts(), vec!["Failed -> (NUnit) P(2)"]);
    }
}
