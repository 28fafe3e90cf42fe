// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Applies [`CacheDelta`]s to a [`FeedbackList`].

use crate::{
    config::VisibilityConfig,
    display::FeedbackDisplay,
    errors::DisplayError,
    list::{EntryCategory, FeedbackEntry, FeedbackList, ListEdit},
};
use feedback_metadata::{BuildItem, CacheDelta, TestItem};

/// Counts describing what a delta did to the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DeltaOutcome {
    pub(crate) added: usize,
    pub(crate) removed: usize,
    pub(crate) duplicates: usize,
}

/// Applies `delta` to `list`.
///
/// Removals are applied first and unconditionally. Additions are then applied one category at a
/// time in priority order, each skipped entirely if `visibility` hides that category. The delta is
/// applied as a single step: if the display rejects any part of it, none of it is applied.
pub(crate) fn apply_delta(
    list: &mut FeedbackList,
    delta: CacheDelta,
    visibility: &VisibilityConfig,
    display: &mut impl FeedbackDisplay,
) -> Result<DeltaOutcome, DisplayError> {
    list.edit(display, |edit| stage_delta(edit, delta, visibility))
}

fn stage_delta(
    edit: &mut ListEdit<'_>,
    delta: CacheDelta,
    visibility: &VisibilityConfig,
) -> DeltaOutcome {
    let CacheDelta {
        errors_to_add,
        errors_to_remove,
        warnings_to_add,
        warnings_to_remove,
        failed_to_add,
        ignored_to_add,
        tests_to_remove,
    } = delta;

    let mut outcome = DeltaOutcome::default();

    for item in errors_to_remove.iter().chain(&warnings_to_remove) {
        outcome.removed += edit.remove_build(item.key());
    }
    for item in &tests_to_remove {
        outcome.removed += edit.remove_test_key(item.key());
    }

    if visibility.show_errors {
        add_builds(edit, EntryCategory::BuildError, errors_to_add, &mut outcome);
    }
    if visibility.show_failing_tests {
        add_tests(edit, EntryCategory::TestFailed, failed_to_add, &mut outcome);
    }
    if visibility.show_warnings {
        add_builds(edit, EntryCategory::BuildWarning, warnings_to_add, &mut outcome);
    }
    if visibility.show_ignored_tests {
        add_tests(edit, EntryCategory::TestIgnored, ignored_to_add, &mut outcome);
    }

    outcome
}

/// Inserts a single test at the head of its category block, unless the same test is already
/// present. Returns true if the test was inserted.
pub(crate) fn insert_test(edit: &mut ListEdit<'_>, category: EntryCategory, item: TestItem) -> bool {
    if edit.contains_same_test(&item) {
        return false;
    }
    let index = edit.insertion_index(category);
    edit.insert(index, FeedbackEntry::for_test(category, item));
    true
}

// The insertion index is computed once per batch, so a batch keeps its own order and lands ahead
// of older entries in the same category.

fn add_builds(
    edit: &mut ListEdit<'_>,
    category: EntryCategory,
    items: Vec<BuildItem>,
    outcome: &mut DeltaOutcome,
) {
    let mut index = edit.insertion_index(category);
    for item in items {
        edit.insert(index, FeedbackEntry::for_build(category, item));
        index += 1;
        outcome.added += 1;
    }
}

fn add_tests(
    edit: &mut ListEdit<'_>,
    category: EntryCategory,
    items: Vec<TestItem>,
    outcome: &mut DeltaOutcome,
) {
    let mut index = edit.insertion_index(category);
    for item in items {
        if edit.contains_same_test(&item) {
            outcome.duplicates += 1;
            continue;
        }
        edit.insert(index, FeedbackEntry::for_test(category, item));
        index += 1;
        outcome.added += 1;
    }
}
