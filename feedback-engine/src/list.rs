// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered list of feedback entries.
//!
//! Entries are grouped into blocks by [`EntryCategory`], and blocks always appear in priority
//! order: build errors, failing tests, build warnings, ignored tests.

use crate::{
    display::FeedbackDisplay,
    errors::DisplayError,
    helpers::{format_build_item, format_test_item},
};
use camino::Utf8Path;
use feedback_metadata::{BuildItem, BuildKey, TestItem, TestKey, TestRunnerKind};
use std::{fmt, ops::Deref};
use tracing::{debug, warn};

/// The category of a [`FeedbackEntry`].
///
/// The derived ordering is the display priority: lower categories are shown first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryCategory {
    /// A build error.
    BuildError,

    /// A failing test.
    TestFailed,

    /// A build warning.
    BuildWarning,

    /// An ignored test.
    TestIgnored,
}

impl EntryCategory {
    /// All categories, in priority order.
    pub const ALL: [Self; 4] = [
        Self::BuildError,
        Self::TestFailed,
        Self::BuildWarning,
        Self::TestIgnored,
    ];

    /// Returns the label shown to users for this category.
    pub fn label(self) -> &'static str {
        match self {
            Self::BuildError => "Build error",
            Self::TestFailed => "Test failed",
            Self::BuildWarning => "Build warning",
            Self::TestIgnored => "Test ignored",
        }
    }

    /// Returns the color entries of this category are shown in.
    pub fn color(self) -> FeedbackColor {
        match self {
            Self::BuildError | Self::TestFailed => FeedbackColor::Red,
            Self::BuildWarning | Self::TestIgnored => FeedbackColor::Black,
        }
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A color used for entries and messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackColor {
    /// Default text color.
    Black,

    /// Failures.
    Red,

    /// Successes.
    Green,
}

impl FeedbackColor {
    /// Returns the lowercase name of this color.
    pub fn to_static_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
        }
    }
}

/// The item a [`FeedbackEntry`] was created from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryTag {
    /// A build diagnostic.
    Build(BuildItem),

    /// A test result.
    Test(TestItem),
}

impl EntryTag {
    /// Returns the build item, if this is a build tag.
    pub fn as_build(&self) -> Option<&BuildItem> {
        match self {
            Self::Build(item) => Some(item),
            Self::Test(_) => None,
        }
    }

    /// Returns the test item, if this is a test tag.
    pub fn as_test(&self) -> Option<&TestItem> {
        match self {
            Self::Build(_) => None,
            Self::Test(item) => Some(item),
        }
    }

    /// Returns true if `self` and `other` identify the same diagnostic or the same test.
    ///
    /// Build tags are compared by file and message; test tags by the "same test" identity.
    /// A test whose status changed is still the same entry by this measure.
    pub fn same_identity(&self, other: &EntryTag) -> bool {
        match (self, other) {
            (Self::Build(a), Self::Build(b)) => a.key() == b.key(),
            (Self::Test(a), Self::Test(b)) => a.is_same_test_as(b),
            _ => false,
        }
    }
}

/// A single row of feedback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackEntry {
    /// The category of this entry.
    pub category: EntryCategory,

    /// The formatted text.
    pub text: String,

    /// The color the text is shown in.
    pub color: FeedbackColor,

    /// The item this entry was created from.
    pub tag: EntryTag,
}

impl FeedbackEntry {
    /// Creates an entry for a build diagnostic.
    pub fn for_build(category: EntryCategory, item: BuildItem) -> Self {
        Self {
            category,
            text: format_build_item(&item),
            color: category.color(),
            tag: EntryTag::Build(item),
        }
    }

    /// Creates an entry for a test result.
    pub fn for_test(category: EntryCategory, item: TestItem) -> Self {
        Self {
            category,
            text: format_test_item(&item),
            color: category.color(),
            tag: EntryTag::Test(item),
        }
    }
}

/// The live, ordered set of feedback entries.
///
/// Only the engine mutates this list; each mutation is mirrored to a [`FeedbackDisplay`].
#[derive(Clone, Debug, Default)]
pub struct FeedbackList {
    entries: Vec<FeedbackEntry>,
}

impl FeedbackList {
    /// Creates a new, empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entries in display order.
    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    /// Returns an iterator over the entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, FeedbackEntry> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries in `category`.
    pub fn count(&self, category: EntryCategory) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .count()
    }

    /// Returns the index at which a new entry of `category` is inserted.
    ///
    /// This is the index of the first entry whose category has the same or lower priority, or the
    /// end of the list if there is none.
    pub fn insertion_index(&self, category: EntryCategory) -> usize {
        self.entries
            .iter()
            .position(|entry| entry.category >= category)
            .unwrap_or(self.entries.len())
    }

    /// Returns true if an entry for the same test as `item` exists.
    pub fn contains_same_test(&self, item: &TestItem) -> bool {
        self.entries.iter().any(|entry| {
            entry
                .tag
                .as_test()
                .is_some_and(|existing| existing.is_same_test_as(item))
        })
    }

    /// Applies `f` to the list as a single step, then mirrors the step to `display`.
    ///
    /// The step is all-or-nothing: if the display rejects any change, changes it already accepted
    /// are taken back, the list is restored to how it was before the step, and the error is
    /// returned.
    pub(crate) fn edit<T>(
        &mut self,
        display: &mut impl FeedbackDisplay,
        f: impl FnOnce(&mut ListEdit<'_>) -> T,
    ) -> Result<T, DisplayError> {
        let mut edit = ListEdit {
            list: self,
            journal: Vec::new(),
        };
        let out = f(&mut edit);
        edit.commit(display)?;
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a FeedbackList {
    type Item = &'a FeedbackEntry;
    type IntoIter = std::slice::Iter<'a, FeedbackEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A change made to the list, in the order it was made.
#[derive(Clone, Debug)]
enum ListChange {
    Inserted { index: usize, entry: FeedbackEntry },
    Removed { index: usize, entry: FeedbackEntry },
    Cleared { entries: Vec<FeedbackEntry> },
}

impl ListChange {
    fn publish(&self, display: &mut impl FeedbackDisplay) -> Result<(), DisplayError> {
        match self {
            Self::Inserted { index, entry } => display.insert_entry(*index, entry),
            Self::Removed { index, entry } => display.remove_entry(*index, entry),
            Self::Cleared { .. } => display.clear_entries(),
        }
    }

    fn retract(&self, display: &mut impl FeedbackDisplay) -> Result<(), DisplayError> {
        match self {
            Self::Inserted { index, entry } => display.remove_entry(*index, entry),
            Self::Removed { index, entry } => display.insert_entry(*index, entry),
            Self::Cleared { entries } => entries
                .iter()
                .enumerate()
                .try_for_each(|(index, entry)| display.insert_entry(index, entry)),
        }
    }

    fn undo(self, entries: &mut Vec<FeedbackEntry>) {
        match self {
            Self::Inserted { index, .. } => {
                entries.remove(index);
            }
            Self::Removed { index, entry } => entries.insert(index, entry),
            Self::Cleared { entries: old } => *entries = old,
        }
    }
}

/// An in-progress step over a [`FeedbackList`], created by [`FeedbackList::edit`].
///
/// Changes apply to the list immediately, so lookups through `Deref` see them. They're mirrored
/// to the display only once the step completes.
#[derive(Debug)]
pub(crate) struct ListEdit<'a> {
    list: &'a mut FeedbackList,
    journal: Vec<ListChange>,
}

impl Deref for ListEdit<'_> {
    type Target = FeedbackList;

    fn deref(&self) -> &FeedbackList {
        self.list
    }
}

impl ListEdit<'_> {
    pub(crate) fn insert(&mut self, index: usize, entry: FeedbackEntry) {
        debug_assert!(index <= self.list.entries.len(), "insertion index out of bounds");
        self.list.entries.insert(index, entry.clone());
        self.journal.push(ListChange::Inserted { index, entry });
    }

    /// Removes every build entry matching `key`. Returns the number of entries removed.
    pub(crate) fn remove_build(&mut self, key: BuildKey<'_>) -> usize {
        self.remove_matching(|tag| tag.as_build().is_some_and(|item| item.key() == key))
    }

    /// Removes every test entry matching `key`, regardless of display name.
    pub(crate) fn remove_test_key(&mut self, key: TestKey<'_>) -> usize {
        self.remove_matching(|tag| tag.as_test().is_some_and(|item| item.key() == key))
    }

    /// Removes every entry for the same test as `item`.
    pub(crate) fn remove_same_test(&mut self, item: &TestItem) -> usize {
        self.remove_matching(|tag| {
            tag.as_test()
                .is_some_and(|existing| existing.is_same_test_as(item))
        })
    }

    /// Removes every test entry produced by `runner`.
    pub(crate) fn remove_runner(&mut self, runner: TestRunnerKind) -> usize {
        self.remove_matching(|tag| tag.as_test().is_some_and(|item| item.runner == runner))
    }

    /// Removes build entries owned by `project`, or every build entry if `project` is `None`.
    pub(crate) fn remove_builds(&mut self, project: Option<&Utf8Path>) -> usize {
        self.remove_matching(|tag| {
            tag.as_build()
                .is_some_and(|item| project.is_none_or(|p| item.project.as_path() == p))
        })
    }

    pub(crate) fn clear(&mut self) {
        let entries = std::mem::take(&mut self.list.entries);
        self.journal.push(ListChange::Cleared { entries });
    }

    fn remove_matching(&mut self, matches: impl Fn(&EntryTag) -> bool) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while index < self.list.entries.len() {
            if matches(&self.list.entries[index].tag) {
                let entry = self.list.entries.remove(index);
                self.journal.push(ListChange::Removed { index, entry });
                removed += 1;
            } else {
                index += 1;
            }
        }
        removed
    }

    fn commit(self, display: &mut impl FeedbackDisplay) -> Result<(), DisplayError> {
        let Self { list, journal } = self;
        let Some((failed_at, err)) = journal.iter().enumerate().find_map(|(n, change)| {
            change.publish(display).err().map(|err| (n, err))
        }) else {
            return Ok(());
        };

        // Take back what the display already accepted, newest first.
        for change in journal[..failed_at].iter().rev() {
            if let Err(retract_err) = change.retract(display) {
                warn!("display rejected rollback of a partially applied change: {retract_err}");
                break;
            }
        }
        for change in journal.into_iter().rev() {
            change.undo(&mut list.entries);
        }
        debug!(changes = failed_at, "rolled back list step");
        Err(err)
    }
}
