// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    display::FeedbackDisplay,
    errors::DisplayError,
    list::{EntryTag, FeedbackList},
};

/// The display's selection, captured before the list is mutated.
#[derive(Clone, Debug, Default)]
pub(crate) struct SelectionSnapshot {
    tags: Vec<EntryTag>,
}

impl SelectionSnapshot {
    pub(crate) fn capture(display: &impl FeedbackDisplay) -> Self {
        Self {
            tags: display.selected_tags(),
        }
    }

    /// Re-selects every captured entry that survived the mutation.
    ///
    /// Entries are matched by identity, so a test whose entry was replaced with a fresh status
    /// stays selected. Entries that were removed are dropped from the selection.
    pub(crate) fn restore(
        self,
        list: &FeedbackList,
        display: &mut impl FeedbackDisplay,
    ) -> Result<(), DisplayError> {
        if self.tags.is_empty() {
            return Ok(());
        }
        let surviving: Vec<EntryTag> = list
            .iter()
            .filter(|entry| self.tags.iter().any(|tag| tag.same_identity(&entry.tag)))
            .map(|entry| entry.tag.clone())
            .collect();
        display.select_tags(&surviving)
    }
}
