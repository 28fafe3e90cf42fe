// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use feedback_metadata::{BuildItem, TestItem};

/// Formats a build diagnostic for display: `"{message}, {file}"`.
pub(crate) fn format_build_item(item: &BuildItem) -> String {
    format!("{}, {}", item.message, item.file)
}

/// Formats a test result for display: `"{status} -> ({runner}) {display name}"`.
pub(crate) fn format_test_item(item: &TestItem) -> String {
    format!("{} -> ({}) {}", item.status, item.runner, item.display_name)
}

/// Returns the last component of `path`, or the empty string if there is none.
pub(crate) fn file_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or_default()
}

/// Returns the last component of `path` without its extension.
pub(crate) fn file_stem(path: &Utf8Path) -> &str {
    path.file_stem().unwrap_or_default()
}
