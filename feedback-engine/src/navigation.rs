// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! "Go to source" for feedback entries.

use crate::list::EntryTag;
use camino::{Utf8Path, Utf8PathBuf};
use feedback_metadata::{StackLine, TestItem};

/// A position in a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodePosition {
    /// The file.
    pub file: Utf8PathBuf,

    /// The 1-based line, or 0 if unknown.
    pub line: u32,

    /// The 1-based column, or 0 if unknown.
    pub column: u32,
}

/// Where "go to source" leads for an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A position in a source file.
    Reference(CodePosition),

    /// A type, to be located by the navigator.
    Type {
        /// The assembly defining the type.
        assembly: Utf8PathBuf,

        /// The full type name, with nested types separated by `.`.
        type_name: String,
    },
}

/// Resolves the navigation target for an entry tag.
///
/// Returns `None` if there's nowhere to go.
pub fn resolve(tag: &EntryTag, can_go_to_types: bool) -> Option<NavigationTarget> {
    match tag {
        EntryTag::Build(item) => Some(NavigationTarget::Reference(CodePosition {
            file: item.file.clone(),
            line: item.line,
            column: item.column,
        })),
        EntryTag::Test(item) => resolve_test(item, can_go_to_types),
    }
}

fn resolve_test(item: &TestItem, can_go_to_types: bool) -> Option<NavigationTarget> {
    // Without a stack trace there's no evidence of where the test lives.
    if item.stack_trace.is_empty() {
        return None;
    }
    if let Some(frame) = find_frame(&item.stack_trace, &item.name) {
        return Some(NavigationTarget::Reference(CodePosition {
            file: frame.file.clone(),
            line: frame.line,
            column: 0,
        }));
    }
    can_go_to_types.then(|| NavigationTarget::Type {
        assembly: item.assembly.clone(),
        type_name: item.name.replace('+', "."),
    })
}

// Prefer the frame for the test method itself, then the innermost frame with a line number.
fn find_frame<'a>(stack_trace: &'a [StackLine], test_name: &str) -> Option<&'a StackLine> {
    stack_trace
        .iter()
        .find(|frame| frame.method == test_name)
        .or_else(|| stack_trace.iter().rev().find(|frame| frame.line > 0))
}

/// Performs navigation on behalf of the engine.
pub trait SourceNavigator {
    /// Opens `file` at the given position.
    fn go_to_reference(&mut self, file: &Utf8Path, line: u32, column: u32);

    /// Opens the definition of a type. Returns false if the navigator couldn't handle it.
    fn go_to_type(&mut self, assembly: &Utf8Path, type_name: &str) -> bool;
}

/// Resolves `tag` and navigates to it.
///
/// Returns true if navigation happened.
pub fn navigate(
    tag: &EntryTag,
    can_go_to_types: bool,
    navigator: &mut impl SourceNavigator,
) -> bool {
    match resolve(tag, can_go_to_types) {
        Some(NavigationTarget::Reference(position)) => {
            navigator.go_to_reference(&position.file, position.line, position.column);
            true
        }
        Some(NavigationTarget::Type {
            assembly,
            type_name,
        }) => navigator.go_to_type(&assembly, &type_name),
        None => false,
    }
}
