// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watch a stream of build and test feedback in the terminal.
//!
//! `feedback-watch watch` reads feedback messages as JSON lines, feeds them through a
//! [`feedback_engine`] router, and prints every change to the live list as it happens. At the end
//! of the input it prints the entries that remain.

#![warn(missing_docs)]

mod dispatch;
mod display;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, StderrStyles};
