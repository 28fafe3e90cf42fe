// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for reconciling build and test feedback into a live, ordered view.
//!
//! The flow of operations is:
//!
//! 1. Producers send [`FeedbackMessage`](feedback_metadata::FeedbackMessage)s through a cloneable
//!    [`FeedbackRouter`](router::FeedbackRouter).
//! 2. A single [`RouterTask`](router::RouterTask) receives them in arrival order and hands each one
//!    to the [`FeedbackEngine`](engine::FeedbackEngine), which owns all mutable state.
//! 3. The engine applies the message to its [`FeedbackList`](list::FeedbackList), run session and
//!    progress state, mirroring every change to a [`FeedbackDisplay`](display::FeedbackDisplay).

pub mod config;
pub mod display;
pub mod engine;
pub mod errors;
mod helpers;
pub mod list;
mod live_status;
pub mod navigation;
pub mod progress;
pub mod rebuild;
mod reconciler;
pub mod router;
mod selection;
pub mod summary;
#[cfg(test)]
mod test_helpers;
