// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Pawlink integration tests.
//!
//! Provides an in-memory [`MockStore`] with injectable failures and
//! latency, a capture-only [`MockSurface`], and a [`TestHarness`] wiring
//! the sync core over both.

pub mod harness;
pub mod mock_store;
pub mod mock_surface;

pub use harness::{at, test_conversation, unread_message, view_for, TestHarness};
pub use mock_store::MockStore;
pub use mock_surface::MockSurface;
