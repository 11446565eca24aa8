// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Pawlink messaging sync core.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed CRUD operations for messages,
//! conversations, and profiles, and a send endpoint that announces every
//! insert and read-state change on the workspace change hub.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod sender;

pub use adapter::SqliteMessageStore;
pub use database::Database;
pub use models::*;
pub use sender::StoreSender;
