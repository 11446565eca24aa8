// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the shared database handle.

pub mod conversations;
pub mod messages;
pub mod profiles;
