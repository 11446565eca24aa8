// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all service seams must implement.

use async_trait::async_trait;

use crate::error::PawlinkError;
use crate::types::{AdapterKind, HealthStatus};

/// The base trait for every Pawlink service adapter.
///
/// Each external collaborator the sync core consumes (store, event feed,
/// identity, notification surface) is reached through an adapter that
/// provides identity, lifecycle, and health check capabilities.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of service this adapter provides.
    fn kind(&self) -> AdapterKind;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, PawlinkError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), PawlinkError>;
}
