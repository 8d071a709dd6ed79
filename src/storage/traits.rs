//! Storage abstraction for dashboard statistics

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Point-in-time dashboard statistics
///
/// Field names are camelCase on the wire to match the dashboard UI contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_servers: u64,
    pub active_monitors: u64,
    pub alerts_today: u64,
    pub restored_files: u64,
}

/// Source of dashboard statistics
///
/// Implementations must not hold any resource (session, pooled handle)
/// beyond the duration of a single `fetch_snapshot` call.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Fetch a fresh stats snapshot
    async fn fetch_snapshot(&self) -> Result<StatsSnapshot>;
}
