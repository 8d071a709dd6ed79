//! In-memory stats store
//!
//! Counters mutated by the surrounding CRUD layer. Derived fields follow
//! the dashboard's placeholder heuristics: three monitors per server
//! (permissions, files, restore) and restored files as half of today's
//! alerts.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::traits::{StatsSnapshot, StatsStore};

#[derive(Debug, Default)]
struct Counters {
    active_servers: u64,
    alerts_today: u64,
}

/// Stats store backed by in-process counters
pub struct MemoryStatsStore {
    counters: RwLock<Counters>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(Counters::default()),
        }
    }

    /// Record that a monitored server became active
    pub async fn server_added(&self) {
        self.counters.write().await.active_servers += 1;
    }

    /// Record that a monitored server was removed
    pub async fn server_removed(&self) {
        let mut counters = self.counters.write().await;
        counters.active_servers = counters.active_servers.saturating_sub(1);
    }

    /// Record an alert for today's tally
    pub async fn alert_recorded(&self) {
        self.counters.write().await.alerts_today += 1;
    }

    /// Reset the daily alert tally
    pub async fn reset_daily_counters(&self) {
        self.counters.write().await.alerts_today = 0;
    }
}

impl Default for MemoryStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn fetch_snapshot(&self) -> Result<StatsSnapshot> {
        let counters = self.counters.read().await;

        Ok(StatsSnapshot {
            total_servers: counters.active_servers,
            active_monitors: counters.active_servers * 3,
            alerts_today: counters.alerts_today,
            restored_files: counters.alerts_today / 2,
        })
    }
}
