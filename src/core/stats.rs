//! Periodic stats publisher
//!
//! A single long-lived task that fetches a snapshot from the stats store
//! and broadcasts it to every connection on a fixed cadence. Fetch or
//! delivery failures are logged and the next cycle proceeds on schedule.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{error, trace};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::core::hub::SharedHub;
use crate::core::message::{ServerMessage, StatsPayload};
use crate::storage::traits::StatsStore;

/// Recurring broadcast of dashboard statistics
pub struct StatsPublisher {
    hub: SharedHub,
    store: Arc<dyn StatsStore>,
    interval: Duration,
}

/// Handle to a running publisher task
///
/// Dropping the handle also stops the task: the shutdown channel closes
/// and the loop exits at its next suspension point.
pub struct PublisherHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PublisherHandle {
    /// Stop the publisher and wait for its task to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

impl StatsPublisher {
    pub fn new(hub: SharedHub, store: Arc<dyn StatsStore>, interval: Duration) -> Self {
        Self {
            hub,
            store,
            interval,
        }
    }

    /// Start the recurring broadcast task
    ///
    /// The first broadcast happens immediately; subsequent ones follow at
    /// the configured interval.
    pub fn spawn(self) -> PublisherHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            loop {
                self.publish_once().await;

                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
            trace!("Stats publisher stopped");
        });

        PublisherHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn publish_once(&self) {
        // The store handle lives only for this call; nothing is held
        // across the sleep.
        match self.store.fetch_snapshot().await {
            Ok(snapshot) => {
                let message = ServerMessage::StatsUpdate {
                    data: StatsPayload {
                        snapshot,
                        timestamp: Utc::now(),
                    },
                };
                let delivered = self.hub.broadcast_all(&message).await;
                trace!("Broadcast stats update to {} clients", delivered);
            }
            Err(e) => {
                error!("Error broadcasting stats: {}", e);
            }
        }
    }
}
