//! Fan-out hub that coordinates the registry and message delivery
//!
//! All registry mutations and broadcast snapshots go through one lock.
//! Delivery happens after the lock is released, so a slow or broken client
//! never blocks registration of unrelated connections.

use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use warp::ws::Message as WsMessage;

use crate::core::message::ServerMessage;
use crate::core::registry::ConnectionRegistry;
use log::{debug, error, trace, warn};

/// Coordinates connection registration, topic subscriptions and fan-out
pub struct Hub {
    registry: RwLock<ConnectionRegistry>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(ConnectionRegistry::new()),
        }
    }

    /// Register a new connection, returning its assigned ID
    pub async fn register(&self, sender: mpsc::UnboundedSender<WsMessage>) -> String {
        let mut registry = self.registry.write().await;
        let id = registry.register(sender);
        debug!(
            "Client connected: {} (active: {})",
            id,
            registry.active_count()
        );
        id
    }

    /// Deregister a connection and clear all of its subscriptions
    pub async fn deregister(&self, id: &str) {
        let mut registry = self.registry.write().await;
        if let Some(conn) = registry.deregister(id) {
            debug!(
                "Client disconnected: {} after {:?} (active: {})",
                id,
                conn.connected_at.elapsed(),
                registry.active_count()
            );
        }
    }

    /// Subscribe a connection to a topic
    pub async fn subscribe(&self, id: &str, topic: &str) {
        let mut registry = self.registry.write().await;
        registry.subscribe(id, topic);
    }

    /// Unsubscribe a connection from a topic
    pub async fn unsubscribe(&self, id: &str, topic: &str) {
        let mut registry = self.registry.write().await;
        registry.unsubscribe(id, topic);
    }

    /// Current number of live connections
    pub async fn active_count(&self) -> usize {
        self.registry.read().await.active_count()
    }

    /// Deliver a message to every registered connection
    ///
    /// Returns the number of successful deliveries. Per-connection failures
    /// are isolated: the failing connection is deregistered and delivery to
    /// the rest proceeds.
    pub async fn broadcast_all(&self, message: &ServerMessage) -> usize {
        let targets = self.registry.read().await.all_senders();
        self.deliver(targets, message).await
    }

    /// Deliver a message to the current subscribers of a topic
    ///
    /// The subscriber set is snapshotted at call time: connections that
    /// subscribe while delivery is in flight do not receive this message.
    pub async fn broadcast_to_topic(&self, topic: &str, message: &ServerMessage) -> usize {
        let targets = self.registry.read().await.topic_senders(topic);
        self.deliver(targets, message).await
    }

    /// Send a message to a single connection
    ///
    /// Returns false when the connection is unknown or its channel is
    /// closed; a closed channel triggers deregistration.
    pub async fn send_to(&self, id: &str, message: &ServerMessage) -> bool {
        let sender = self.registry.read().await.sender_of(id);

        let sender = match sender {
            Some(sender) => sender,
            None => return false,
        };

        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize message for {}: {}", id, e);
                return false;
            }
        };

        if sender.send(WsMessage::text(text)).is_ok() {
            true
        } else {
            warn!("Failed to send message to client {}, deregistering", id);
            self.deregister(id).await;
            false
        }
    }

    /// Deregister every connection; used during process shutdown
    pub async fn drain(&self) {
        let ids: Vec<String> = {
            let registry = self.registry.read().await;
            registry
                .all_senders()
                .into_iter()
                .map(|(id, _)| id)
                .collect()
        };

        for id in ids {
            self.deregister(&id).await;
        }
    }

    async fn deliver(
        &self,
        targets: Vec<(String, mpsc::UnboundedSender<WsMessage>)>,
        message: &ServerMessage,
    ) -> usize {
        if targets.is_empty() {
            return 0;
        }

        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize broadcast message: {}", e);
                return 0;
            }
        };
        let ws_message = WsMessage::text(text);

        let mut sent_count = 0;
        let mut failed: Vec<String> = Vec::new();

        // The lock is not held here; a send only fails when the receiving
        // half of the channel is gone, i.e. the client's forward task died.
        for (id, sender) in targets {
            if sender.send(ws_message.clone()).is_ok() {
                trace!("Message delivered to client {}", id);
                sent_count += 1;
            } else {
                warn!("Delivery failed for client {}", id);
                failed.push(id);
            }
        }

        for id in failed {
            self.deregister(&id).await;
        }

        sent_count
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

// Shared reference to the hub
pub type SharedHub = Arc<Hub>;

/// Create a new shared hub
pub fn create_hub() -> SharedHub {
    Arc::new(Hub::new())
}
