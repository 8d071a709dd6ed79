//! Connection registry and topic subscription index
//!
//! Pure bookkeeping: which connections are alive and which topics each one
//! is subscribed to. No network I/O happens here. The registry is a plain
//! synchronous struct; `Hub` wraps it in a single lock so that mutations
//! and broadcast snapshots are serialized without holding the lock during
//! connection writes.

use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use warp::ws::Message as WsMessage;

use crate::core::connection::Connection;

/// Manages the set of live connections and the topic -> subscribers index
pub struct ConnectionRegistry {
    connections: HashMap<String, Connection>,
    subscribers: HashMap<String, HashSet<String>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            subscribers: HashMap::new(),
        }
    }

    /// Register a new connection and return its ID
    pub fn register(&mut self, sender: mpsc::UnboundedSender<WsMessage>) -> String {
        let connection = Connection::new(sender);
        let id = connection.id.clone();
        self.connections.insert(id.clone(), connection);
        id
    }

    /// Remove a connection from the active set and from every topic's
    /// subscriber set. Idempotent: removing an unknown ID is a no-op.
    pub fn deregister(&mut self, id: &str) -> Option<Connection> {
        let removed = self.connections.remove(id);

        if removed.is_some() {
            self.subscribers.retain(|_, members| {
                members.remove(id);
                !members.is_empty()
            });
        }

        removed
    }

    /// Subscribe a registered connection to a topic
    ///
    /// A subscribe for an unregistered connection is dropped: a disconnect
    /// racing a queued subscribe must not leave an orphan reference behind.
    /// Empty topics and duplicate subscriptions are also no-ops.
    pub fn subscribe(&mut self, id: &str, topic: &str) {
        if topic.is_empty() || !self.connections.contains_key(id) {
            return;
        }

        self.subscribers
            .entry(topic.to_string())
            .or_insert_with(HashSet::new)
            .insert(id.to_string());
    }

    /// Remove a subscription if present; no-op otherwise
    pub fn unsubscribe(&mut self, id: &str, topic: &str) {
        if let Some(members) = self.subscribers.get_mut(topic) {
            members.remove(id);
            if members.is_empty() {
                self.subscribers.remove(topic);
            }
        }
    }

    /// Snapshot of the IDs currently subscribed to a topic
    pub fn subscribers_of(&self, topic: &str) -> Vec<String> {
        self.subscribers
            .get(topic)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Check whether a connection is in the active set
    pub fn is_registered(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    /// Current number of live connections
    pub fn active_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshot of every connection's outbound channel, for a global fan-out
    pub fn all_senders(&self) -> Vec<(String, mpsc::UnboundedSender<WsMessage>)> {
        self.connections
            .iter()
            .map(|(id, conn)| (id.clone(), conn.sender.clone()))
            .collect()
    }

    /// Snapshot of the outbound channels of a topic's subscribers
    pub fn topic_senders(&self, topic: &str) -> Vec<(String, mpsc::UnboundedSender<WsMessage>)> {
        self.subscribers
            .get(topic)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|id| {
                        self.connections
                            .get(id)
                            .map(|conn| (id.clone(), conn.sender.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Outbound channel of a single connection, if registered
    pub fn sender_of(&self, id: &str) -> Option<mpsc::UnboundedSender<WsMessage>> {
        self.connections.get(id).map(|conn| conn.sender.clone())
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
