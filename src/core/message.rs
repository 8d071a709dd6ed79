//! Wire message envelopes for the dashboard WebSocket channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::traits::StatsSnapshot;

/// Client-to-server control messages
///
/// The `topic` field is optional on the wire: a subscribe or unsubscribe
/// without a topic is dropped by the session loop rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to a topic
    Subscribe { topic: Option<String> },

    /// Unsubscribe from a topic
    Unsubscribe { topic: Option<String> },

    /// Keep-alive probe
    Ping,
}

/// Server-to-client messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription acknowledgement
    Subscribed { topic: String },

    /// Unsubscription acknowledgement
    Unsubscribed { topic: String },

    /// Keep-alive reply
    Pong,

    /// Periodic dashboard stats broadcast
    StatsUpdate { data: StatsPayload },
}

/// Payload of a `stats_update` message: the store snapshot plus the
/// generation timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(flatten)]
    pub snapshot: StatsSnapshot,
    pub timestamp: DateTime<Utc>,
}
