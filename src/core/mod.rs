//! Core functionality for the real-time notification subsystem

pub mod connection;
pub mod hub;
pub mod message;
pub mod registry;
pub mod stats;

// Re-export main components for convenience
pub use connection::Connection;
pub use hub::{create_hub, Hub, SharedHub};
pub use message::{ClientMessage, ServerMessage, StatsPayload};
pub use registry::ConnectionRegistry;
pub use stats::{PublisherHandle, StatsPublisher};
