//! FleetWatch - real-time notification backend for a fleet-monitoring dashboard
//!
//! This library provides the WebSocket subsystem of the dashboard: connection
//! registration, topic-based subscriptions, fan-out broadcasting with
//! per-connection failure isolation, and the periodic stats publisher.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
