//! Storage backends for dashboard statistics

pub mod memory;
pub mod traits;

pub use memory::MemoryStatsStore;
pub use traits::{StatsSnapshot, StatsStore};
