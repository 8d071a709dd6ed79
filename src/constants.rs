// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const WS_PATH: &str = "ws";

// Stats publisher configuration constants
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 5;
