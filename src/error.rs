use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum FleetWatchError {
    // Connection errors
    ConnectionNotFound(String),
    ConnectionClosed,

    // Message errors
    MessageParseError(String),
    MessageSerializeError(String),

    // Store errors
    StoreError(String),

    // Configuration errors
    ConfigError(String),

    // System errors
    SystemError(String),
}

impl fmt::Display for FleetWatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionNotFound(id) => write!(f, "Connection not found: {}", id),
            Self::ConnectionClosed => write!(f, "Connection closed unexpectedly"),
            Self::MessageParseError(msg) => write!(f, "Message parse error: {}", msg),
            Self::MessageSerializeError(msg) => write!(f, "Message serialize error: {}", msg),
            Self::StoreError(msg) => write!(f, "Store error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
        }
    }
}

impl Error for FleetWatchError {}

// Generic result type for FleetWatch
pub type Result<T> = std::result::Result<T, FleetWatchError>;
