pub mod config;
pub mod error;
pub mod suffix;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
