pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod parser;
pub mod runner;
pub mod session;
pub mod source;
pub mod watch;

// Re-export commonly used types
pub use error::{HttpWatchError, Result};
