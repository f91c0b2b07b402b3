pub mod builder;
pub mod client;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use builder::{BuildError, RequestBuilder};
pub use client::{Client, Transport, TransportError};
pub use request::ParsedRequest;
pub use response::{ParsedResponse, Response};
pub use types::{Method, Status};
