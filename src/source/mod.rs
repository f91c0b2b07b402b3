pub mod loader;

pub use loader::{SourceError, SourceLoader};
