pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, Defaults, FileConfig};
pub use types::{
    ConfigError, Exclusions, HttpSource, RawConfig, RunConfig, WatchTarget, has_http_extension,
};
