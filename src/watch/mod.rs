pub mod coordinator;
pub mod debounce;
pub mod fs;

pub use coordinator::{ReloadHandler, WatchCoordinator, is_reload_trigger};
pub use debounce::DebounceTable;
pub use fs::{FsWatcher, WatchChannels};

use std::path::PathBuf;

/// 监听器错误
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("failed to create file watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("failed to watch {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
