use crate::config::WatchTarget;
use crate::watch::WatchError;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// 文件系统监听器及其事件、错误通道
///
/// 监听器被 drop 时两个通道随之关闭，协调循环据此结束
pub struct FsWatcher {
    _watcher: RecommendedWatcher,
}

pub struct WatchChannels {
    pub events: UnboundedReceiver<Event>,
    pub errors: UnboundedReceiver<notify::Error>,
}

impl FsWatcher {
    /// 目录递归监听，单个文件非递归
    pub fn start(target: &WatchTarget) -> Result<(Self, WatchChannels), WatchError> {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (errors_tx, errors) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let _ = events_tx.send(event);
                }
                Err(error) => {
                    let _ = errors_tx.send(error);
                }
            },
            Config::default(),
        )
        .map_err(WatchError::Init)?;

        let mode = match target {
            WatchTarget::Folder(_) => RecursiveMode::Recursive,
            WatchTarget::File(_) => RecursiveMode::NonRecursive,
        };
        watcher
            .watch(target.path(), mode)
            .map_err(|source| WatchError::Watch {
                path: target.path().to_path_buf(),
                source,
            })?;

        tracing::info!("Watching {}", target.path().display());
        Ok((Self { _watcher: watcher }, WatchChannels { events, errors }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_path_is_error() {
        let target = WatchTarget::Folder("/definitely/not/here".into());
        assert!(matches!(
            FsWatcher::start(&target),
            Err(WatchError::Watch { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_produces_event() {
        let dir = TempDir::new().unwrap();
        let (_watcher, mut channels) = FsWatcher::start(&WatchTarget::Folder(dir.path().to_path_buf())).unwrap();

        std::fs::write(dir.path().join("api.http"), "GET http://localhost/").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), channels.events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(!event.paths.is_empty());
    }

    #[tokio::test]
    async fn test_dropping_watcher_closes_channels() {
        let dir = TempDir::new().unwrap();
        let (watcher, mut channels) = FsWatcher::start(&WatchTarget::Folder(dir.path().to_path_buf())).unwrap();
        drop(watcher);

        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while channels.events.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
