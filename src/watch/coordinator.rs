use crate::config::Exclusions;
use crate::watch::debounce::DebounceTable;
use async_trait::async_trait;
use notify::event::{EventKind, ModifyKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// 去抖结束后执行的完整重新加载
#[async_trait]
pub trait ReloadHandler: Send + Sync + 'static {
    async fn reload(&self, path: &Path);
}

/// 监听事件循环
pub struct WatchCoordinator<H: ReloadHandler> {
    handler: Arc<H>,
    exclusions: Exclusions,
    debounce: Duration,
}

impl<H: ReloadHandler> WatchCoordinator<H> {
    pub fn new(handler: Arc<H>, exclusions: Exclusions, debounce: Duration) -> Self {
        Self {
            handler,
            exclusions,
            debounce,
        }
    }

    /// 同时读取事件和错误通道，任一通道关闭即结束
    ///
    /// 结束时取消未触发的计时，并等待正在进行的重新加载完成
    pub async fn run(
        self,
        mut events: UnboundedReceiver<notify::Event>,
        mut errors: UnboundedReceiver<notify::Error>,
    ) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let table = DebounceTable::new(self.debounce, fired_tx);
        let worker = tokio::spawn(reload_worker(Arc::clone(&self.handler), fired_rx));

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(&table, event),
                    None => {
                        tracing::debug!("Event channel closed, stopping watch loop");
                        break;
                    }
                },
                error = errors.recv() => match error {
                    Some(error) => tracing::error!("Watch error: {}", error),
                    None => {
                        tracing::debug!("Error channel closed, stopping watch loop");
                        break;
                    }
                },
            }
        }

        // 释放最后一个发送端后 worker 会自然结束
        drop(table);
        if let Err(e) = worker.await {
            tracing::error!("Reload worker failed: {}", e);
        }
    }

    fn handle_event(&self, table: &DebounceTable, event: notify::Event) {
        if !is_reload_trigger(&event.kind) {
            tracing::trace!("Ignoring {:?} for {:?}", event.kind, event.paths);
            return;
        }

        for path in event.paths {
            if self.exclusions.is_excluded(&path) {
                tracing::debug!("Ignoring excluded path {}", path.display());
                continue;
            }
            table.touch(path);
        }
    }
}

/// 只有创建和写入触发重新加载；删除、重命名、元数据变化被忽略
pub fn is_reload_trigger(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

/// 串行执行重新加载，运行期间排队的触发合并为一次
async fn reload_worker<H: ReloadHandler>(handler: Arc<H>, mut fired: UnboundedReceiver<PathBuf>) {
    while let Some(mut path) = fired.recv().await {
        while let Ok(next) = fired.try_recv() {
            tracing::debug!("Coalescing queued reload for {}", next.display());
            path = next;
        }
        tracing::info!("Change detected in {}, reloading", path.display());
        handler.reload(&path).await;
    }
}
