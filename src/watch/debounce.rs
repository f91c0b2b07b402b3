use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// 每个路径一个可取消的延时任务
///
/// 状态：Idle（表中没有该路径）→ PendingReload（有计时任务）→ 触发后回到 Idle。
/// 窗口内的重复事件只重置计时，不会产生额外触发
pub struct DebounceTable {
    window: Duration,
    fired: UnboundedSender<PathBuf>,
    inner: Arc<Mutex<Timers>>,
}

#[derive(Default)]
struct Timers {
    pending: HashMap<PathBuf, Pending>,
    next_generation: u64,
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

impl DebounceTable {
    /// 计时结束时把路径发送到 `fired`
    pub fn new(window: Duration, fired: UnboundedSender<PathBuf>) -> Self {
        Self {
            window,
            fired,
            inner: Arc::new(Mutex::new(Timers::default())),
        }
    }

    /// 记录一次变更：没有计时任务则创建，有则重新计时
    pub fn touch(&self, path: PathBuf) {
        let mut timers = self.lock();

        if let Some(previous) = timers.pending.remove(&path) {
            previous.handle.abort();
            tracing::trace!("Reset debounce timer for {}", path.display());
        }

        let generation = timers.next_generation;
        timers.next_generation += 1;

        let inner = Arc::clone(&self.inner);
        let fired = self.fired.clone();
        let window = self.window;
        let key = path.clone();

        // 锁在插入完成前一直持有，计时任务不会看到半注册状态
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            {
                let mut timers = inner.lock().unwrap_or_else(|e| e.into_inner());
                match timers.pending.get(&key) {
                    Some(pending) if pending.generation == generation => {
                        timers.pending.remove(&key);
                    }
                    // 已被新的事件取代或已取消
                    _ => return,
                }
            }
            tracing::debug!("Debounce fired for {}", key.display());
            let _ = fired.send(key);
        });

        timers.pending.insert(path, Pending { generation, handle });
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.lock().pending.contains_key(path)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// 取消所有未触发的计时任务
    pub fn cancel_all(&self) {
        let mut timers = self.lock();
        for (_, pending) in timers.pending.drain() {
            pending.handle.abort();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Timers> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for DebounceTable {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
