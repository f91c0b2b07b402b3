use crate::Result;
use crate::config::RunConfig;
use crate::http::Transport;
use crate::parser::{DslParser, SourceFile};
use crate::runner::{Reporter, RunRecord, RunSummary, Runner};
use crate::source::SourceLoader;
use crate::watch::ReloadHandler;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// 一次完整的 读取 → 解析 → 执行 → 输出
///
/// 每次都从磁盘重新读取，不复用上一次的解析结果
pub struct Session<T: Transport> {
    config: RunConfig,
    cwd: PathBuf,
    runner: Runner<T>,
    reporter: Reporter,
    cycle: AtomicUsize,
}

impl<T: Transport> Session<T> {
    pub fn new(config: RunConfig, cwd: impl Into<PathBuf>, transport: T) -> Self {
        let runner = Runner::new(transport, config.wait_time, config.request_timeout);
        let reporter = Reporter::new(config.verbose);
        Self {
            config,
            cwd: cwd.into(),
            runner,
            reporter,
            cycle: AtomicUsize::new(0),
        }
    }

    /// 已完成的运行次数
    pub fn cycles(&self) -> usize {
        self.cycle.load(Ordering::SeqCst)
    }

    /// 读取并解析所有 HTTP 文件，任一文件失败则整体失败
    pub fn load(&self) -> Result<Vec<SourceFile>> {
        let files = SourceLoader::load(&self.config, &self.cwd)?;
        Ok(DslParser::parse_all(files)?)
    }

    /// 执行一轮并打印结果
    pub async fn run_once(&self) -> Result<Vec<RunRecord>> {
        let cycle = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        self.reporter.print_header(cycle);

        let files = self.load()?;
        let records = self
            .runner
            .run(&files, |record| self.reporter.print_record(record))
            .await;

        let summary = RunSummary::from_records(&records);
        tracing::debug!(
            "Run {} finished: {} sent, {} failed, {} mismatched",
            cycle,
            summary.sent,
            summary.failed,
            summary.mismatched
        );
        self.reporter.print_done(&summary);
        Ok(records)
    }

    /// 执行一轮，失败时通过 reporter 打印错误；启动和重新加载共用
    pub async fn run_and_report(&self) -> Option<Vec<RunRecord>> {
        match self.run_once().await {
            Ok(records) => Some(records),
            Err(e) => {
                // 解析失败不影响监听
                self.reporter.print_error(&e);
                None
            }
        }
    }
}

#[async_trait]
impl<T: Transport + 'static> ReloadHandler for Session<T> {
    async fn reload(&self, path: &Path) {
        tracing::debug!("Reload triggered by {}", path.display());
        self.run_and_report().await;
    }
}
