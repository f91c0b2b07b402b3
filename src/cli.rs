use clap::Parser;
use httpwatch::config::{ConfigError, ConfigLoader, RawConfig};
use std::path::PathBuf;

/// 监听 .http / .rest 文件，变更时重新发送其中的请求
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 监听的目录（与 --watch-file 二选一）
    #[arg(long)]
    pub watch_folder: Option<PathBuf>,

    /// 监听的文件（与 --watch-folder 二选一）
    #[arg(long)]
    pub watch_file: Option<PathBuf>,

    /// 要执行的 HTTP 文件
    #[arg(long)]
    pub http_file: Option<PathBuf>,

    /// 要执行的 HTTP 文件所在目录
    #[arg(long)]
    pub http_folder: Option<PathBuf>,

    /// 不触发重新加载的文件（支持 * 和 ?）
    #[arg(long)]
    pub exclude_file: Option<String>,

    /// 不触发重新加载的目录
    #[arg(long)]
    pub exclude_folder: Option<PathBuf>,

    /// 两个请求之间的等待时间（毫秒）
    #[arg(long, allow_negative_numbers = true)]
    pub wait_time: Option<i64>,

    /// 单个请求的超时时间（毫秒）
    #[arg(long = "req-time-out", allow_negative_numbers = true)]
    pub req_time_out: Option<i64>,

    /// 去抖窗口（毫秒）
    #[arg(long, allow_negative_numbers = true)]
    pub debounce: Option<i64>,

    /// 输出详细日志和响应内容
    #[arg(short, long)]
    pub verbose: bool,

    /// 指定配置文件，默认查找 httpwatch.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// 命令行参数优先，其次是配置文件
    pub fn into_raw_config(self) -> Result<RawConfig, ConfigError> {
        let file_config = match &self.config {
            Some(path) => Some(ConfigLoader::load_from_path(path)?),
            None => ConfigLoader::find_and_load()?,
        };

        let mut raw = RawConfig {
            watch_folder: self.watch_folder,
            watch_file: self.watch_file,
            http_file: self.http_file,
            http_folder: self.http_folder,
            exclude_file: self.exclude_file,
            exclude_folder: self.exclude_folder,
            wait_time_ms: self.wait_time,
            timeout_ms: self.req_time_out,
            debounce_ms: self.debounce,
            verbose: self.verbose,
        };
        if let Some(file_config) = file_config {
            file_config.apply_to(&mut raw);
        }
        Ok(raw)
    }
}
