use thiserror::Error;

use crate::config::ConfigError;
use crate::http::{BuildError, TransportError};
use crate::parser::ParseError;
use crate::source::SourceError;
use crate::watch::WatchError;

#[derive(Error, Debug)]
pub enum HttpWatchError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("读取 HTTP 文件失败: {0}")]
    Source(#[from] SourceError),

    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),

    #[error("构建请求失败: {0}")]
    Build(#[from] BuildError),

    #[error("HTTP 请求失败: {0}")]
    Transport(#[from] TransportError),

    #[error("监听错误: {0}")]
    Watch(#[from] WatchError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for HttpWatchError {
    fn from(err: anyhow::Error) -> Self {
        HttpWatchError::Other(err.to_string())
    }
}

/// Result type for httpwatch crate
pub type Result<T> = std::result::Result<T, HttpWatchError>;
