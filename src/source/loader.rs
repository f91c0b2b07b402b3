use crate::config::{HttpSource, RunConfig, has_http_extension};
use crate::parser::SourceFile;
use std::path::{Path, PathBuf};

/// 读取 HTTP 文件错误
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no .http or .rest files found in {}", .0.display())]
    EmptyResult(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 按配置定位并读取 HTTP 文件
pub struct SourceLoader;

impl SourceLoader {
    /// 返回 `(路径, 原始内容)` 序列，顺序即执行顺序
    ///
    /// - 指定文件：直接读取
    /// - 指定目录：不递归，保留 `.http` / `.rest` 文件，按文件名排序
    /// - 未指定：在工作目录中取第一个匹配的文件
    pub fn load(config: &RunConfig, cwd: &Path) -> Result<Vec<SourceFile>, SourceError> {
        let paths = match &config.source {
            HttpSource::File(path) => {
                if !path.exists() {
                    return Err(SourceError::NotFound(path.clone()));
                }
                vec![path.clone()]
            }
            HttpSource::Folder(folder) => {
                let paths = Self::scan(folder)?;
                if paths.is_empty() {
                    return Err(SourceError::EmptyResult(folder.clone()));
                }
                paths
            }
            HttpSource::Discover => {
                let first = Self::scan(cwd)?.into_iter().next();
                match first {
                    Some(path) => {
                        tracing::debug!("Discovered http file {}", path.display());
                        vec![path]
                    }
                    None => return Err(SourceError::EmptyResult(cwd.to_path_buf())),
                }
            }
        };

        paths.into_iter().map(|path| Self::read(&path)).collect()
    }

    /// 读取单个文件
    pub fn read(path: &Path) -> Result<SourceFile, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Ok(SourceFile::new(path, content))
    }

    fn scan(folder: &Path) -> Result<Vec<PathBuf>, SourceError> {
        if !folder.is_dir() {
            return Err(SourceError::NotFound(folder.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(folder).map_err(|e| io_error(folder, e))? {
            let path = entry.map_err(|e| io_error(folder, e))?.path();
            if path.is_file() && has_http_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SourceError {
    if source.kind() == std::io::ErrorKind::NotFound {
        SourceError::NotFound(path.to_path_buf())
    } else {
        SourceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
