use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 可接受的 HTTP 文件扩展名
pub const HTTP_EXTENSIONS: [&str; 2] = ["http", "rest"];

pub const DEFAULT_WAIT_TIME_MS: i64 = 50;
pub const DEFAULT_TIMEOUT_MS: i64 = 3000;
pub const DEFAULT_DEBOUNCE_MS: i64 = 100;

/// 判断路径是否为 `.http` / `.rest` 文件（不区分大小写）
pub fn has_http_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            HTTP_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// 监听目标：文件与目录二选一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    File(PathBuf),
    Folder(PathBuf),
}

impl WatchTarget {
    pub fn path(&self) -> &Path {
        match self {
            WatchTarget::File(path) | WatchTarget::Folder(path) => path,
        }
    }
}

/// HTTP 请求文件来源
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HttpSource {
    File(PathBuf),
    Folder(PathBuf),
    /// 未指定时在工作目录中查找第一个匹配的文件
    #[default]
    Discover,
}

/// 不参与监听的路径
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    file: Option<FilePattern>,
    folder: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct FilePattern {
    raw: String,
    regex: Regex,
}

impl Exclusions {
    pub fn none() -> Self {
        Self::default()
    }

    /// 编译排除规则，`*` 匹配任意字符串，`?` 匹配单个字符
    pub fn new(file: Option<&str>, folder: Option<PathBuf>) -> Result<Self, ConfigError> {
        let file = file
            .map(|raw| {
                let regex = wildcard_to_regex(raw).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: raw.to_string(),
                    reason: e.to_string(),
                })?;
                Ok::<_, ConfigError>(FilePattern {
                    raw: raw.to_string(),
                    regex,
                })
            })
            .transpose()?;

        Ok(Self { file, folder })
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        if let Some(folder) = &self.folder
            && (path.starts_with(folder) || canonical(path).starts_with(canonical(folder)))
        {
            return true;
        }

        if let Some(pattern) = &self.file {
            if path == Path::new(&pattern.raw) || canonical(path) == canonical(Path::new(&pattern.raw)) {
                return true;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                return pattern.regex.is_match(name);
            }
        }

        false
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn wildcard_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut expr = String::with_capacity(pattern.len() + 2);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr)
}

/// 校验后的运行配置，在每个组件入口显式传入
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub watch: WatchTarget,
    pub source: HttpSource,
    pub exclusions: Exclusions,
    /// 两个请求之间的等待时间
    pub wait_time: Duration,
    /// 单个请求的超时时间
    pub request_timeout: Duration,
    /// 去抖窗口
    pub debounce: Duration,
    pub verbose: bool,
}

impl RunConfig {
    /// 以默认时间参数构建配置（主要用于测试和库调用）
    pub fn new(watch: WatchTarget, source: HttpSource) -> Self {
        Self {
            watch,
            source,
            exclusions: Exclusions::none(),
            wait_time: Duration::from_millis(DEFAULT_WAIT_TIME_MS as u64),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS as u64),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS as u64),
            verbose: false,
        }
    }

    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// 未校验的配置（来自命令行与配置文件）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    pub watch_folder: Option<PathBuf>,
    pub watch_file: Option<PathBuf>,
    pub http_file: Option<PathBuf>,
    pub http_folder: Option<PathBuf>,
    pub exclude_file: Option<String>,
    pub exclude_folder: Option<PathBuf>,
    pub wait_time_ms: Option<i64>,
    pub timeout_ms: Option<i64>,
    pub debounce_ms: Option<i64>,
    pub verbose: bool,
}

impl RawConfig {
    /// 校验并生成 `RunConfig`，任何错误都在解析 HTTP 文件之前返回
    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        let watch = match (self.watch_file, self.watch_folder) {
            (None, None) => return Err(ConfigError::MissingWatchTarget),
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingWatchTargets),
            (Some(file), None) => {
                require_file(&file, "watch file")?;
                WatchTarget::File(file)
            }
            (None, Some(folder)) => {
                require_folder(&folder, "watch folder")?;
                WatchTarget::Folder(folder)
            }
        };

        if !matches!(watch, WatchTarget::Folder(_)) {
            if self.exclude_file.is_some() {
                return Err(ConfigError::ExcludeWithoutFolder("exclude-file"));
            }
            if self.exclude_folder.is_some() {
                return Err(ConfigError::ExcludeWithoutFolder("exclude-folder"));
            }
        }

        let source = match (self.http_file, self.http_folder) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingHttpSources),
            (Some(file), None) => {
                require_file(&file, "http file")?;
                HttpSource::File(file)
            }
            (None, Some(folder)) => {
                require_folder(&folder, "http folder")?;
                HttpSource::Folder(folder)
            }
            (None, None) => {
                tracing::debug!("no http file or folder provided, discovering in working directory");
                HttpSource::Discover
            }
        };

        let wait_time_ms = self.wait_time_ms.unwrap_or(DEFAULT_WAIT_TIME_MS);
        if wait_time_ms < 0 {
            return Err(ConfigError::NegativeWaitTime(wait_time_ms));
        }
        let timeout_ms = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms <= 0 {
            return Err(ConfigError::NonPositiveTimeout(timeout_ms));
        }
        let debounce_ms = self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS);
        if debounce_ms <= 0 {
            return Err(ConfigError::NonPositiveDebounce(debounce_ms));
        }

        let exclusions = Exclusions::new(self.exclude_file.as_deref(), self.exclude_folder)?;

        Ok(RunConfig {
            watch,
            source,
            exclusions,
            wait_time: Duration::from_millis(wait_time_ms as u64),
            request_timeout: Duration::from_millis(timeout_ms as u64),
            debounce: Duration::from_millis(debounce_ms as u64),
            verbose: self.verbose,
        })
    }
}

fn require_file(path: &Path, role: &'static str) -> Result<(), ConfigError> {
    let metadata = path_metadata(path)?;
    if metadata.is_dir() {
        return Err(ConfigError::ExpectedFile {
            role,
            path: path.to_path_buf(),
        });
    }
    if !has_http_extension(path) {
        return Err(ConfigError::InvalidExtension {
            role,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn require_folder(path: &Path, role: &'static str) -> Result<(), ConfigError> {
    let metadata = path_metadata(path)?;
    if !metadata.is_dir() {
        return Err(ConfigError::ExpectedFolder {
            role,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn path_metadata(path: &Path) -> Result<std::fs::Metadata, ConfigError> {
    std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::PathNotFound(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// 配置错误，全部为致命错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("either --watch-folder or --watch-file must be specified")]
    MissingWatchTarget,

    #[error("--watch-folder and --watch-file are mutually exclusive")]
    ConflictingWatchTargets,

    #[error("--http-file and --http-folder are mutually exclusive")]
    ConflictingHttpSources,

    #[error("--{0} only makes sense when --watch-folder is specified")]
    ExcludeWithoutFolder(&'static str),

    #[error("wait-time cannot be negative: {0}")]
    NegativeWaitTime(i64),

    #[error("request timeout must be positive: {0}")]
    NonPositiveTimeout(i64),

    #[error("debounce window must be positive: {0}")]
    NonPositiveDebounce(i64),

    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("provided {role} is a directory: {}", .path.display())]
    ExpectedFile { role: &'static str, path: PathBuf },

    #[error("provided {role} is not a directory: {}", .path.display())]
    ExpectedFolder { role: &'static str, path: PathBuf },

    #[error("{role} must have .http or .rest extension: {}", .path.display())]
    InvalidExtension { role: &'static str, path: PathBuf },

    #[error("invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    #[error("failed to read config file {}: {reason}", .path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("error checking path {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("api.http");
        std::fs::write(&file, "GET http://localhost/").unwrap();
        (dir, file)
    }

    #[test]
    fn test_missing_watch_target() {
        let err = RawConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingWatchTarget));
    }

    #[test]
    fn test_conflicting_watch_targets() {
        let (dir, file) = fixture();
        let raw = RawConfig {
            watch_file: Some(file),
            watch_folder: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(
            raw.validate().unwrap_err(),
            ConfigError::ConflictingWatchTargets
        ));
    }

    #[test]
    fn test_nonexistent_paths() {
        let raw = RawConfig {
            watch_folder: Some(PathBuf::from("./nonexisting/")),
            ..Default::default()
        };
        assert!(matches!(raw.validate().unwrap_err(), ConfigError::PathNotFound(_)));

        let raw = RawConfig {
            watch_file: Some(PathBuf::from("./nonexisting/file.http")),
            ..Default::default()
        };
        assert!(matches!(raw.validate().unwrap_err(), ConfigError::PathNotFound(_)));
    }

    #[test]
    fn test_file_given_as_folder() {
        let (_dir, file) = fixture();
        let raw = RawConfig {
            watch_folder: Some(file),
            ..Default::default()
        };
        assert!(matches!(
            raw.validate().unwrap_err(),
            ConfigError::ExpectedFolder { .. }
        ));
    }

    #[test]
    fn test_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "GET /").unwrap();
        let raw = RawConfig {
            watch_file: Some(file),
            ..Default::default()
        };
        assert!(matches!(
            raw.validate().unwrap_err(),
            ConfigError::InvalidExtension { .. }
        ));
    }

    #[test]
    fn test_exclude_requires_watch_folder() {
        let (_dir, file) = fixture();
        let raw = RawConfig {
            watch_file: Some(file),
            exclude_file: Some("*.tmp".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            raw.validate().unwrap_err(),
            ConfigError::ExcludeWithoutFolder("exclude-file")
        ));
    }

    #[test]
    fn test_timing_validation() {
        let (dir, _file) = fixture();
        let base = RawConfig {
            watch_folder: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let raw = RawConfig {
            wait_time_ms: Some(-1),
            ..base.clone()
        };
        assert!(matches!(raw.validate().unwrap_err(), ConfigError::NegativeWaitTime(-1)));

        let raw = RawConfig {
            timeout_ms: Some(0),
            ..base.clone()
        };
        assert!(matches!(raw.validate().unwrap_err(), ConfigError::NonPositiveTimeout(0)));

        let config = RawConfig {
            wait_time_ms: Some(0),
            ..base
        }
        .validate()
        .unwrap();
        assert_eq!(config.wait_time, Duration::ZERO);
        assert_eq!(config.request_timeout, Duration::from_millis(3000));
        assert_eq!(config.source, HttpSource::Discover);
    }

    #[test]
    fn test_exclusions() {
        let exclusions =
            Exclusions::new(Some("*.tmp"), Some(PathBuf::from("/project/build"))).unwrap();
        assert!(exclusions.is_excluded(Path::new("/project/api.http.tmp")));
        assert!(exclusions.is_excluded(Path::new("/project/build/api.http")));
        assert!(!exclusions.is_excluded(Path::new("/project/api.http")));

        let single = Exclusions::new(Some("draft?.http"), None).unwrap();
        assert!(single.is_excluded(Path::new("/x/draft1.http")));
        assert!(!single.is_excluded(Path::new("/x/draft10.http")));
    }

    #[test]
    fn test_has_http_extension() {
        assert!(has_http_extension(Path::new("a.http")));
        assert!(has_http_extension(Path::new("a.REST")));
        assert!(!has_http_extension(Path::new("a.txt")));
        assert!(!has_http_extension(Path::new("http")));
    }
}
