use crate::config::types::{ConfigError, RawConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// `httpwatch.toml` 中的 `[defaults]` 表
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Defaults {
    pub wait_time_ms: Option<i64>,
    pub timeout_ms: Option<i64>,
    pub debounce_ms: Option<i64>,
    pub verbose: Option<bool>,
}

/// 完整的配置文件
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

impl FileConfig {
    /// 将配置文件中的默认值填入未通过命令行指定的字段
    pub fn apply_to(&self, raw: &mut RawConfig) {
        let defaults = &self.defaults;
        raw.wait_time_ms = raw.wait_time_ms.or(defaults.wait_time_ms);
        raw.timeout_ms = raw.timeout_ms.or(defaults.timeout_ms);
        raw.debounce_ms = raw.debounce_ms.or(defaults.debounce_ms);
        raw.verbose = raw.verbose || defaults.verbose.unwrap_or(false);
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "httpwatch.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<FileConfig, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/httpwatch/
    ///
    /// 找到但无法解析的文件视为错误
    pub fn find_and_load() -> Result<Option<FileConfig>, ConfigError> {
        match Self::locate() {
            Some(path) => {
                tracing::debug!("Loading defaults from {}", path.display());
                Self::load_from_path(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn locate() -> Option<PathBuf> {
        let start = std::env::current_dir().ok();
        start
            .and_then(|dir| Self::find_upwards(&dir))
            .or_else(Self::user_config_path)
    }

    /// 从 `start` 开始逐级向上查找
    pub fn find_upwards(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(Self::CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn user_config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let path = home.join(".config").join("httpwatch").join(Self::CONFIG_FILE);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[defaults]\nwait_time_ms = 250\ntimeout_ms = 5000\n")
            .unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.defaults.wait_time_ms, Some(250));
        assert_eq!(config.defaults.timeout_ms, Some(5000));
        assert_eq!(config.defaults.debounce_ms, None);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[defaults\n").unwrap();
        temp_file.flush().unwrap();

        let err = ConfigLoader::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFile { .. }));
    }

    #[test]
    fn test_cli_values_take_precedence() {
        let file: FileConfig =
            toml::from_str("[defaults]\nwait_time_ms = 1000\ntimeout_ms = 9000\nverbose = true\n")
                .unwrap();
        let mut raw = RawConfig {
            wait_time_ms: Some(10),
            ..Default::default()
        };
        file.apply_to(&mut raw);

        assert_eq!(raw.wait_time_ms, Some(10));
        assert_eq!(raw.timeout_ms, Some(9000));
        assert!(raw.verbose);
    }

    #[test]
    fn test_find_upwards() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(ConfigLoader::CONFIG_FILE), "").unwrap();

        let found = ConfigLoader::find_upwards(&nested).unwrap();
        assert_eq!(found, root.path().join(ConfigLoader::CONFIG_FILE));
    }
}
