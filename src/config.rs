use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 图片引用中的媒体根目录（`/qmedia/<id>/fig1.png`）
    pub media_root: String,
    /// 版式保持的文本提取命令
    pub pdftotext_bin: String,
    /// 图片导出命令
    pub pdfimages_bin: String,
    /// 每份试卷期望的题目数量（同时也是每份试卷保留的上限）
    pub expected_per_test: usize,
    /// 至少需要多少道完整的四选项题目
    pub min_mcq: usize,
    /// 同时进行的图片导出任务数
    pub max_concurrent_exports: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 是否输出调试文件
    pub debug: bool,
    /// 调试文件目录
    pub debug_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: "qmedia".to_string(),
            pdftotext_bin: "pdftotext".to_string(),
            pdfimages_bin: "pdfimages".to_string(),
            expected_per_test: 50,
            min_mcq: 90,
            max_concurrent_exports: 4,
            verbose_logging: false,
            debug: false,
            debug_dir: PathBuf::from("debug"),
        }
    }
}

/// TOML 配置文件（所有字段可选，未填写的沿用当前值）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    media_root: Option<String>,
    pdftotext_bin: Option<String>,
    pdfimages_bin: Option<String>,
    expected_per_test: Option<usize>,
    min_mcq: Option<usize>,
    max_concurrent_exports: Option<usize>,
    verbose_logging: Option<bool>,
    debug: Option<bool>,
    debug_dir: Option<PathBuf>,
}

impl Config {
    /// 从环境变量覆盖默认配置
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 读取 TOML 配置文件，再用环境变量覆盖
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let file: ConfigFile =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;

        let mut config = Self::default();
        if let Some(v) = file.media_root {
            config.media_root = v;
        }
        if let Some(v) = file.pdftotext_bin {
            config.pdftotext_bin = v;
        }
        if let Some(v) = file.pdfimages_bin {
            config.pdfimages_bin = v;
        }
        if let Some(v) = file.expected_per_test {
            config.expected_per_test = v;
        }
        if let Some(v) = file.min_mcq {
            config.min_mcq = v;
        }
        if let Some(v) = file.max_concurrent_exports {
            config.max_concurrent_exports = v;
        }
        if let Some(v) = file.verbose_logging {
            config.verbose_logging = v;
        }
        if let Some(v) = file.debug {
            config.debug = v;
        }
        if let Some(v) = file.debug_dir {
            config.debug_dir = v;
        }
        Ok(config.with_env())
    }

    fn with_env(self) -> Self {
        let current = self;
        Self {
            media_root: std::env::var("MEDIA_ROOT").unwrap_or(current.media_root),
            pdftotext_bin: std::env::var("PDFTOTEXT_BIN").unwrap_or(current.pdftotext_bin),
            pdfimages_bin: std::env::var("PDFIMAGES_BIN").unwrap_or(current.pdfimages_bin),
            expected_per_test: std::env::var("EXPECTED_PER_TEST").ok().and_then(|v| v.parse().ok()).unwrap_or(current.expected_per_test),
            min_mcq: std::env::var("MIN_MCQ").ok().and_then(|v| v.parse().ok()).unwrap_or(current.min_mcq),
            max_concurrent_exports: std::env::var("MAX_CONCURRENT_EXPORTS").ok().and_then(|v| v.parse().ok()).unwrap_or(current.max_concurrent_exports),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(current.verbose_logging),
            debug: current.debug,
            debug_dir: std::env::var("DEBUG_DIR").map(PathBuf::from).unwrap_or(current.debug_dir),
        }
    }

    /// 两份试卷合计的期望题目数
    pub fn expected_total(&self) -> usize {
        self.expected_per_test * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_completeness_rule() {
        let config = Config::default();
        assert_eq!(config.expected_per_test, 50);
        assert_eq!(config.expected_total(), 100);
        assert_eq!(config.min_mcq, 90);
        assert_eq!(config.media_root, "qmedia");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let file: ConfigFile = toml::from_str("media_root = \"media\"\nmin_mcq = 80\n").unwrap();
        assert_eq!(file.media_root.as_deref(), Some("media"));
        assert_eq!(file.min_mcq, Some(80));
        assert!(file.pdftotext_bin.is_none());
    }
}
