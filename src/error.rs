use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 完整性校验错误
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
}

/// 文本提取错误
///
/// 主路径（外部命令）与备用路径（库解析）各自返回这个错误，
/// 由调用方决定是否切换到备用路径。
#[derive(Debug, Error)]
pub enum SourceError {
    /// 外部命令无法启动（通常是未安装）
    #[error("无法启动命令 {program}: {source}")]
    CommandUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// 外部命令返回非零状态
    #[error("命令 {program} 执行失败 (状态: {status}): {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
    /// 库解析失败
    #[error("PDF 库解析失败 ({path}): {message}")]
    LibraryFailed { path: String, message: String },
    /// 提取结果为空
    #[error("未提取到任何文本: {path}")]
    Empty { path: String },
    /// 读取纯文本输入失败
    #[error("读取文本文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 图片导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 无法创建输出目录
    #[error("无法创建目录 {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 外部命令失败
    #[error("命令 {program} 导出第 {page} 页失败: {message}")]
    Command {
        program: String,
        page: u32,
        message: String,
    },
    /// 移动图片文件失败
    #[error("移动图片失败 ({path}): {source}")]
    Move {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 序列化失败
    #[error("JSON 序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 全局完整性校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 题目数量或选择题数量不满足要求
    #[error(
        "题目数量不符: Math={math}, R&W={reading_writing}, Total={total}, MCQ>=4={mcq} \
         (期望 {expected}/{expected}/{expected_total}, MCQ>={min_mcq}); \
         Math 前 5 个 ID: {math_ids:?}; R&W 前 5 个 ID: {reading_writing_ids:?}"
    )]
    Incomplete {
        math: usize,
        reading_writing: usize,
        total: usize,
        mcq: usize,
        expected: usize,
        expected_total: usize,
        min_mcq: usize,
        math_ids: Vec<String>,
        reading_writing_ids: Vec<String>,
    },
}

// ========== 便捷构造函数 ==========

impl FileError {
    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
