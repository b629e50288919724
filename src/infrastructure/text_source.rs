//! 文本来源 - 基础设施层
//!
//! 把一份 PDF（或已提取好的 .txt）变成带页码标记的 `RawDocument`。
//!
//! 提取链：
//! 1. `pdftotext -layout`（外部命令，版式保持，按换页符分页）
//! 2. `pdf-extract`（库解析，主路径失败时尝试一次）
//! 3. 都失败：记录警告，返回空文档（该试卷贡献 0 道题）

use crate::error::SourceError;
use crate::models::{RawDocument, Subject};
use std::path::Path;
use tokio::process::Command;
use tracing::{info, warn};

/// 文本来源
pub struct TextSource {
    pdftotext_bin: String,
}

impl TextSource {
    /// 创建文本来源
    pub fn new(pdftotext_bin: impl Into<String>) -> Self {
        Self {
            pdftotext_bin: pdftotext_bin.into(),
        }
    }

    /// 是否为已提取好的纯文本输入
    pub fn is_plain_text(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
    }

    /// 加载一份试卷
    pub async fn load(&self, path: &Path, subject: Subject) -> RawDocument {
        let pages = if Self::is_plain_text(path) {
            Self::read_plain_text(path).await
        } else {
            match self.extract_with_command(path).await {
                Ok(pages) => Ok(pages),
                Err(e) => {
                    warn!("[{}] ⚠️ {}，改用库解析", subject, e);
                    Self::extract_with_library(path).await
                }
            }
        };

        match pages {
            Ok(pages) => {
                info!("[{}] ✓ 文本提取完成: {} 页", subject, pages.len());
                RawDocument::from_pages(&pages, path, subject)
            }
            Err(e) => {
                warn!("[{}] ⚠️ 文本提取失败，该试卷不产生题目: {}", subject, e);
                RawDocument::empty(path, subject)
            }
        }
    }

    /// 主路径：`pdftotext -layout <pdf> -`
    pub async fn extract_with_command(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        let output = Command::new(&self.pdftotext_bin)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|source| SourceError::CommandUnavailable {
                program: self.pdftotext_bin.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                program: self.pdftotext_bin.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        non_empty_pages(split_pages(&raw), path)
    }

    /// 备用路径：`pdf-extract` 按页解析（阻塞操作，放到 blocking 线程）
    pub async fn extract_with_library(path: &Path) -> Result<Vec<String>, SourceError> {
        let owned = path.to_path_buf();
        let display = path.display().to_string();
        let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
            .await
            .map_err(|e| SourceError::LibraryFailed {
                path: display.clone(),
                message: e.to_string(),
            })?;

        let pages = result.map_err(|e| SourceError::LibraryFailed {
            path: display,
            message: e.to_string(),
        })?;
        non_empty_pages(pages, path)
    }

    /// 纯文本输入：按换页符分页
    pub async fn read_plain_text(path: &Path) -> Result<Vec<String>, SourceError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        non_empty_pages(split_pages(&raw), path)
    }
}

/// 按换页符分页（保留空页以保持页码）
pub fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw.split('\u{000C}').map(str::to_string).collect();
    // pdftotext 在最后一页之后也会输出换页符
    if pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

fn non_empty_pages(pages: Vec<String>, path: &Path) -> Result<Vec<String>, SourceError> {
    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(SourceError::Empty {
            path: path.display().to_string(),
        });
    }
    Ok(pages)
}
