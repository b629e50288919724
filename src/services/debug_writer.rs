//! 调试文件写入服务
//!
//! 只负责"写调试文件"能力，不关心流程。
//! 每道题一个目录：`<debug_dir>/<id>/`

use crate::error::FileError;
use crate::services::choices::InlineTrace;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 区块边界（写入 bounds.json）
#[derive(Debug, Clone, Serialize)]
pub struct BlockBounds {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub pages: Vec<u32>,
}

/// 调试文件写入服务
pub struct DebugWriter {
    root: PathBuf,
}

impl DebugWriter {
    /// 创建调试文件写入服务
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write_file(&self, dir: &Path, name: &str, content: &str) -> Result<(), FileError> {
        fs::create_dir_all(dir).map_err(|e| FileError::write_failed(dir.display().to_string(), e))?;
        let path = dir.join(name);
        fs::write(&path, content).map_err(|e| FileError::write_failed(path.display().to_string(), e))?;
        debug!("写入调试文件: {}", path.display());
        Ok(())
    }

    /// 写入区块文本片段（前 600 个字符）
    pub fn write_block(&self, id: &str, block_text: &str) -> Result<(), FileError> {
        let snippet: String = block_text.chars().take(600).collect();
        self.write_file(&self.root.join(id), "block.txt", &snippet)
    }

    /// 写入第二阶段选项提取的窗口、标签位置与结果
    pub fn write_inline_choices(&self, id: &str, trace: &InlineTrace) -> Result<(), FileError> {
        let content = format!(
            "WINDOW\n{}\n\nTOKENS\n{}\n\nCHOICES\n{}\n\nACCEPTED\n{}\n",
            trace.window,
            serde_json::to_string(&trace.tokens)?,
            serde_json::to_string_pretty(&trace.choices)?,
            trace.accepted
        );
        self.write_file(&self.root.join(id), "choices_inline.txt", &content)
    }

    /// 写入一份试卷的区块边界
    pub fn write_bounds(&self, test_name: &str, bounds: &[BlockBounds]) -> Result<(), FileError> {
        let name = format!("bounds_{}.json", test_name.to_lowercase().replace(' ', "_"));
        self.write_file(&self.root, &name, &serde_json::to_string_pretty(bounds)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_per_question_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("debug");
        let writer = DebugWriter::new(&root);
        writer.write_block("0a1b2c3d", &"z".repeat(700)).unwrap();
        let content = fs::read_to_string(root.join("0a1b2c3d").join("block.txt")).unwrap();
        assert_eq!(content.chars().count(), 600);

        writer
            .write_bounds(
                "Reading and Writing",
                &[BlockBounds {
                    id: "0a1b2c3d".to_string(),
                    start: 0,
                    end: 10,
                    pages: vec![1],
                }],
            )
            .unwrap();
        assert!(root.join("bounds_reading_and_writing.json").exists());
    }
}
