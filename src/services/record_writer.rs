//! 结果写入服务
//!
//! 只负责把题目记录写成 JSON 数组

use crate::error::FileError;
use crate::models::QuestionRecord;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// 结果写入服务
pub struct RecordWriter {
    out_path: PathBuf,
}

impl RecordWriter {
    /// 创建结果写入服务
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
        }
    }

    /// 写入全部题目记录（必要时创建父目录）
    pub fn write(&self, records: &[QuestionRecord]) -> Result<(), FileError> {
        if let Some(parent) = self.out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| FileError::write_failed(parent.display().to_string(), e))?;
        }

        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.out_path, json)
            .map_err(|e| FileError::write_failed(self.out_path.display().to_string(), e))?;

        info!("💾 已写入 {} 道题目: {}", records.len(), self.out_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Choice, Difficulty};

    #[test]
    fn test_write_creates_parent_and_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("questions.json");
        let record = QuestionRecord {
            id: "0a1b2c3d".to_string(),
            assessment: "SAT".to_string(),
            test: "Math".to_string(),
            domain: "Algebra".to_string(),
            skill: "Linear".to_string(),
            difficulty: Difficulty::Easy,
            number: Some(1),
            stem: "What is x?".to_string(),
            choices: Some(vec![
                Choice::new("A", "1"),
                Choice::new("B", "2"),
                Choice::new("C", "3"),
                Choice::new("D", "4"),
            ]),
            answer: Some("B".to_string()),
            rationale: None,
            images: vec![],
            pages: vec![1],
        };

        RecordWriter::new(&path).write(&[record.clone()]).unwrap();

        let parsed: Vec<QuestionRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![record]);
    }
}
