//! 区块处理上下文
//!
//! 封装"我正在处理哪份试卷的第几个区块"这一信息

use crate::models::Subject;
use std::fmt::Display;

/// 区块处理上下文
#[derive(Debug, Clone)]
pub struct BlockCtx {
    /// 所属试卷科目
    pub subject: Subject,

    /// 区块在试卷中的序号（从1开始，仅用于日志显示）
    pub block_index: usize,

    /// 题目 ID
    pub id: String,
}

impl BlockCtx {
    pub fn new(subject: Subject, block_index: usize, id: impl Into<String>) -> Self {
        Self {
            subject,
            block_index,
            id: id.into(),
        }
    }
}

impl Display for BlockCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} 区块#{} ID#{}]",
            self.subject.short_name(),
            self.block_index,
            self.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = BlockCtx::new(Subject::ReadingWriting, 3, "0a1b2c3d");
        assert_eq!(ctx.to_string(), "[R&W 区块#3 ID#0a1b2c3d]");
    }
}
