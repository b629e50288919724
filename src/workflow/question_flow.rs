//! 题目处理流程 - 流程层
//!
//! 核心职责：把"一个区块"变成"一条题目记录"
//!
//! 流程顺序：
//! 1. 去掉页码标记，得到干净的区块文本
//! 2. 元数据（组合行 → 标签:值）
//! 3. 题号、答案与解析
//! 4. 题目区域 → 选项（第一阶段 → 第二阶段）→ 题干
//! 5. 选项与答案一致性处理
//!
//! 图片由编排层在记录组装之后补充。

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::document::strip_page_markers;
use crate::models::{Block, QuestionRecord, RawDocument};
use crate::services::choices::{self, ChoiceSet};
use crate::services::{answer, header_locator, metadata, stem, DebugWriter};
use crate::workflow::block_ctx::BlockCtx;

/// 题目处理流程
///
/// - 只处理单个区块，不关心试卷级别的去重与计数
/// - 不持有任何外部资源（除可选的调试输出目录）
pub struct QuestionFlow {
    debug_writer: Option<DebugWriter>,
    verbose_logging: bool,
}

impl QuestionFlow {
    /// 创建新的题目处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            debug_writer: config
                .debug
                .then(|| DebugWriter::new(config.debug_dir.clone())),
            verbose_logging: config.verbose_logging,
        }
    }

    pub fn debug_writer(&self) -> Option<&DebugWriter> {
        self.debug_writer.as_ref()
    }

    /// 处理一个区块
    pub fn run(&self, document: &RawDocument, block: &Block, ctx: &BlockCtx) -> QuestionRecord {
        let clean = strip_page_markers(block.text(&document.text));

        if let Some(writer) = &self.debug_writer {
            if let Err(e) = writer.write_block(&block.id, &clean) {
                warn!("{} ⚠️ 调试文件写入失败: {}", ctx, e);
            }
        }

        // 元数据
        let extraction = metadata::extract(&clean, document.subject);
        let resolved = extraction.metadata.resolve(document.subject);

        // 题号与答案
        let header_len = block.header_len().min(clean.len());
        let number = header_locator::question_number(&clean[header_len..]);
        let answer_section = answer::extract(&block.id, &clean);

        // 选项与题干
        let pre = answer::pre_answer(&block.id, &clean);
        let region = stem::question_region(pre, header_len, &extraction.strip_rows);
        let outcome = choices::extract(&region);

        if let (Some(writer), Some(trace)) = (&self.debug_writer, &outcome.trace) {
            if let Err(e) = writer.write_inline_choices(&block.id, trace) {
                warn!("{} ⚠️ 调试文件写入失败: {}", ctx, e);
            }
        }

        let stem_end = outcome.set.as_ref().map(|set| set.stem_end);
        let stem_text = stem::resolve(&region, stem_end, &resolved.skill);
        let (choices, answer) = reconcile(outcome.set, answer_section.answer);

        let record = QuestionRecord {
            id: block.id.clone(),
            assessment: resolved.assessment,
            test: resolved.test,
            domain: resolved.domain,
            skill: resolved.skill,
            difficulty: resolved.difficulty,
            number,
            stem: stem_text,
            choices,
            answer,
            rationale: answer_section.rationale,
            images: Vec::new(),
            pages: block.pages.clone(),
        };

        if self.verbose_logging {
            info!(
                "{} {} | 选项: {} | 答案: {:?}",
                ctx,
                record,
                record.choices.as_ref().map_or(0, Vec::len),
                record.answer
            );
        } else {
            debug!("{} 已组装", ctx);
        }
        record
    }
}

/// 选项与答案一致性
///
/// - 有选项：答案必须是 A-D，否则清空
/// - 无选项：单个字母 A-D 的答案清空，数值答案保留
fn reconcile(
    set: Option<ChoiceSet>,
    answer: Option<String>,
) -> (Option<Vec<crate::models::Choice>>, Option<String>) {
    match set {
        Some(set) => {
            let answer = answer.filter(|a| answer::is_choice_letter(a));
            (Some(set.choices), answer)
        }
        None => {
            let answer = answer.filter(|a| !answer::is_choice_letter(a));
            (None, answer)
        }
    }
}
